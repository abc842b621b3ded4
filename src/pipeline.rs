use std::collections::BTreeSet;

use crate::data::filter::{FilterCriteria, apply};
use crate::data::model::Dataset;
use crate::router::{Page, PageOutput, route};

/// Everything one interaction supplies: the page and the sidebar inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderRequest {
    pub page: Page,
    pub criteria: FilterCriteria,
    /// Repositories picked for side-by-side comparison.
    pub compare: BTreeSet<String>,
}

/// One full recomputation: filter, then aggregate for the selected page.
pub fn render(dataset: &Dataset, request: &RenderRequest) -> PageOutput {
    let view = apply(dataset, &request.criteria);
    route(request.page, dataset, &view, &request.compare)
}
