use std::collections::BTreeSet;

use super::model::{Dataset, RepoRecord};

// ---------------------------------------------------------------------------
// Filter criteria: what the side panel currently selects
// ---------------------------------------------------------------------------

/// Conjunction of the sidebar predicates.
///
/// An empty `languages` set means "no language restriction". The contributor
/// bounds are the "repository size" inputs of the advanced filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub min_stars: u64,
    pub min_contributors: u64,
    pub max_contributors: u64,
    pub languages: BTreeSet<String>,
}

impl Default for FilterCriteria {
    /// Criteria that let every record through.
    fn default() -> Self {
        Self {
            min_stars: 0,
            min_contributors: 0,
            max_contributors: u64::MAX,
            languages: BTreeSet::new(),
        }
    }
}

impl FilterCriteria {
    /// Initial widget state for a freshly loaded dataset: everything visible,
    /// with the size bound pinned to the largest contributor count.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self {
            max_contributors: dataset.max_contributors,
            ..Self::default()
        }
    }

    /// Whether a single record passes all predicates.
    pub fn matches(&self, rec: &RepoRecord) -> bool {
        if rec.stars_count < self.min_stars {
            return false;
        }
        if rec.contributors < self.min_contributors || rec.contributors > self.max_contributors {
            return false;
        }
        if self.languages.is_empty() {
            return true;
        }
        rec.language
            .as_ref()
            .is_some_and(|lang| self.languages.contains(lang))
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A read-only subset of a dataset's rows, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    rows: Vec<&'a RepoRecord>,
}

impl<'a> View<'a> {
    /// The whole dataset as a view.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            rows: dataset.records.iter().collect(),
        }
    }

    /// Rebuild a view from indices previously returned by [`filtered_indices`].
    /// Indices past the end of the dataset are skipped.
    pub fn from_indices(dataset: &'a Dataset, indices: &[usize]) -> Self {
        Self {
            rows: indices
                .iter()
                .filter_map(|&i| dataset.records.get(i))
                .collect(),
        }
    }

    /// Narrow this view further; never adds rows.
    pub fn refine(&self, criteria: &FilterCriteria) -> View<'a> {
        View {
            rows: self
                .rows
                .iter()
                .copied()
                .filter(|rec| criteria.matches(rec))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a RepoRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Return indices of records that pass `criteria`, in dataset order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    let indices: Vec<usize> = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect();
    log::debug!("filter kept {} of {} repositories", indices.len(), dataset.len());
    indices
}

/// Apply `criteria` to `dataset`, producing a view. The dataset is untouched.
pub fn apply<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> View<'a> {
    View::from_indices(dataset, &filtered_indices(dataset, criteria))
}
