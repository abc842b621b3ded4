use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::color::ColorMap;
use crate::data::cache::{DatasetCache, Fetch};
use crate::data::filter::{FilterCriteria, View, filtered_indices};
use crate::data::loader::{DatasetSource, SourceLoader};
use crate::data::model::Dataset;
use crate::router::{Page, PageOutput, route};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState<F = SourceLoader> {
    /// Where the dataset comes from, with its TTL.
    pub cache: DatasetCache<F>,

    /// Dataset currently on screen (None until the first load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Selected navigation entry.
    pub page: Page,

    /// Sidebar filter inputs.
    pub criteria: FilterCriteria,

    /// Repositories picked on the analysis page.
    pub compare: BTreeSet<String>,

    /// Indices of repositories passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Sections of the selected page for the current filters (cached).
    pub output: Option<PageOutput>,

    /// Language colours shared by all charts.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Set after a failed load; cleared by an explicit reload.
    pub load_failed: bool,
}

impl<F: Fetch> AppState<F> {
    pub fn new(cache: DatasetCache<F>) -> Self {
        Self {
            cache,
            dataset: None,
            page: Page::default(),
            criteria: FilterCriteria::default(),
            compare: BTreeSet::new(),
            visible_indices: Vec::new(),
            output: None,
            color_map: None,
            status_message: None,
            load_failed: false,
        }
    }

    /// Make sure the on-screen dataset is current, reloading it when the cache
    /// window has passed. Does nothing after a failure until [`reload`](Self::reload).
    pub fn refresh(&mut self, now: Instant) {
        if self.load_failed || (self.dataset.is_some() && self.cache.is_fresh_at(now)) {
            return;
        }
        match self.cache.get_at(now) {
            Ok(dataset) => {
                match &self.dataset {
                    Some(current) if Arc::ptr_eq(current, &dataset) => {}
                    Some(_) => self.replace_dataset(dataset),
                    None => self.set_dataset(dataset),
                }
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.load_failed = true;
            }
        }
    }

    /// Drop the cached dataset and fetch it again right away.
    pub fn reload(&mut self, now: Instant) {
        self.cache.invalidate();
        self.load_failed = false;
        self.status_message = None;
        self.refresh(now);
    }

    /// Time left before the cached dataset expires. `None` when nothing is
    /// scheduled: no dataset yet, or a failed load waiting for a manual reload.
    pub fn time_to_expiry(&self, now: Instant) -> Option<Duration> {
        if self.load_failed {
            return None;
        }
        let loaded_at = self.cache.loaded_at()?;
        Some(self.cache.ttl().saturating_sub(now.saturating_duration_since(loaded_at)))
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.criteria = FilterCriteria::for_dataset(&dataset);
        self.compare.clear();
        self.visible_indices = (0..dataset.len()).collect();
        self.color_map = Some(ColorMap::new(dataset.languages.iter()));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    /// Swap in a refreshed copy of the current source. The user's filters and
    /// comparison picks survive; a size bound pinned to the old maximum follows
    /// the new one and picks that left the dataset are dropped.
    pub fn replace_dataset(&mut self, dataset: Arc<Dataset>) {
        if let Some(old) = &self.dataset {
            if self.criteria.max_contributors == old.max_contributors {
                self.criteria.max_contributors = dataset.max_contributors;
            }
        }
        self.compare
            .retain(|name| dataset.records.iter().any(|r| &r.name == name));
        self.color_map = Some(ColorMap::new(dataset.languages.iter()));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.criteria);
        }
        self.recompute();
    }

    /// Rebuild the page output from the cached indices.
    pub fn recompute(&mut self) {
        self.output = self.dataset.as_ref().map(|ds| {
            let view = View::from_indices(ds, &self.visible_indices);
            route(self.page, ds, &view, &self.compare)
        });
    }

    pub fn set_page(&mut self, page: Page) {
        if self.page != page {
            self.page = page;
            self.recompute();
        }
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if self.criteria != criteria {
            self.criteria = criteria;
            self.refilter();
        }
    }

    /// Toggle a single language in the language filter.
    pub fn toggle_language(&mut self, language: &str) {
        if !self.criteria.languages.remove(language) {
            self.criteria.languages.insert(language.to_string());
        }
        self.refilter();
    }

    /// Toggle a repository in the comparison selection.
    pub fn toggle_compare(&mut self, name: &str) {
        if !self.compare.remove(name) {
            self.compare.insert(name.to_string());
        }
        self.recompute();
    }

    /// Names of the repositories passing the filters, in dataset order.
    pub fn visible_names(&self) -> Vec<&str> {
        let Some(ds) = &self.dataset else {
            return Vec::new();
        };
        self.visible_indices
            .iter()
            .filter_map(|&i| ds.records.get(i))
            .map(|r| r.name.as_str())
            .collect()
    }
}

impl AppState<SourceLoader> {
    /// Point the dashboard at a local file and load it.
    pub fn open_file(&mut self, path: &Path, timeout: Duration) -> Result<()> {
        let loader = SourceLoader::new(DatasetSource::File(path.to_path_buf()), timeout)?;
        self.cache = DatasetCache::new(loader, self.cache.ttl());
        self.dataset = None;
        self.reload(Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use anyhow::bail;

    use super::*;
    use crate::data::filter::tests::sample;

    struct Flaky {
        fail: Cell<bool>,
        calls: Cell<usize>,
    }

    impl Fetch for Flaky {
        fn fetch(&self) -> Result<Dataset> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                bail!("timed out");
            }
            Ok(sample())
        }
    }

    const TTL: Duration = Duration::from_secs(60);

    fn state(fail: bool) -> AppState<Flaky> {
        AppState::new(DatasetCache::new(
            Flaky {
                fail: Cell::new(fail),
                calls: Cell::new(0),
            },
            TTL,
        ))
    }

    #[test]
    fn first_refresh_loads_and_shows_everything() {
        let mut st = state(false);
        st.refresh(Instant::now());
        assert_eq!(st.visible_indices, [0, 1, 2]);
        assert_eq!(st.criteria.max_contributors, 20);
        assert_eq!(st.output.as_ref().map(|o| o.visible), Some(3));
    }

    #[test]
    fn filter_changes_update_the_output() {
        let mut st = state(false);
        st.refresh(Instant::now());
        st.set_page(Page::LanguageTrends);
        st.toggle_language("Rust");
        assert_eq!(st.visible_names(), ["B"]);
        assert_eq!(st.output.as_ref().map(|o| o.page), Some(Page::LanguageTrends));

        st.toggle_language("Rust");
        let criteria = FilterCriteria {
            min_stars: 6,
            ..st.criteria.clone()
        };
        st.set_criteria(criteria);
        assert_eq!(st.visible_names(), ["A", "B"]);
    }

    #[test]
    fn failure_is_reported_and_not_retried_every_frame() {
        let mut st = state(true);
        let t0 = Instant::now();
        st.refresh(t0);
        st.refresh(t0);
        assert!(st.load_failed);
        assert!(st.status_message.as_deref().is_some_and(|m| m.contains("timed out")));
        assert!(st.dataset.is_none());
        assert_eq!(st.cache.fetcher().calls.get(), 1);

        st.cache.fetcher().fail.set(false);
        st.reload(t0);
        assert!(!st.load_failed);
        assert!(st.dataset.is_some());
        assert!(st.status_message.is_none());
    }

    #[test]
    fn expiry_triggers_a_reload() {
        let mut st = state(false);
        let t0 = Instant::now();
        st.refresh(t0);
        st.refresh(t0 + Duration::from_secs(30));
        assert_eq!(st.cache.fetcher().calls.get(), 1);
        assert_eq!(st.time_to_expiry(t0 + Duration::from_secs(30)), Some(Duration::from_secs(30)));

        st.refresh(t0 + TTL);
        assert_eq!(st.cache.fetcher().calls.get(), 2);
    }

    #[test]
    fn expiry_reload_keeps_filters_and_picks() {
        let mut st = state(false);
        let t0 = Instant::now();
        st.refresh(t0);
        st.toggle_language("Rust");
        st.toggle_compare("B");
        st.toggle_compare("gone");
        assert_eq!(st.visible_names(), ["B"]);

        st.refresh(t0 + TTL);
        assert_eq!(st.cache.fetcher().calls.get(), 2);
        assert_eq!(st.criteria.languages, BTreeSet::from(["Rust".to_string()]));
        assert_eq!(st.criteria.max_contributors, 20);
        assert_eq!(st.compare, BTreeSet::from(["B".to_string()]));
        assert_eq!(st.visible_names(), ["B"]);
    }

    #[test]
    fn failed_expiry_reload_stops_scheduling_repaints() {
        let mut st = state(false);
        let t0 = Instant::now();
        st.refresh(t0);
        st.cache.fetcher().fail.set(true);
        st.refresh(t0 + TTL);
        assert!(st.load_failed);
        assert!(st.dataset.is_some());
        for secs in [1, 10, 600] {
            assert_eq!(st.time_to_expiry(t0 + TTL + Duration::from_secs(secs)), None);
        }

        st.cache.fetcher().fail.set(false);
        st.reload(t0 + TTL);
        assert!(st.time_to_expiry(t0 + TTL).is_some());
    }

    #[test]
    fn comparison_selection_feeds_the_analysis_page() {
        let mut st = state(false);
        st.refresh(Instant::now());
        st.set_page(Page::RepositoryAnalysis);
        let before = st.output.as_ref().map_or(0, |o| o.sections.len());
        st.toggle_compare("A");
        let after = st.output.as_ref().map_or(0, |o| o.sections.len());
        assert_eq!(after, before + 1);
    }
}
