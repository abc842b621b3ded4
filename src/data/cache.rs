use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use super::model::Dataset;

/// Default lifetime of a loaded dataset.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Something that can produce a fresh copy of the dataset. A fetch either
/// yields a whole dataset or fails; there is no partial result.
pub trait Fetch {
    fn fetch(&self) -> Result<Dataset>;
}

#[derive(Debug)]
struct CacheEntry {
    dataset: Arc<Dataset>,
    loaded_at: Instant,
}

/// Holds the last loaded dataset for `ttl`.
///
/// Lifecycle: load on first access, expire after the TTL, reload on the next
/// access. A failed load is returned to the caller and leaves the previous
/// entry in place, still expired, so the following access tries again.
#[derive(Debug)]
pub struct DatasetCache<F> {
    fetcher: F,
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl<F: Fetch> DatasetCache<F> {
    pub fn new(fetcher: F, ttl: Duration) -> Self {
        Self {
            fetcher,
            ttl,
            entry: None,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached dataset, fetching it first if absent or expired.
    pub fn get(&mut self) -> Result<Arc<Dataset>> {
        self.get_at(Instant::now())
    }

    /// [`get`](Self::get) with an explicit clock reading.
    pub fn get_at(&mut self, now: Instant) -> Result<Arc<Dataset>> {
        match &self.entry {
            Some(entry) if !self.is_expired(entry, now) => {
                log::debug!("dataset cache hit");
                return Ok(Arc::clone(&entry.dataset));
            }
            Some(_) => log::warn!("cached dataset older than {:?}, reloading", self.ttl),
            None => log::debug!("dataset cache empty, loading"),
        }

        let dataset = Arc::new(self.fetcher.fetch()?);
        self.entry = Some(CacheEntry {
            dataset: Arc::clone(&dataset),
            loaded_at: now,
        });
        Ok(dataset)
    }

    /// Whether a call to [`get_at`](Self::get_at) at `now` would be served
    /// without fetching.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        self.entry.as_ref().is_some_and(|e| !self.is_expired(e, now))
    }

    pub fn loaded_at(&self) -> Option<Instant> {
        self.entry.as_ref().map(|e| e.loaded_at)
    }

    /// Forget the cached dataset; the next access fetches.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.loaded_at) >= self.ttl
    }
}
