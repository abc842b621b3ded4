use std::collections::BTreeSet;
use std::time::Duration;

use clap::Parser;

use crate::data::cache::DEFAULT_TTL;
use crate::data::filter::FilterCriteria;
use crate::data::loader::{DEFAULT_SOURCE, DatasetSource};
use crate::pipeline::RenderRequest;
use crate::router::Page;

/// GitHub repository statistics dashboard.
///
/// Opens a window by default; `--headless` evaluates one page and prints it
/// as JSON instead.
#[derive(Debug, Clone, Parser)]
#[command(name = "repo-dashboard", version, about)]
pub struct Config {
    /// Dataset location: an http(s) URL serving CSV, or a local .csv/.json/.parquet file
    #[arg(long, value_name = "URL|PATH", env = "REPO_DASHBOARD_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Seconds a loaded dataset stays valid before it is fetched again
    #[arg(long, value_name = "SECS", env = "REPO_DASHBOARD_TTL_SECS", default_value_t = DEFAULT_TTL.as_secs())]
    pub ttl_secs: u64,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", env = "REPO_DASHBOARD_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,

    /// Print one page as JSON instead of opening a window
    #[arg(long)]
    pub headless: bool,

    /// Page to evaluate in headless mode
    #[arg(long, value_enum, default_value_t = Page::Overview, help_heading = "Headless")]
    pub page: Page,

    /// Minimum stars
    #[arg(long, value_name = "N", default_value_t = 0, help_heading = "Headless")]
    pub min_stars: u64,

    /// Minimum repository size (contributors)
    #[arg(long, value_name = "N", default_value_t = 0, help_heading = "Headless")]
    pub min_contributors: u64,

    /// Maximum repository size (contributors) [default: unbounded]
    #[arg(long, value_name = "N", help_heading = "Headless")]
    pub max_contributors: Option<u64>,

    /// Restrict to a language; repeat for several
    #[arg(long = "language", value_name = "LANG", help_heading = "Headless")]
    pub languages: Vec<String>,

    /// Repository to include in the comparison chart; repeat for several
    #[arg(long = "compare", value_name = "NAME", help_heading = "Headless")]
    pub compare: Vec<String>,

    /// Pretty-print the JSON output
    #[arg(long, help_heading = "Headless")]
    pub pretty: bool,
}

impl Config {
    pub fn dataset_source(&self) -> DatasetSource {
        DatasetSource::parse(&self.source)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            min_stars: self.min_stars,
            min_contributors: self.min_contributors,
            max_contributors: self.max_contributors.unwrap_or(u64::MAX),
            languages: self.languages.iter().cloned().collect(),
        }
    }

    pub fn render_request(&self) -> RenderRequest {
        RenderRequest {
            page: self.page,
            criteria: self.criteria(),
            compare: self.compare.iter().cloned().collect::<BTreeSet<_>>(),
        }
    }
}
