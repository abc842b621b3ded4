use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::cache::Fetch;
use super::model::{Dataset, RawRecord, RepoRecord};

/// Release asset the dashboard reads by default.
pub const DEFAULT_SOURCE: &str =
    "https://github.com/AmariahAK/Github-Repo-Dashboard/releases/download/v1.0.0/github_dataset.csv";

/// Columns every source must provide, in [`RawRecord`] field order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "repositories",
    "stars_count",
    "forks_count",
    "issues_count",
    "pull_requests",
    "contributors",
    "language",
];

/// Source failures callers may want to tell apart.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: reqwest::StatusCode },
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where the dataset comes from: a remote CSV or a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Url(String),
    File(PathBuf),
}

impl DatasetSource {
    /// `http://` and `https://` locations are remote; anything else is a path.
    pub fn parse(s: &str) -> Self {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DatasetSource::Url(s.to_string())
        } else {
            DatasetSource::File(PathBuf::from(s))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Url(url) => write!(f, "{url}"),
            DatasetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads a [`DatasetSource`] on demand; the production [`Fetch`] implementation.
#[derive(Debug)]
pub struct SourceLoader {
    source: DatasetSource,
    client: reqwest::blocking::Client,
}

impl SourceLoader {
    pub fn new(source: DatasetSource, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self { source, client })
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }
}

impl Fetch for SourceLoader {
    fn fetch(&self) -> Result<Dataset> {
        let dataset = match &self.source {
            DatasetSource::Url(url) => fetch_url(&self.client, url),
            DatasetSource::File(path) => load_file(path),
        }
        .with_context(|| format!("loading dataset from {}", self.source))?;

        log::info!("Loaded {} repositories from {}", dataset.len(), self.source);
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Remote CSV
// ---------------------------------------------------------------------------

/// GET `url` and parse the body as CSV. Any non-success status is an error.
pub fn fetch_url(client: &reqwest::blocking::Client, url: &str) -> Result<Dataset> {
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("requesting {url}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::HttpStatus {
            url: url.to_string(),
            status,
        }
        .into());
    }

    let body = response.bytes().context("reading response body")?;
    parse_csv(body.as_ref())
}

// ---------------------------------------------------------------------------
// Local files
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the required columns
/// * `.json`    – `[{ "repositories": "...", "stars_count": 12, ... }, ...]`
/// * `.parquet` – flat columns named like the CSV header
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
            parse_csv(file)
        }
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(SourceError::UnsupportedFormat(other.to_string()).into()),
    }
}

fn raw_from_cells(cells: [&str; 7]) -> RawRecord<'_> {
    let [name, stars_count, forks_count, issues_count, pull_requests, contributors, language] = cells;
    RawRecord {
        name,
        stars_count,
        forks_count,
        issues_count,
        pull_requests,
        contributors,
        language,
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Parse CSV text with a header row. Extra columns are ignored; short rows
/// read their missing cells as blank.
pub fn parse_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut indices = [0usize; 7];
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or(SourceError::MissingColumn(column))?;
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = indices.map(|i| row.get(i).unwrap_or(""));
        records.push(RepoRecord::from_raw(&raw_from_cells(cells)));
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`.
/// Missing keys and nulls read as empty cells.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let cells = REQUIRED_COLUMNS.map(|column| obj.get(column).map(json_cell_text).unwrap_or_default());
        records.push(RepoRecord::from_raw(&raw_from_cells(cells.each_ref().map(String::as_str))));
    }

    Ok(Dataset::from_records(records))
}

fn json_cell_text(val: &JsonValue) -> String {
    match val {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per CSV header name.
///
/// Count columns may be integer, float or string typed; they go through the
/// same coercion as CSV text. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let mut columns = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for column in REQUIRED_COLUMNS {
            let idx = schema
                .index_of(column)
                .map_err(|_| SourceError::MissingColumn(column))?;
            columns.push(batch.column(idx).clone());
        }

        for row in 0..batch.num_rows() {
            let mut cells: [String; 7] = Default::default();
            for (cell, col) in cells.iter_mut().zip(&columns) {
                if !col.is_null(row) {
                    *cell = array_value_to_string(col, row)
                        .with_context(|| format!("Row {row}: unreadable parquet value"))?;
                }
            }
            records.push(RepoRecord::from_raw(&raw_from_cells(cells.each_ref().map(String::as_str))));
        }
    }

    Ok(Dataset::from_records(records))
}
