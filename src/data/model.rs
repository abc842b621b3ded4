use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ---------------------------------------------------------------------------
// FieldValue – a single cell of the repository table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, used wherever an aggregation groups or counts by
/// an arbitrary column. Grouping goes through `BTreeMap`, so `FieldValue` must
/// be `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(u64),
    Null,
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Text(_) => 2,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Null or the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Integer(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Column addressing
// ---------------------------------------------------------------------------

/// The integer columns of the dataset, named as in the CSV header.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    StarsCount,
    ForksCount,
    IssuesCount,
    PullRequests,
    Contributors,
}

impl NumericField {
    pub fn value(self, record: &RepoRecord) -> u64 {
        match self {
            NumericField::StarsCount => record.stars_count,
            NumericField::ForksCount => record.forks_count,
            NumericField::IssuesCount => record.issues_count,
            NumericField::PullRequests => record.pull_requests,
            NumericField::Contributors => record.contributors,
        }
    }

    /// Column name as it appears in the CSV header.
    pub fn column(self) -> &'static str {
        self.into()
    }
}

/// Any column of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Repositories,
    Language,
    #[serde(untagged)]
    Numeric(NumericField),
}

impl Field {
    pub fn value(self, record: &RepoRecord) -> FieldValue {
        match self {
            Field::Repositories => FieldValue::Text(record.name.clone()),
            Field::Language => record
                .language
                .as_ref()
                .map_or(FieldValue::Null, |l| FieldValue::Text(l.clone())),
            Field::Numeric(f) => FieldValue::Integer(f.value(record)),
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Field::Repositories => "repositories",
            Field::Language => "language",
            Field::Numeric(f) => f.column(),
        }
    }
}

impl From<NumericField> for Field {
    fn from(f: NumericField) -> Self {
        Field::Numeric(f)
    }
}

impl std::str::FromStr for Field {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "repositories" => Ok(Field::Repositories),
            "language" => Ok(Field::Language),
            other => other.parse().map(Field::Numeric),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// RepoRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single repository (one row of the source table), already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRecord {
    /// `repositories` column, e.g. `owner/name`.
    pub name: String,
    pub stars_count: u64,
    pub forks_count: u64,
    pub issues_count: u64,
    pub pull_requests: u64,
    /// Also used as the "repository size" the filters refer to.
    pub contributors: u64,
    /// `None` when the source cell was empty or null.
    pub language: Option<String>,
}

impl RepoRecord {
    /// Build a record from raw cell text, coercing counts and blank languages.
    pub fn from_raw(raw: &RawRecord<'_>) -> Self {
        Self {
            name: raw.name.to_string(),
            stars_count: coerce_count(raw.stars_count),
            forks_count: coerce_count(raw.forks_count),
            issues_count: coerce_count(raw.issues_count),
            pull_requests: coerce_count(raw.pull_requests),
            contributors: coerce_count(raw.contributors),
            language: normalize_language(raw.language),
        }
    }
}

/// Cell text for one row, before normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawRecord<'a> {
    pub name: &'a str,
    pub stars_count: &'a str,
    pub forks_count: &'a str,
    pub issues_count: &'a str,
    pub pull_requests: &'a str,
    pub contributors: &'a str,
    pub language: &'a str,
}

/// Coerce count text to a non-negative integer; anything unparsable is 0.
///
/// Accepts integers and finite decimals (truncated toward zero), which is how
/// float-typed exports write whole numbers (`"12.0"`).
pub fn coerce_count(s: &str) -> u64 {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return i.max(0) as u64;
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
        _ => 0,
    }
}

fn normalize_language(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed widget bounds.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All repositories (rows), in source order.
    pub records: Vec<RepoRecord>,
    /// Sorted distinct non-null languages.
    pub languages: BTreeSet<String>,
    pub max_stars: u64,
    pub max_contributors: u64,
}

impl Dataset {
    /// Build the language index and column maxima from loaded records.
    pub fn from_records(records: Vec<RepoRecord>) -> Self {
        let mut languages = BTreeSet::new();
        let mut max_stars = 0;
        let mut max_contributors = 0;

        for rec in &records {
            if let Some(lang) = &rec.language {
                languages.insert(lang.clone());
            }
            max_stars = max_stars.max(rec.stars_count);
            max_contributors = max_contributors.max(rec.contributors);
        }

        Dataset {
            records,
            languages,
            max_stars,
            max_contributors,
        }
    }

    /// Number of repositories.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
