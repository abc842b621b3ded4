//! Read-only summaries over a [`View`].
//!
//! Every function here is pure: the same view and parameters give the same
//! result, and an empty view gives an empty result rather than an error.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::filter::View;
use super::model::{Field, FieldValue, NumericField};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Headline numbers of the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub repositories: usize,
    /// Distinct non-null languages.
    pub languages: usize,
    /// `None` for an empty view.
    pub mean_stars: Option<f64>,
}

/// Symmetric matrix of Pearson coefficients; `values[i][j]` pairs
/// `fields[i]` with `fields[j]`. Undefined entries are NaN.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub fields: Vec<NumericField>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: NumericField, col: NumericField) -> Option<f64> {
        let i = self.fields.iter().position(|&f| f == row)?;
        let j = self.fields.iter().position(|&f| f == col)?;
        Some(self.values[i][j])
    }
}

/// One level of a treemap: the root aggregates its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapNode {
    pub label: String,
    pub weight: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreemapNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins plus a kernel density curve scaled to bin counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    /// `[x, y]` points; empty when the density is undefined.
    pub density: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScatterPoint {
    pub name: String,
    pub x: u64,
    pub y: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub name: String,
    pub values: Vec<(NumericField, u64)>,
}

const KDE_POINTS: usize = 200;

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

pub fn summary(view: &View<'_>) -> DatasetSummary {
    let languages: BTreeSet<&str> = view.iter().filter_map(|r| r.language.as_deref()).collect();
    let mean_stars = (!view.is_empty()).then(|| {
        let total: f64 = view.iter().map(|r| r.stars_count as f64).sum();
        total / view.len() as f64
    });
    DatasetSummary {
        repositories: view.len(),
        languages: languages.len(),
        mean_stars,
    }
}

/// The `n` rows with the largest `field`, descending; ties keep view order.
pub fn top_n_by(view: &View<'_>, field: NumericField, n: usize) -> Vec<(String, u64)> {
    let mut rows: Vec<(String, u64)> = view.iter().map(|r| (r.name.clone(), field.value(r))).collect();
    // stable: equal values stay in view order
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.truncate(n);
    rows
}

pub fn correlation_matrix(view: &View<'_>, fields: &[NumericField]) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = fields
        .iter()
        .map(|&f| view.iter().map(|r| f.value(r) as f64).collect())
        .collect();

    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();

    CorrelationMatrix {
        fields: fields.to_vec(),
        values,
    }
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len();
    if n == 0 || n != b.len() {
        return f64::NAN;
    }
    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}

/// Mean of `value_field` per group, highest first, top `k`.
/// Rows whose group is null are dropped.
pub fn group_mean(view: &View<'_>, group_field: Field, value_field: NumericField, k: usize) -> Vec<(FieldValue, f64)> {
    let mut groups: BTreeMap<FieldValue, (f64, usize)> = BTreeMap::new();
    for rec in view.iter() {
        let key = group_field.value(rec);
        if key.is_null() {
            continue;
        }
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += value_field.value(rec) as f64;
        entry.1 += 1;
    }

    let mut means: Vec<(FieldValue, f64)> = groups
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means.truncate(k);
    means
}

/// Occurrences of each distinct non-null value, most frequent first, top `k`.
pub fn value_counts(view: &View<'_>, field: Field, k: usize) -> Vec<(FieldValue, usize)> {
    let mut counts: BTreeMap<FieldValue, usize> = BTreeMap::new();
    for rec in view.iter() {
        let value = field.value(rec);
        if !value.is_null() {
            *counts.entry(value).or_default() += 1;
        }
    }

    let mut counts: Vec<(FieldValue, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(k);
    counts
}

/// Sum of `weight_field` per group under a single root, heaviest group first.
/// Records with a null or empty group are left out entirely.
pub fn treemap_weights(view: &View<'_>, group_field: Field, weight_field: NumericField) -> TreemapNode {
    let mut groups: BTreeMap<String, u64> = BTreeMap::new();
    for rec in view.iter() {
        let key = group_field.value(rec);
        if key.is_blank() {
            continue;
        }
        let weight = groups.entry(key.to_string()).or_default();
        *weight = weight.saturating_add(weight_field.value(rec));
    }

    let mut children: Vec<TreemapNode> = groups
        .into_iter()
        .map(|(label, weight)| TreemapNode {
            label,
            weight,
            children: Vec::new(),
        })
        .collect();
    children.sort_by(|a, b| b.weight.cmp(&a.weight));

    TreemapNode {
        label: group_field.column().to_string(),
        weight: children.iter().fold(0u64, |acc, c| acc.saturating_add(c.weight)),
        children,
    }
}

pub fn histogram(view: &View<'_>, field: NumericField, bins: usize) -> Histogram {
    let values: Vec<f64> = view.iter().map(|r| field.value(r) as f64).collect();
    if values.is_empty() || bins == 0 {
        return Histogram {
            bins: Vec::new(),
            density: Vec::new(),
        };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range == 0.0 {
        return Histogram {
            bins: vec![HistogramBin {
                start: min - 0.5,
                end: min + 0.5,
                count: values.len(),
            }],
            density: Vec::new(),
        };
    }

    let width = range / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in &values {
        // the last bin is closed on the right
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count,
        })
        .collect();

    Histogram {
        bins,
        density: kde_curve(&values, min, max, width),
    }
}

/// Gaussian KDE with Scott's bandwidth, scaled so the area matches the
/// histogram's total count.
fn kde_curve(values: &[f64], min: f64, max: f64, bin_width: f64) -> Vec<[f64; 2]> {
    let n = values.len();
    if n < 2 {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = var.sqrt();
    if std_dev == 0.0 {
        return Vec::new();
    }

    let bandwidth = std_dev * (n as f64).powf(-0.2);
    let norm = 1.0 / (bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let scale = n as f64 * bin_width;

    let step = (max - min) / (KDE_POINTS - 1) as f64;
    (0..KDE_POINTS)
        .map(|i| {
            let x = min + i as f64 * step;
            let density = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm
                / n as f64;
            [x, density * scale]
        })
        .collect()
}

pub fn scatter(view: &View<'_>, x: NumericField, y: NumericField) -> Vec<ScatterPoint> {
    view.iter()
        .map(|r| ScatterPoint {
            name: r.name.clone(),
            x: x.value(r),
            y: y.value(r),
        })
        .collect()
}

/// Rows of `view` named in `names`, in view order.
pub fn compare(view: &View<'_>, names: &BTreeSet<String>, fields: &[NumericField]) -> Vec<ComparisonRow> {
    view.iter()
        .filter(|r| names.contains(&r.name))
        .map(|r| ComparisonRow {
            name: r.name.clone(),
            values: fields.iter().map(|&f| (f, f.value(r))).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::tests::{repo, sample};
    use crate::data::filter::{FilterCriteria, apply};
    use crate::data::model::Dataset;
    use proptest::prelude::*;

    const LANG: Field = Field::Language;
    const STARS: NumericField = NumericField::StarsCount;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn top_n_picks_the_largest() {
        let ds = sample();
        let view = apply(
            &ds,
            &FilterCriteria {
                min_stars: 6,
                max_contributors: 100,
                ..FilterCriteria::default()
            },
        );
        assert_eq!(top_n_by(&view, STARS, 1), [("B".to_string(), 50)]);
        assert_eq!(top_n_by(&view, STARS, 10).len(), 2);
    }

    #[test]
    fn top_n_ties_keep_source_order() {
        let ds = Dataset::from_records(vec![repo("x", 5, 1, None), repo("y", 9, 1, None), repo("z", 5, 1, None)]);
        let top = top_n_by(&View::all(&ds), STARS, 3);
        let names: Vec<&str> = top.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["y", "x", "z"]);
    }

    #[test]
    fn value_counts_after_further_restriction() {
        let ds = sample();
        let view = apply(
            &ds,
            &FilterCriteria {
                min_stars: 20,
                ..FilterCriteria::default()
            },
        );
        assert_eq!(value_counts(&view, LANG, 10), [(text("Rust"), 1)]);

        let all = View::all(&ds);
        let counts = value_counts(&all, LANG, 10);
        assert_eq!(counts, [(text("Go"), 2), (text("Rust"), 1)]);
        assert_eq!(counts.iter().map(|(_, c)| c).sum::<usize>(), all.len());
    }

    #[test]
    fn value_counts_skip_null_and_truncate() {
        let ds = Dataset::from_records(vec![
            repo("a", 1, 1, None),
            repo("b", 1, 1, Some("C")),
            repo("c", 1, 1, Some("D")),
            repo("d", 1, 1, Some("D")),
        ]);
        assert_eq!(value_counts(&View::all(&ds), LANG, 1), [(text("D"), 2)]);
    }

    #[test]
    fn group_mean_sorts_by_mean() {
        let ds = Dataset::from_records(vec![
            repo("a", 10, 1, Some("Go")),
            repo("b", 30, 1, Some("Go")),
            repo("c", 50, 1, Some("Rust")),
            repo("d", 1000, 1, None),
        ]);
        let means = group_mean(&View::all(&ds), LANG, STARS, 10);
        assert_eq!(means, [(text("Rust"), 50.0), (text("Go"), 20.0)]);
        assert_eq!(group_mean(&View::all(&ds), LANG, STARS, 1).len(), 1);
    }

    #[test]
    fn correlation_of_linear_columns_is_one() {
        let ds = Dataset::from_records(
            [(10, 21), (50, 101), (5, 11)]
                .into_iter()
                .enumerate()
                .map(|(i, (stars, forks))| {
                    let mut r = repo(&format!("r{i}"), stars, 1, None);
                    r.forks_count = forks;
                    r
                })
                .collect(),
        );
        let fields = [STARS, NumericField::ForksCount, NumericField::IssuesCount];
        let m = correlation_matrix(&View::all(&ds), &fields);
        let r = m.get(STARS, NumericField::ForksCount).unwrap_or(f64::NAN);
        assert!((r - 1.0).abs() < 1e-6, "got {r}");
        assert!((m.get(STARS, STARS).unwrap_or(f64::NAN) - 1.0).abs() < 1e-12);
        // issues_count is constant
        assert!(m.get(STARS, NumericField::IssuesCount).is_some_and(f64::is_nan));
        assert!(m.get(NumericField::IssuesCount, NumericField::IssuesCount).is_some_and(f64::is_nan));
        for i in 0..fields.len() {
            for j in 0..fields.len() {
                let (a, b) = (m.values[i][j], m.values[j][i]);
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
    }

    #[test]
    fn correlation_is_anticorrelated_when_reversed() {
        let ds = Dataset::from_records(vec![repo("a", 1, 30, None), repo("b", 2, 20, None), repo("c", 3, 10, None)]);
        let m = correlation_matrix(&View::all(&ds), &[STARS, NumericField::Contributors]);
        assert!((m.values[0][1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn treemap_skips_blank_groups() {
        let mut blank = repo("blank", 500, 1, None);
        blank.language = Some(String::new());
        let ds = Dataset::from_records(vec![
            blank,
            repo("none", 300, 1, None),
            repo("a", 10, 1, Some("Go")),
            repo("b", 20, 1, Some("Go")),
            repo("c", 40, 1, Some("Rust")),
        ]);
        let root = treemap_weights(&View::all(&ds), LANG, STARS);
        assert_eq!(root.weight, 70);
        let leaves: Vec<(&str, u64)> = root.children.iter().map(|c| (c.label.as_str(), c.weight)).collect();
        assert_eq!(leaves, [("Rust", 40), ("Go", 30)]);
    }

    #[test]
    fn treemap_weights_saturate_instead_of_overflowing() {
        let big = 9_000_000_000_000_000_000;
        let ds = Dataset::from_records(vec![
            repo("a", big, 1, Some("Go")),
            repo("b", big, 1, Some("Go")),
            repo("c", big, 1, Some("Rust")),
        ]);
        let root = treemap_weights(&View::all(&ds), LANG, STARS);
        assert_eq!(root.weight, u64::MAX);
        assert_eq!(root.children[0].label, "Go");
        assert_eq!(root.children[0].weight, u64::MAX);
        assert_eq!(root.children[1].weight, big);
    }

    #[test]
    fn histogram_counts_every_row() {
        let ds = Dataset::from_records((0..=10).map(|i| repo(&format!("r{i}"), 0, i, None)).collect());
        let h = histogram(&View::all(&ds), NumericField::Contributors, 5);
        assert_eq!(h.bins.len(), 5);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 11);
        // max lands in the closed last bin
        assert_eq!(h.bins[4].count, 3);
        assert!((h.bins[0].start - 0.0).abs() < f64::EPSILON);
        assert!((h.bins[4].end - 10.0).abs() < 1e-9);
        assert_eq!(h.density.len(), KDE_POINTS);
        assert!(h.density.iter().all(|[_, y]| y.is_finite() && *y >= 0.0));
    }

    #[test]
    fn histogram_of_constant_column_is_one_bin() {
        let ds = Dataset::from_records(vec![repo("a", 0, 4, None), repo("b", 0, 4, None)]);
        let h = histogram(&View::all(&ds), NumericField::Contributors, 50);
        assert_eq!(h.bins.len(), 1);
        assert_eq!(h.bins[0].count, 2);
        assert!(h.density.is_empty());
    }

    #[test]
    fn compare_keeps_view_order() {
        let ds = sample();
        let names: BTreeSet<String> = ["C".to_string(), "A".to_string(), "Z".to_string()].into();
        let rows = compare(&View::all(&ds), &names, &[STARS, NumericField::ForksCount]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[0].values, [(STARS, 10), (NumericField::ForksCount, 5)]);
        assert_eq!(rows[1].name, "C");
    }

    #[test]
    fn summary_counts_languages() {
        let ds = sample();
        let s = summary(&View::all(&ds));
        assert_eq!(s.repositories, 3);
        assert_eq!(s.languages, 2);
        assert!((s.mean_stars.unwrap_or_default() - 65.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_view_gives_empty_results() {
        let ds = Dataset::default();
        let view = View::all(&ds);
        assert!(top_n_by(&view, STARS, 10).is_empty());
        assert!(group_mean(&view, LANG, STARS, 10).is_empty());
        assert!(value_counts(&view, LANG, 10).is_empty());
        assert!(treemap_weights(&view, LANG, STARS).children.is_empty());
        assert!(histogram(&view, STARS, 50).bins.is_empty());
        assert!(scatter(&view, STARS, NumericField::ForksCount).is_empty());
        assert_eq!(summary(&view).mean_stars, None);
        let m = correlation_matrix(&view, &[STARS, NumericField::ForksCount]);
        assert!(m.values.iter().flatten().all(|v| v.is_nan()));
    }

    fn arb_view_rows() -> impl Strategy<Value = Dataset> {
        let lang = prop_oneof![Just(None), Just(Some("Go")), Just(Some("Rust")), Just(Some("C"))];
        prop::collection::vec((0u64..1000, lang), 0..50).prop_map(|rows| {
            Dataset::from_records(
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (stars, lang))| repo(&format!("r{i}"), stars, 1, lang))
                    .collect(),
            )
        })
    }

    proptest! {
        #[test]
        fn top_n_is_bounded_and_non_increasing(ds in arb_view_rows(), n in 0usize..60) {
            let view = View::all(&ds);
            let top = top_n_by(&view, STARS, n);
            prop_assert!(top.len() <= n.min(view.len()));
            prop_assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
        }

        #[test]
        fn grouped_keys_have_supporting_rows(ds in arb_view_rows()) {
            let view = View::all(&ds);
            for (key, count) in value_counts(&view, LANG, usize::MAX) {
                prop_assert!(count > 0);
                prop_assert!(view.iter().any(|r| LANG.value(r) == key));
            }
            for (key, _) in group_mean(&view, LANG, STARS, usize::MAX) {
                prop_assert!(view.iter().any(|r| LANG.value(r) == key));
            }
        }
    }
}
