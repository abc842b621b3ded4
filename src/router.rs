//! Maps a navigation selection to the sections that page shows.

use std::collections::BTreeSet;

use clap::ValueEnum;
use serde::Serialize;
use strum::EnumIter;

use crate::chart::{ChartKind, ChartSpec, Series};
use crate::data::aggregate::{self, DatasetSummary};
use crate::data::filter::View;
use crate::data::model::{Dataset, Field, NumericField};

const TOP_N: usize = 10;
const SIZE_BINS: usize = 50;

/// Columns shown in the overview correlation heatmap.
pub const CORRELATED_FIELDS: [NumericField; 4] = [
    NumericField::StarsCount,
    NumericField::ForksCount,
    NumericField::IssuesCount,
    NumericField::PullRequests,
];

/// Columns plotted side by side when comparing repositories.
pub const COMPARED_FIELDS: [NumericField; 2] = [NumericField::StarsCount, NumericField::ForksCount];

const ABOUT: &str = "\
This dashboard provides insights into GitHub repository data. It showcases \
various aspects of repositories including popularity, size, and programming \
language trends.

Data source: GitHub Dataset (available on Kaggle)

The dashboard includes features such as:
- Basic statistics and top repositories
- Interactive visualizations of repository data
- Language trend analysis
- Advanced filtering options
- Correlation analysis between different metrics";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumIter, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Overview,
    #[value(name = "analysis")]
    RepositoryAnalysis,
    #[value(name = "languages")]
    LanguageTrends,
    About,
}

impl Page {
    /// Label used in the navigation panel.
    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::RepositoryAnalysis => "Repository Analysis",
            Page::LanguageTrends => "Language Trends",
            Page::About => "About",
        }
    }
}

// ---------------------------------------------------------------------------
// Page output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PageOutput {
    pub page: Page,
    pub title: String,
    /// Rows in the filtered view, whatever the page shows.
    pub visible: usize,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(flatten)]
    pub body: SectionBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionBody {
    Text { text: String },
    Stats { stats: Vec<(String, String)> },
    Table { columns: Vec<String>, rows: Vec<Vec<String>> },
    Chart(ChartSpec),
}

impl Section {
    fn new(heading: &str, body: SectionBody) -> Self {
        Self {
            heading: Some(heading.to_string()),
            body,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            heading: None,
            body: SectionBody::Text { text: text.to_string() },
        }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Build the output of `page`.
///
/// The overview describes the whole dataset; the analysis and language pages
/// describe `view`. `compared` names repositories picked for side-by-side
/// comparison on the analysis page.
pub fn route(page: Page, dataset: &Dataset, view: &View<'_>, compared: &BTreeSet<String>) -> PageOutput {
    let sections = match page {
        Page::Overview => overview(&View::all(dataset)),
        Page::RepositoryAnalysis => repository_analysis(view, compared),
        Page::LanguageTrends => language_trends(view),
        Page::About => vec![Section::text(ABOUT)],
    };

    PageOutput {
        page,
        title: match page {
            Page::Overview => "GitHub Repository Dashboard".to_string(),
            Page::RepositoryAnalysis => "Repository Analysis".to_string(),
            Page::LanguageTrends => "Programming Language Trends".to_string(),
            Page::About => "About This Dashboard".to_string(),
        },
        visible: view.len(),
        sections,
    }
}

fn overview(all: &View<'_>) -> Vec<Section> {
    let top = aggregate::top_n_by(all, NumericField::StarsCount, TOP_N);

    vec![
        Section::text("A comprehensive dashboard showcasing GitHub repository data"),
        Section::new("Dataset Overview", summary_stats(&aggregate::summary(all))),
        Section::new(
            "Top 10 Repositories by Stars",
            SectionBody::Table {
                columns: vec![Field::Repositories.to_string(), NumericField::StarsCount.to_string()],
                rows: top
                    .into_iter()
                    .map(|(name, stars)| vec![name, stars.to_string()])
                    .collect(),
            },
        ),
        Section::new(
            "Correlation Analysis",
            SectionBody::Chart(ChartSpec::new(
                "Correlation Analysis",
                ChartKind::Heatmap(aggregate::correlation_matrix(all, &CORRELATED_FIELDS)),
            )),
        ),
    ]
}

fn summary_stats(summary: &DatasetSummary) -> SectionBody {
    let mean = summary
        .mean_stars
        .map_or_else(|| "n/a".to_string(), |m| format!("{m:.2}"));
    SectionBody::Stats {
        stats: vec![
            ("Total number of repositories".to_string(), summary.repositories.to_string()),
            ("Number of unique languages".to_string(), summary.languages.to_string()),
            ("Average stars per repository".to_string(), mean),
        ],
    }
}

fn repository_analysis(view: &View<'_>, compared: &BTreeSet<String>) -> Vec<Section> {
    let mut sections = vec![
        Section::new(
            "Stars vs. Forks",
            SectionBody::Text {
                text: "Each point is a repository. Both axes use a logarithmic scale, as star and \
                       fork counts vary widely between popular and less popular repositories."
                    .to_string(),
            },
        ),
        Section {
            heading: None,
            body: SectionBody::Chart(
                ChartSpec::new(
                    "Stars vs. Forks (Log Scale)",
                    ChartKind::Scatter {
                        points: aggregate::scatter(view, NumericField::StarsCount, NumericField::ForksCount),
                        log_x: true,
                        log_y: true,
                    },
                )
                .axes(NumericField::StarsCount.column(), NumericField::ForksCount.column()),
            ),
        },
        Section::new(
            "Repository Size Distribution",
            SectionBody::Chart(
                ChartSpec::new(
                    "Distribution of Repository Sizes",
                    ChartKind::Histogram(aggregate::histogram(view, NumericField::Contributors, SIZE_BINS)),
                )
                .axes("Size", "Count"),
            ),
        ),
    ];

    let rows = aggregate::compare(view, compared, &COMPARED_FIELDS);
    if !rows.is_empty() {
        let series = COMPARED_FIELDS
            .iter()
            .enumerate()
            .map(|(i, field)| Series {
                name: field.to_string(),
                values: rows.iter().map(|r| r.values[i].1 as f64).collect(),
            })
            .collect();
        sections.push(Section::new(
            "Repository Comparison",
            SectionBody::Chart(
                ChartSpec::new(
                    "Comparison of Selected Repositories",
                    ChartKind::GroupedBar {
                        categories: rows.into_iter().map(|r| r.name).collect(),
                        series,
                    },
                )
                .axes(Field::Repositories.column(), "value"),
            ),
        ));
    }

    sections
}

fn language_trends(view: &View<'_>) -> Vec<Section> {
    let counts = aggregate::value_counts(view, Field::Language, TOP_N)
        .into_iter()
        .map(|(lang, n)| (lang.to_string(), n as f64))
        .collect();
    let means = aggregate::group_mean(view, Field::Language, NumericField::StarsCount, TOP_N)
        .into_iter()
        .map(|(lang, mean)| (lang.to_string(), mean))
        .collect();

    vec![
        Section::new(
            "Top Programming Languages",
            SectionBody::Chart(
                ChartSpec::new("Top 10 Programming Languages", ChartKind::Bar { bars: counts })
                    .axes("language", "count"),
            ),
        ),
        Section::new(
            "Average Stars by Language",
            SectionBody::Chart(
                ChartSpec::new("Top 10 Languages by Average Stars", ChartKind::Bar { bars: means })
                    .axes("language", "average stars"),
            ),
        ),
        Section::new(
            "Language Distribution (Treemap)",
            SectionBody::Chart(ChartSpec::new(
                "Distribution of Languages by Star Count",
                ChartKind::Treemap(aggregate::treemap_weights(view, Field::Language, NumericField::StarsCount)),
            )),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::data::filter::tests::sample;
    use crate::data::filter::{FilterCriteria, apply};

    fn charts(out: &PageOutput) -> Vec<&ChartSpec> {
        out.sections
            .iter()
            .filter_map(|s| match &s.body {
                SectionBody::Chart(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn overview_ignores_filters() {
        let ds = sample();
        let criteria = FilterCriteria {
            min_stars: 1000,
            ..FilterCriteria::default()
        };
        let view = apply(&ds, &criteria);
        let out = route(Page::Overview, &ds, &view, &BTreeSet::new());

        assert_eq!(out.visible, 0);
        let table = out.sections.iter().find_map(|s| match &s.body {
            SectionBody::Table { rows, .. } => Some(rows),
            _ => None,
        });
        let rows = table.cloned().unwrap_or_default();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], ["B", "50"]);
        assert!(matches!(charts(&out)[0].kind, ChartKind::Heatmap(_)));
    }

    #[test]
    fn language_page_follows_the_view() {
        let ds = sample();
        let view = apply(
            &ds,
            &FilterCriteria {
                min_stars: 20,
                ..FilterCriteria::default()
            },
        );
        let out = route(Page::LanguageTrends, &ds, &view, &BTreeSet::new());
        assert_eq!(out.visible, 1);

        let charts = charts(&out);
        assert_eq!(charts.len(), 3);
        match &charts[0].kind {
            ChartKind::Bar { bars } => assert_eq!(bars, &[("Rust".to_string(), 1.0)]),
            other => panic!("unexpected {other:?}"),
        }
        match &charts[2].kind {
            ChartKind::Treemap(root) => assert_eq!(root.weight, 50),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn comparison_appears_only_when_selected() {
        let ds = sample();
        let view = View::all(&ds);
        let out = route(Page::RepositoryAnalysis, &ds, &view, &BTreeSet::new());
        assert_eq!(charts(&out).len(), 2);

        let picked: BTreeSet<String> = ["A".to_string(), "B".to_string()].into();
        let out = route(Page::RepositoryAnalysis, &ds, &view, &picked);
        let charts = charts(&out);
        assert_eq!(charts.len(), 3);
        match &charts[2].kind {
            ChartKind::GroupedBar { categories, series } => {
                assert_eq!(categories, &["A", "B"]);
                assert_eq!(series[0].values, [10.0, 50.0]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn about_is_static_text() {
        let ds = sample();
        let out = route(Page::About, &ds, &View::all(&ds), &BTreeSet::new());
        assert_eq!(out.sections.len(), 1);
        assert!(matches!(out.sections[0].body, SectionBody::Text { .. }));
    }

    #[test]
    fn every_page_handles_an_empty_dataset() {
        let ds = Dataset::default();
        let view = View::all(&ds);
        for page in Page::iter() {
            let out = route(page, &ds, &view, &BTreeSet::new());
            assert_eq!(out.visible, 0);
            assert!(serde_json::to_string(&out).is_ok());
        }
    }
}
