//! Chart specifications handed to the presentation layer.
//!
//! Nothing here draws; a spec names the chart kind, its data and its axis
//! labels, and the egui front end or the JSON printer decides what to do with it.

use serde::Serialize;

use crate::data::aggregate::{CorrelationMatrix, Histogram, ScatterPoint, TreemapNode};

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(flatten)]
    pub kind: ChartKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    /// One bar per category, in the given order.
    Bar { bars: Vec<(String, f64)> },
    /// Several series sharing the same categories.
    GroupedBar {
        categories: Vec<String>,
        series: Vec<Series>,
    },
    Scatter {
        points: Vec<ScatterPoint>,
        log_x: bool,
        log_y: bool,
    },
    Histogram(Histogram),
    Heatmap(CorrelationMatrix),
    Treemap(TreemapNode),
}

#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            kind,
        }
    }

    pub fn axes(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    /// Whether the chart has anything to draw.
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ChartKind::Bar { bars } => bars.is_empty(),
            ChartKind::GroupedBar { categories, .. } => categories.is_empty(),
            ChartKind::Scatter { points, .. } => points.is_empty(),
            ChartKind::Histogram(h) => h.bins.is_empty(),
            ChartKind::Heatmap(m) => m.fields.is_empty(),
            ChartKind::Treemap(root) => root.children.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let spec = ChartSpec::new("Top", ChartKind::Bar {
            bars: vec![("Rust".to_string(), 2.0)],
        })
        .axes("language", "count");
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["title"], "Top");
        assert_eq!(json["x_label"], "language");
        assert_eq!(json["bars"][0][0], "Rust");
    }

    #[test]
    fn nan_correlations_become_null() {
        let spec = ChartSpec::new(
            "Correlation",
            ChartKind::Heatmap(CorrelationMatrix {
                fields: vec![crate::data::model::NumericField::StarsCount],
                values: vec![vec![f64::NAN]],
            }),
        );
        let json = serde_json::to_value(&spec).unwrap();
        assert!(json["values"][0][0].is_null());
        assert_eq!(json["fields"][0], "stars_count");
    }
}
