use serde::Serialize;

use crate::{BoxPlotSummary, DensityCurve, Histogram};

/// What a panel draws
///
/// Descriptors carry data only; turning them into pixels is the job of
/// whatever renderer consumes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelContent {
    /// Connected line through the chronological series
    Line {
        /// Years
        x: Vec<i32>,
        /// Values, gaps where missing
        y: Vec<Option<f64>>,
    },
    /// Density normalised histogram with the density curve overlaid
    HistogramDensity {
        /// Histogram bars
        histogram: Histogram<f64>,
        /// Smooth density estimate
        density: DensityCurve<f64>,
    },
    /// Horizontal box plot of a year window
    BoxPlot {
        /// First year of the window
        start: i32,
        /// Last year of the window
        end: i32,
        /// Box plot statistics
        summary: BoxPlotSummary,
    },
    /// Scatter of observations with the fitted trend drawn over the same years
    ScatterTrend {
        /// Years of the plotted points
        x: Vec<i32>,
        /// Observed values
        y: Vec<f64>,
        /// Trend prediction at each year
        trend: Vec<f64>,
    },
    /// The panel's input selected nothing
    NoData {
        /// Text to display in place of the chart
        message: String,
    },
    /// The panel's computation failed
    Unavailable {
        /// Readable failure reason
        reason: String,
    },
}

/// One titled, labelled chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPanel {
    /// Panel title
    pub title: String,
    /// Horizontal axis label
    pub x_label: String,
    /// Vertical axis label
    pub y_label: String,
    /// What the panel draws
    pub content: PanelContent,
}

impl ChartPanel {
    /// Creates a panel
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        content: PanelContent,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            content,
        }
    }

    /// Returns true if the panel has something to draw
    pub fn has_data(&self) -> bool {
        !matches!(
            self.content,
            PanelContent::NoData { .. } | PanelContent::Unavailable { .. }
        )
    }

    /// Serializes the panel to JSON for an external renderer
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_panels_have_no_data() {
        let panel = ChartPanel::new(
            "Boxplot (1900-2000)",
            "SUNACTIVITY",
            "",
            PanelContent::NoData {
                message: "No data between 1900 and 2000".to_string(),
            },
        );
        assert!(!panel.has_data());

        let panel = ChartPanel::new(
            "Trend",
            "Year",
            "SUNACTIVITY",
            PanelContent::Line {
                x: vec![1900],
                y: vec![Some(1.0)],
            },
        );
        assert!(panel.has_data());
    }

    #[test]
    fn content_is_tagged_in_json() {
        let panel = ChartPanel::new(
            "Distribution",
            "SUNACTIVITY",
            "Density",
            PanelContent::Unavailable {
                reason: "density: requires at least 2 distinct values, got 1".to_string(),
            },
        );
        let json: serde_json::Value = serde_json::from_str(&panel.to_json().unwrap()).unwrap();
        assert_eq!(json["content"]["type"], "unavailable");
        assert_eq!(json["title"], "Distribution");
    }
}
