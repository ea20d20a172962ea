use core::fmt;

use serde::Serialize;

use crate::{
    AnalysisConfig, AnalysisError, BoxPlotSummary, ChartPanel, DensityCurve, ErrorKind,
    Histogram, OutlierReport, PanelContent, Series, SummaryStatistics, TrendLine, YearWindow,
    detect_outliers, estimate_density,
};

const VALUE_LABEL: &str = "SUNACTIVITY";

/// Why a stage produced no record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    /// Coarse error kind
    pub kind: ErrorKind,
    /// Readable reason, shown in place of the panel
    pub message: String,
}

impl From<AnalysisError> for StageFailure {
    fn from(err: AnalysisError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of a single stage
pub type StageResult<T> = core::result::Result<T, StageFailure>;

fn run_stage<T>(stage: &'static str, result: crate::Result<T>) -> StageResult<T> {
    result.map_err(|err| {
        tracing::warn!(stage, kind = ?err.kind(), error = %err, "stage unavailable");
        StageFailure::from(err)
    })
}

/// Every derived record of one analysis pass
///
/// The stages fan out from the same series and never see each other's
/// output, so a failure is kept in that stage's own [`StageResult`] while
/// the siblings complete. Building is pure: the same series and
/// configuration always give an equal report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// The analysed series, full frame
    pub series: Series,
    /// Year window summarised by the box plot
    pub window: YearWindow,
    /// Descriptive statistics of the non-null values
    pub summary: StageResult<SummaryStatistics<f64>>,
    /// Descriptive statistics of the year column
    pub year_summary: StageResult<SummaryStatistics<f64>>,
    /// Density normalised histogram of the non-null values
    pub histogram: StageResult<Histogram<f64>>,
    /// Kernel density estimate of the non-null values
    pub density: StageResult<DensityCurve<f64>>,
    /// Tukey fence outliers
    pub outliers: StageResult<OutlierReport>,
    /// Box plot of the window, `Ok(None)` when no year falls inside it
    pub boxplot: StageResult<Option<BoxPlotSummary>>,
    /// Linear trend over the non-null years
    pub trend: StageResult<TrendLine<f64>>,
}

impl AnalysisReport {
    /// Runs every stage over `series`
    ///
    /// # Arguments
    ///
    /// * `series` - The loaded series
    /// * `config` - Stage parameters
    ///
    /// # Returns
    ///
    /// * `AnalysisReport` - One result per stage, failures included
    pub fn build(series: &Series, config: &AnalysisConfig) -> Self {
        let values = series.non_null_values();

        let summary = run_stage("statistics", SummaryStatistics::from_values(&values));
        let years: Vec<f64> = series.years().into_iter().map(f64::from).collect();
        let year_summary = run_stage("year statistics", SummaryStatistics::from_values(&years));
        let histogram = run_stage(
            "histogram",
            Histogram::from_values(&values, config.histogram_bins),
        );
        let density = run_stage(
            "density",
            estimate_density(&values, config.density_resolution, config.bandwidth),
        );
        let outliers = run_stage("outliers", detect_outliers(series, config.iqr_multiplier));

        let in_window = series.window(config.window);
        let boxplot = if in_window.is_empty() {
            Ok(None)
        } else {
            run_stage(
                "boxplot",
                BoxPlotSummary::from_values(&in_window.values(), config.iqr_multiplier).map(Some),
            )
        };

        let trend = run_stage("trend", TrendLine::from_series(series));

        let report = Self {
            series: series.clone(),
            window: config.window,
            summary,
            year_summary,
            histogram,
            density,
            outliers,
            boxplot,
            trend,
        };
        tracing::info!(
            observations = series.len(),
            failed = report.failed_stages(),
            "analysis complete"
        );
        report
    }

    /// Number of stages that produced no record
    pub fn failed_stages(&self) -> usize {
        [
            self.summary.is_err(),
            self.year_summary.is_err(),
            self.histogram.is_err(),
            self.density.is_err(),
            self.outliers.is_err(),
            self.boxplot.is_err(),
            self.trend.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }

    /// The four chart panels in layout order
    ///
    /// Line chart of the series, histogram with density overlay, box plot
    /// of the year window, then scatter with the trend line. A stage that
    /// failed leaves its panel [`PanelContent::Unavailable`]; an empty
    /// window gives [`PanelContent::NoData`].
    pub fn panels(&self) -> [ChartPanel; 4] {
        [
            self.timeline_panel(),
            self.distribution_panel(),
            self.window_panel(),
            self.trend_panel(),
        ]
    }

    fn timeline_panel(&self) -> ChartPanel {
        ChartPanel::new(
            "Sunspot Activity Over Time",
            "Year",
            VALUE_LABEL,
            PanelContent::Line {
                x: self.series.years(),
                y: self.series.values(),
            },
        )
    }

    fn distribution_panel(&self) -> ChartPanel {
        let content = match (&self.histogram, &self.density) {
            (Ok(histogram), Ok(density)) => PanelContent::HistogramDensity {
                histogram: histogram.clone(),
                density: density.clone(),
            },
            (Err(failure), _) | (_, Err(failure)) => PanelContent::Unavailable {
                reason: failure.message.clone(),
            },
        };
        ChartPanel::new("Distribution of Sunspot Activity", VALUE_LABEL, "Density", content)
    }

    fn window_panel(&self) -> ChartPanel {
        let YearWindow { start, end } = self.window;
        let content = match &self.boxplot {
            Ok(Some(summary)) => PanelContent::BoxPlot {
                start,
                end,
                summary: summary.clone(),
            },
            Ok(None) => PanelContent::NoData {
                message: format!("No data between {start} and {end}"),
            },
            Err(failure) => PanelContent::Unavailable {
                reason: failure.message.clone(),
            },
        };
        ChartPanel::new(format!("Boxplot ({start}-{end})"), VALUE_LABEL, "", content)
    }

    fn trend_panel(&self) -> ChartPanel {
        let content = match &self.trend {
            Ok(line) => {
                let (x, y): (Vec<i32>, Vec<f64>) = self
                    .series
                    .pairs()
                    .filter_map(|(year, value)| value.map(|v| (year, v)))
                    .unzip();
                let trend = line.predict_years(&x);
                PanelContent::ScatterTrend { x, y, trend }
            }
            Err(failure) => PanelContent::Unavailable {
                reason: failure.message.clone(),
            },
        };
        ChartPanel::new("Trend of Sunspot Activity", "Year", VALUE_LABEL, content)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary statistics")?;
        match &self.summary {
            Ok(summary) => writeln!(f, "{summary}")?,
            Err(failure) => writeln!(f, "unavailable: {failure}")?,
        }

        writeln!(f)?;
        writeln!(f, "Year column")?;
        match &self.year_summary {
            Ok(summary) => writeln!(f, "{summary}")?,
            Err(failure) => writeln!(f, "unavailable: {failure}")?,
        }

        writeln!(f)?;
        writeln!(f, "Missing values")?;
        for (column, count) in self.series.null_counts().iter() {
            writeln!(f, "{column:<12} {count}")?;
        }

        writeln!(f)?;
        writeln!(f, "Outliers (IQR)")?;
        match &self.outliers {
            Ok(report) => {
                writeln!(f, "lower bound  {:.2}", report.lower_bound)?;
                writeln!(f, "upper bound  {:.2}", report.upper_bound)?;
                if report.outliers.is_empty() {
                    writeln!(f, "no outliers")?;
                } else {
                    writeln!(f, "{:<6} {}", "YEAR", "y")?;
                    for o in &report.outliers {
                        if let Some(v) = o.value {
                            writeln!(f, "{:<6} {v}", o.year)?;
                        }
                    }
                }
            }
            Err(failure) => writeln!(f, "unavailable: {failure}")?,
        }

        writeln!(f)?;
        match &self.trend {
            Ok(line) => write!(
                f,
                "Trend        {:.4} per year (r2 {:.4}, {} points)",
                line.slope, line.r_squared, line.count
            ),
            Err(failure) => write!(f, "Trend        unavailable: {failure}"),
        }
    }
}
