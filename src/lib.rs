#![doc = include_str!("../README.md")]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::just_underscores_and_digits)]

pub(crate) type Kbn<T> = compensated_summation::KahanBabuskaNeumaier<T>;

mod utils;
pub(crate) use utils::{helper, moments};

mod error;
pub use error::{AnalysisError, ErrorKind, Result};

mod config;
pub use config::{AnalysisConfig, BandwidthRule, YearWindow};

mod series;
pub use series::{NullCounts, Observation, Series};

mod loader;
pub use loader::{load_csv, load_reader};

mod summary;
pub use summary::SummaryStatistics;

mod density;
pub use density::{DensityCurve, GaussianKde, estimate_density};

mod histogram;
pub use histogram::Histogram;

mod outliers;
pub use outliers::{Fences, OutlierReport, detect_outliers};

mod trend;
pub use trend::TrendLine;

mod boxplot;
pub use boxplot::BoxPlotSummary;

mod chart;
pub use chart::{ChartPanel, PanelContent};

mod report;
pub use report::{AnalysisReport, StageFailure, StageResult};
