use serde::Serialize;
use thiserror::Error;

/// Coarse classification of an [`AnalysisError`]
///
/// Presentation code branches on the kind rather than on individual variants
/// when deciding how to surface a failed panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The source is unreadable, malformed, or does not fit the configuration
    Load,
    /// A cell could not be converted to the type its column requires
    Parse,
    /// A stage's minimum sample size precondition was not met
    InsufficientData,
}

/// Errors produced while loading a series or computing a derived record
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The source could not be opened or read
    #[error("cannot read source: {0}")]
    Io(#[from] std::io::Error),

    /// The source is not well-formed CSV
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row
    #[error("required column `{0}` not found")]
    MissingColumn(String),

    /// The source has a header but no data rows
    #[error("source contains no data rows")]
    EmptySource,

    /// A cell could not be parsed
    #[error("row {row}: cannot parse `{value}` in column `{column}` as {expected}")]
    Parse {
        /// 1-based data row number (header excluded)
        row: usize,
        /// Column name
        column: String,
        /// Raw cell text
        value: String,
        /// Human readable target type
        expected: &'static str,
    },

    /// Two rows share a year
    #[error("duplicate year {0}")]
    DuplicateYear(i32),

    /// Not enough usable data for a stage
    #[error("{stage}: requires at least {required} {unit}, got {got}")]
    InsufficientData {
        /// Stage that rejected its input
        stage: &'static str,
        /// Minimum accepted count
        required: usize,
        /// Count actually available
        got: usize,
        /// What is being counted
        unit: &'static str,
    },

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    /// Returns the coarse kind of the error
    ///
    /// # Returns
    ///
    /// * `ErrorKind` - `Load`, `Parse` or `InsufficientData`
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_)
            | Self::Csv(_)
            | Self::MissingColumn(_)
            | Self::EmptySource
            | Self::InvalidConfig(_) => ErrorKind::Load,
            Self::Parse { .. } | Self::DuplicateYear(_) => ErrorKind::Parse,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
        }
    }

    pub(crate) const fn insufficient(
        stage: &'static str,
        required: usize,
        got: usize,
        unit: &'static str,
    ) -> Self {
        Self::InsufficientData {
            stage,
            required,
            got,
            unit,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AnalysisError>;
