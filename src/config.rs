use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, Result};

/// Inclusive range of years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    /// First year in the window
    pub start: i32,
    /// Last year in the window
    pub end: i32,
}

impl YearWindow {
    /// Creates a new inclusive window
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Returns true if `year` falls in `[start, end]`
    #[inline]
    pub const fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self::new(1900, 2000)
    }
}

/// Kernel bandwidth selection for the density estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BandwidthRule {
    /// Scott's rule, factor `n^(-1/5)`
    #[default]
    Scott,
    /// Silverman's rule, factor `(3n/4)^(-1/5)`
    Silverman,
    /// Fixed kernel standard deviation
    Fixed(f64),
}

/// Caller owned constants for one analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the year column in the source
    pub year_column: String,
    /// Name of the activity value column in the source
    pub value_column: String,
    /// Historical window summarised by the box plot panel
    pub window: YearWindow,
    /// Number of histogram bins
    pub histogram_bins: usize,
    /// Number of points the density curve is evaluated at
    pub density_resolution: usize,
    /// IQR multiplier of the outlier fences
    pub iqr_multiplier: f64,
    /// Bandwidth rule of the density estimator
    pub bandwidth: BandwidthRule,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            year_column: "YEAR".to_string(),
            value_column: "y".to_string(),
            window: YearWindow::default(),
            histogram_bins: 30,
            density_resolution: 200,
            iqr_multiplier: 1.5,
            bandwidth: BandwidthRule::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parses a configuration from JSON, missing fields take their defaults
    ///
    /// # Arguments
    ///
    /// * `json` - The JSON document
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The validated configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the JSON file
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The validated configuration
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks every value is usable by the pipeline
    ///
    /// # Returns
    ///
    /// * `Result<()>` - `InvalidConfig` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if self.year_column.trim().is_empty() || self.value_column.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "column names must not be empty".to_string(),
            ));
        }
        if self.histogram_bins == 0 {
            return Err(AnalysisError::InvalidConfig(
                "histogram_bins must be positive".to_string(),
            ));
        }
        if self.density_resolution < 2 {
            return Err(AnalysisError::InvalidConfig(
                "density_resolution must be at least 2".to_string(),
            ));
        }
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "iqr_multiplier must be finite and non-negative, got {}",
                self.iqr_multiplier
            )));
        }
        if self.window.start > self.window.end {
            return Err(AnalysisError::InvalidConfig(format!(
                "window start {} is after end {}",
                self.window.start, self.window.end
            )));
        }
        if let BandwidthRule::Fixed(h) = self.bandwidth
            && (!h.is_finite() || h <= 0.0)
        {
            return Err(AnalysisError::InvalidConfig(format!(
                "fixed bandwidth must be finite and positive, got {h}"
            )));
        }
        Ok(())
    }
}
