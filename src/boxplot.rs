use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{
    AnalysisError, Result,
    helper::{median_from_sorted_slice, sorted_finite},
    outliers::Fences,
};

/// Five number summary with Tukey whiskers, as drawn by a box plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotSummary {
    /// Number of values summarised
    pub count: usize,
    /// Lower whisker, the smallest value inside the lower fence
    pub whisker_low: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Upper whisker, the largest value inside the upper fence
    pub whisker_high: f64,
    /// Values beyond the whiskers, ascending
    pub fliers: Vec<f64>,
}

impl BoxPlotSummary {
    /// Summarises the non-null `values`
    ///
    /// # Arguments
    ///
    /// * `values` - The values, missing entries as `None`
    /// * `whisker` - Whisker reach in IQRs, conventionally 1.5
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - `InsufficientData` if no value is present
    pub fn from_values(values: &[Option<f64>], whisker: f64) -> Result<Self> {
        let fences = Fences::from_values(values, whisker)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let sorted = sorted_finite(&present);
        let median = median_from_sorted_slice(&sorted)
            .ok_or(AnalysisError::insufficient("boxplot", 1, 0, "values"))?;

        let inside = sorted
            .iter()
            .copied()
            .filter(|&v| v >= fences.lower && v <= fences.upper)
            .map(OrderedFloat);
        let whisker_low = inside.clone().min().map_or(fences.q1, |v| v.0);
        let whisker_high = inside.max().map_or(fences.q3, |v| v.0);

        let fliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < whisker_low || v > whisker_high)
            .collect();

        Ok(Self {
            count: sorted.len(),
            whisker_low,
            q1: fences.q1,
            median,
            q3: fences.q3,
            whisker_high,
            fliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whiskers_stop_at_the_last_inlier() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0].map(Some);
        let summary = BoxPlotSummary::from_values(&values, 1.5).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.whisker_low, 1.0);
        assert_eq!(summary.whisker_high, 4.0);
        assert_eq!(summary.fliers, vec![100.0]);
    }

    #[test]
    fn missing_values_are_ignored() {
        let values = [Some(10.0), None, Some(20.0), Some(30.0)];
        let summary = BoxPlotSummary::from_values(&values, 1.5).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.median, 20.0);
        assert!(summary.fliers.is_empty());
    }

    #[test]
    fn empty_input_is_insufficient() {
        assert!(BoxPlotSummary::from_values(&[], 1.5).is_err());
        assert!(BoxPlotSummary::from_values(&[None], 1.5).is_err());
    }
}
