use serde::Serialize;

use crate::{
    AnalysisError, Observation, Result, Series,
    helper::{quantile_from_sorted_slice, sorted_finite},
};

/// Tukey fences and the observations falling outside them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    /// First quartile of the non-null values
    pub q1: f64,
    /// Third quartile of the non-null values
    pub q3: f64,
    /// `q3 - q1`
    pub iqr: f64,
    /// `q1 - k * iqr`
    pub lower_bound: f64,
    /// `q3 + k * iqr`
    pub upper_bound: f64,
    /// Number of non-null values that were classified
    pub inspected: usize,
    /// Flagged observations in chronological order
    pub outliers: Vec<Observation>,
}

impl OutlierReport {
    /// Returns true if `value` lies outside the fences
    #[inline]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower_bound || value > self.upper_bound
    }
}

/// Inlier range derived from the quartiles of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fences {
    /// First quartile
    pub q1: f64,
    /// Third quartile
    pub q3: f64,
    /// Lower fence
    pub lower: f64,
    /// Upper fence
    pub upper: f64,
}

impl Fences {
    /// Computes `[q1 - k * iqr, q3 + k * iqr]` over the non-null values
    ///
    /// Missing values are dropped before the quartiles are taken; they can
    /// never be compared against the fences. Quartiles use the same linear
    /// interpolation as [`SummaryStatistics`](crate::SummaryStatistics).
    ///
    /// # Arguments
    ///
    /// * `values` - The raw value column, missing entries as `None`
    /// * `multiplier` - The IQR multiplier `k`, conventionally 1.5
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - `InsufficientData` if every value is missing
    pub fn from_values(values: &[Option<f64>], multiplier: f64) -> Result<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let sorted = sorted_finite(&present);
        let insufficient = || AnalysisError::insufficient("outliers", 1, 0, "non-null values");

        let q1 = quantile_from_sorted_slice(&sorted, 0.25).ok_or_else(insufficient)?;
        let q3 = quantile_from_sorted_slice(&sorted, 0.75).ok_or_else(insufficient)?;
        let iqr = q3 - q1;

        Ok(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }
}

/// Flags the observations of `series` outside the Tukey fences
///
/// # Arguments
///
/// * `series` - The full series, missing values included
/// * `multiplier` - The IQR multiplier, conventionally 1.5
///
/// # Returns
///
/// * `Result<OutlierReport>` - `InsufficientData` if the series has no non-null value
///
/// # Examples
///
/// ```
/// # use sunspot_analysis::{Series, detect_outliers};
/// let series = Series::from_pairs([
///     (2000, Some(1.0)),
///     (2001, Some(2.0)),
///     (2002, Some(3.0)),
///     (2003, Some(4.0)),
///     (2004, Some(100.0)),
/// ])
/// .unwrap();
///
/// let report = detect_outliers(&series, 1.5).unwrap();
/// assert_eq!(report.lower_bound, -1.0);
/// assert_eq!(report.upper_bound, 7.0);
/// assert_eq!(report.outliers.len(), 1);
/// assert_eq!(report.outliers[0].year, 2004);
/// ```
pub fn detect_outliers(series: &Series, multiplier: f64) -> Result<OutlierReport> {
    let fences = Fences::from_values(&series.values(), multiplier)?;

    let mut inspected = 0usize;
    let outliers: Vec<Observation> = series
        .observations()
        .iter()
        .filter(|o| match o.value {
            Some(v) if v.is_finite() => {
                inspected += 1;
                v < fences.lower || v > fences.upper
            }
            _ => false,
        })
        .copied()
        .collect();

    tracing::debug!(
        lower = fences.lower,
        upper = fences.upper,
        flagged = outliers.len(),
        inspected,
        "classified outliers"
    );

    Ok(OutlierReport {
        q1: fences.q1,
        q3: fences.q3,
        iqr: fences.q3 - fences.q1,
        lower_bound: fences.lower,
        upper_bound: fences.upper,
        inspected,
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::{ErrorKind, SummaryStatistics};

    fn series(values: &[Option<f64>]) -> Series {
        Series::from_pairs(values.iter().enumerate().map(|(i, v)| (1900 + i as i32, *v))).unwrap()
    }

    #[test]
    fn tukey_fences_work() {
        let s = series(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(100.0)]);
        let report = detect_outliers(&s, 1.5).unwrap();
        assert_eq!(report.q1, 2.0);
        assert_eq!(report.q3, 4.0);
        assert_eq!(report.iqr, 2.0);
        assert_eq!(report.lower_bound, -1.0);
        assert_eq!(report.upper_bound, 7.0);
        assert_eq!(report.inspected, 5);
        assert_eq!(report.outliers, vec![Observation::new(1904, Some(100.0))]);
    }

    #[test]
    fn bounds_follow_quartiles() {
        let values = [83.4, 47.7, 47.8, 30.7, 12.2, 9.6, 10.2, 32.4, 47.6, 54.0, 62.9, 85.9];
        let s = series(&values.map(Some));
        let report = detect_outliers(&s, 1.5).unwrap();
        let stats = SummaryStatistics::from_values(&values).unwrap();

        assert_eq!(report.q1, stats.q1);
        assert_eq!(report.q3, stats.q3);
        assert_approx_eq!(report.lower_bound, stats.q1 - 1.5 * (stats.q3 - stats.q1), 1e-12);
        assert_approx_eq!(report.upper_bound, stats.q3 + 1.5 * (stats.q3 - stats.q1), 1e-12);
        assert!(report.lower_bound <= report.upper_bound);
    }

    #[test]
    fn nulls_are_dropped_before_quartiles_and_never_flagged() {
        let s = series(&[Some(1.0), None, Some(2.0), Some(3.0), None, Some(4.0), Some(100.0)]);
        let report = detect_outliers(&s, 1.5).unwrap();
        assert_eq!(report.lower_bound, -1.0);
        assert_eq!(report.upper_bound, 7.0);
        assert_eq!(report.inspected, 5);
        assert_eq!(report.outliers.len(), 1);
        assert!(report.outliers.iter().all(|o| o.value.is_some()));
    }

    #[test]
    fn outliers_keep_chronological_order() {
        let s = series(&[Some(-50.0), Some(10.0), Some(11.0), Some(12.0), Some(13.0), Some(90.0)]);
        let report = detect_outliers(&s, 1.5).unwrap();
        let years: Vec<i32> = report.outliers.iter().map(|o| o.year).collect();
        assert_eq!(years, vec![1900, 1905]);
    }

    #[test]
    fn tiny_samples_degrade_gracefully() {
        let report = detect_outliers(&series(&[Some(3.0)]), 1.5).unwrap();
        assert_eq!(report.lower_bound, 3.0);
        assert_eq!(report.upper_bound, 3.0);
        assert!(report.outliers.is_empty());

        let report = detect_outliers(&series(&[Some(1.0), Some(5.0)]), 1.5).unwrap();
        assert_eq!(report.q1, 2.0);
        assert_eq!(report.q3, 4.0);
        assert!(report.outliers.is_empty());
    }

    #[test]
    fn all_null_is_insufficient() {
        let err = detect_outliers(&series(&[None, None]), 1.5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn detection_is_idempotent() {
        let s = series(&[Some(1.0), Some(2.0), None, Some(3.0), Some(4.0), Some(100.0)]);
        assert_eq!(detect_outliers(&s, 1.5).unwrap(), detect_outliers(&s, 1.5).unwrap());
    }
}
