use core::fmt;

use num_traits::Float;
use serde::Serialize;

use crate::{
    AnalysisError, Result,
    helper::{median_from_sorted_slice, quantile_from_sorted_slice, sorted_finite},
    moments::Moments,
};

/// Describe-style summary of a numeric projection
///
/// `std` is the sample standard deviation (`n - 1` denominator). `skewness`
/// and `kurtosis` are the biased Fisher estimators `g1` and excess `g2`; both
/// are NaN when the values have no spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStatistics<T> {
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: T,
    /// Sample standard deviation, NaN for a single value
    pub std: T,
    /// Smallest value
    pub min: T,
    /// First quartile
    pub q1: T,
    /// Median
    pub median: T,
    /// Third quartile
    pub q3: T,
    /// Largest value
    pub max: T,
    /// Skewness (g1)
    pub skewness: T,
    /// Excess kurtosis (g2)
    pub kurtosis: T,
}

impl<T> SummaryStatistics<T>
where
    T: Float + Default,
{
    /// Computes the summary of the null filtered projection `values`
    ///
    /// Non-finite entries are treated as missing and skipped.
    ///
    /// # Arguments
    ///
    /// * `values` - The values
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - `InsufficientData` if no finite value remains
    ///
    /// # Examples
    ///
    /// ```
    /// # use sunspot_analysis::SummaryStatistics;
    /// # use assert_approx_eq::assert_approx_eq;
    /// let stats = SummaryStatistics::from_values(&[1.0f64, 2.0, 3.0, 4.0, 100.0]).unwrap();
    ///
    /// assert_eq!(stats.count, 5);
    /// assert_eq!(stats.q1, 2.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.q3, 4.0);
    /// assert_approx_eq!(stats.mean, 22.0, 1e-9);
    /// assert!(stats.skewness > 1.0);
    /// ```
    pub fn from_values(values: &[T]) -> Result<Self> {
        let sorted = sorted_finite(values);
        let moments = Moments::from_slice(&sorted)
            .ok_or(AnalysisError::insufficient("statistics", 1, 0, "values"))?;

        let quantile = |q| {
            quantile_from_sorted_slice(&sorted, q)
                .ok_or(AnalysisError::insufficient("statistics", 1, 0, "values"))
        };
        let median = median_from_sorted_slice(&sorted)
            .ok_or(AnalysisError::insufficient("statistics", 1, 0, "values"))?;

        Ok(Self {
            count: moments.count(),
            mean: moments.mean(),
            std: moments.with_ddof(true).stddev(),
            min: sorted[0],
            q1: quantile(0.25)?,
            median,
            q3: quantile(0.75)?,
            max: sorted[sorted.len() - 1],
            skewness: moments.skew(),
            kurtosis: moments.kurt(),
        })
    }

    /// Interquartile range `q3 - q1`
    #[inline]
    pub fn iqr(&self) -> T {
        self.q3 - self.q1
    }
}

impl<T: fmt::Display> fmt::Display for SummaryStatistics<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count    {}", self.count)?;
        writeln!(f, "mean     {:.6}", self.mean)?;
        writeln!(f, "std      {:.6}", self.std)?;
        writeln!(f, "min      {:.6}", self.min)?;
        writeln!(f, "25%      {:.6}", self.q1)?;
        writeln!(f, "50%      {:.6}", self.median)?;
        writeln!(f, "75%      {:.6}", self.q3)?;
        writeln!(f, "max      {:.6}", self.max)?;
        writeln!(f, "skewness {:.4}", self.skewness)?;
        write!(f, "kurtosis {:.4}", self.kurtosis)
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn describe_works() {
        let stats = SummaryStatistics::from_values(&[25.4f64, 26.2, 26.0, 26.1]).unwrap();
        assert_eq!(stats.count, 4);
        assert_approx_eq!(stats.mean, 25.925, 0.0001);
        assert_approx_eq!(stats.std, 0.3594, 0.0001);
        assert_eq!(stats.min, 25.4);
        assert_eq!(stats.max, 26.2);
        assert_approx_eq!(stats.q1, 25.85, 0.0001);
        assert_approx_eq!(stats.median, 26.05, 0.0001);
        assert_approx_eq!(stats.q3, 26.125, 0.0001);
        assert_approx_eq!(stats.skewness, -0.9794, 0.0001);
        assert_approx_eq!(stats.kurtosis, -0.7981, 0.0001);
    }

    #[test]
    fn order_statistics_are_monotone() {
        let inputs: [f64; 12] = [83.4, 47.7, 47.8, 30.7, 12.2, 9.6, 10.2, 32.4, 47.6, 54.0, 62.9, 85.9];
        let stats = SummaryStatistics::from_values(&inputs).unwrap();
        assert_eq!(stats.count, inputs.len());
        assert!(stats.min <= stats.q1);
        assert!(stats.q1 <= stats.median);
        assert!(stats.median <= stats.q3);
        assert!(stats.q3 <= stats.max);
    }

    #[test]
    fn constant_series_has_nan_shape() {
        let stats = SummaryStatistics::from_values(&[5.0f64, 5.0, 5.0]).unwrap();
        assert_eq!(stats.std, 0.0);
        assert!(stats.skewness.is_nan());
        assert!(stats.kurtosis.is_nan());
        assert_eq!(stats.iqr(), 0.0);
    }

    #[test]
    fn single_value_is_accepted() {
        let stats = SummaryStatistics::from_values(&[42.0f64]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 42.0);
        assert!(stats.std.is_nan());
        assert_eq!(stats.q1, 42.0);
        assert_eq!(stats.q3, 42.0);
    }

    #[test]
    fn empty_input_is_insufficient() {
        let err = SummaryStatistics::<f64>::from_values(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);

        let err = SummaryStatistics::from_values(&[f64::NAN]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let inputs: [f64; 11] = [5.0, 11.0, 16.0, 23.0, 36.0, 58.0, 29.0, 20.0, 10.0, 8.0, 3.0];
        let a = SummaryStatistics::from_values(&inputs).unwrap();
        let b = SummaryStatistics::from_values(&inputs).unwrap();
        assert_eq!(a.mean.to_bits(), b.mean.to_bits());
        assert_eq!(a.skewness.to_bits(), b.skewness.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn display_rounds_shape_to_four_places() {
        let stats = SummaryStatistics::from_values(&[25.4f64, 26.2, 26.0, 26.1]).unwrap();
        let text = stats.to_string();
        assert!(text.contains("skewness -0.9794"));
        assert!(text.contains("kurtosis -0.7981"));
    }
}
