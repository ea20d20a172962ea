use num_traits::{Float, FloatConst};
use serde::Serialize;

use crate::{
    AnalysisError, BandwidthRule, Kbn, Result,
    helper::{distinct_count, linspace, sorted_finite},
    moments::Moments,
};

/// Gaussian kernel density estimate of a univariate sample
///
/// Every finite sample point carries a normal kernel of standard deviation
/// `bandwidth`; the estimate at `x` is the average kernel height. Kernel
/// placement is fully determined by the data, so evaluating the same sample
/// twice gives bit identical results.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKde<T> {
    /// Sample points in ascending order
    points: Vec<T>,
    /// Kernel standard deviation
    bandwidth: T,
}

impl<T> GaussianKde<T>
where
    T: Float + FloatConst + Default,
{
    /// Fits the estimator to `values`
    ///
    /// The kernel standard deviation is the sample standard deviation scaled
    /// by the rule's factor: `n^(-1/5)` for Scott, `(3n/4)^(-1/5)` for
    /// Silverman. A fixed rule uses its value as is.
    ///
    /// # Arguments
    ///
    /// * `values` - The sample, non-finite entries are ignored
    /// * `rule` - The bandwidth rule
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - `InsufficientData` unless there are at least two distinct values
    pub fn new(values: &[T], rule: BandwidthRule) -> Result<Self> {
        let distinct = distinct_count(values);
        if distinct < 2 {
            return Err(AnalysisError::insufficient(
                "density",
                2,
                distinct,
                "distinct values",
            ));
        }

        let points = sorted_finite(values);
        let moments = Moments::from_slice(&points)
            .ok_or(AnalysisError::insufficient("density", 2, 0, "distinct values"))?;
        let std = moments.with_ddof(true).stddev();
        let n = points.len() as f64;

        let bandwidth = match rule {
            BandwidthRule::Scott => T::from(n.powf(-0.2)).map(|factor| std * factor),
            BandwidthRule::Silverman => {
                T::from((n * 0.75).powf(-0.2)).map(|factor| std * factor)
            }
            BandwidthRule::Fixed(h) => T::from(h),
        }
        .filter(|h| h.is_finite() && *h > T::zero())
        .ok_or(AnalysisError::insufficient(
            "density",
            2,
            distinct,
            "distinct values",
        ))?;

        tracing::debug!(points = points.len(), distinct, "fitted gaussian kde");
        Ok(Self { points, bandwidth })
    }

    /// Kernel standard deviation
    #[inline]
    pub fn bandwidth(&self) -> T {
        self.bandwidth
    }

    /// Number of sample points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the estimator holds no sample points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Evaluates the density at `x`
    ///
    /// # Arguments
    ///
    /// * `x` - The evaluation point
    ///
    /// # Returns
    ///
    /// * `T` - The non-negative density estimate
    pub fn evaluate(&self, x: T) -> T {
        let (Some(n), Some(_2)) = (T::from(self.points.len()), T::from(2.0)) else {
            return T::zero();
        };
        let h = self.bandwidth;
        let norm = n * h * (_2 * T::PI()).sqrt();

        let mut sum = Kbn::<T>::default();
        for &p in &self.points {
            let z = (x - p) / h;
            sum += (-(z * z) / _2).exp();
        }
        (sum.total() / norm).max(T::zero())
    }

    /// Evaluates the density at every point of `xs`
    pub fn evaluate_many(&self, xs: &[T]) -> Vec<T> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

/// Density estimate sampled over the observed range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCurve<T> {
    /// Evenly spaced points over `[min, max]` of the sample
    pub domain: Vec<T>,
    /// Density estimate at each domain point
    pub values: Vec<T>,
    /// Kernel standard deviation used
    pub bandwidth: T,
}

impl<T> DensityCurve<T> {
    /// Number of sampled points
    #[inline]
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    /// Returns true if the curve has no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }
}

/// Estimates the density of `values` at `resolution` points spanning its range
///
/// # Arguments
///
/// * `values` - The null filtered sample
/// * `resolution` - Number of evaluation points, both range ends included
/// * `rule` - The bandwidth rule
///
/// # Returns
///
/// * `Result<DensityCurve<T>>` - `InsufficientData` for fewer than two distinct values
///
/// # Examples
///
/// ```
/// # use sunspot_analysis::{BandwidthRule, estimate_density};
/// let curve = estimate_density(&[1.0, 2.0, 2.5, 3.0, 7.0], 200, BandwidthRule::Scott).unwrap();
///
/// assert_eq!(curve.domain.len(), 200);
/// assert_eq!(curve.values.len(), 200);
/// assert_eq!(curve.domain[0], 1.0);
/// assert_eq!(curve.domain[199], 7.0);
/// assert!(curve.values.iter().all(|v| *v >= 0.0));
///
/// assert!(estimate_density(&[5.0, 5.0, 5.0], 200, BandwidthRule::Scott).is_err());
/// ```
pub fn estimate_density<T>(
    values: &[T],
    resolution: usize,
    rule: BandwidthRule,
) -> Result<DensityCurve<T>>
where
    T: Float + FloatConst + Default,
{
    let kde = GaussianKde::new(values, rule)?;
    let (min, max) = match (kde.points.first(), kde.points.last()) {
        (Some(&min), Some(&max)) => (min, max),
        _ => return Err(AnalysisError::insufficient("density", 2, 0, "distinct values")),
    };
    let domain = linspace(min, max, resolution);
    let values = kde.evaluate_many(&domain);
    Ok(DensityCurve {
        domain,
        values,
        bandwidth: kde.bandwidth,
    })
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::ErrorKind;

    const SAMPLE: [f64; 12] = [
        83.4, 47.7, 47.8, 30.7, 12.2, 9.6, 10.2, 32.4, 47.6, 54.0, 62.9, 85.9,
    ];

    #[test]
    fn scott_bandwidth_scales_sample_std() {
        let kde = GaussianKde::new(&[1.0, 2.0, 3.0, 4.0, 5.0], BandwidthRule::Scott).unwrap();
        // sample std of 1..=5 is sqrt(2.5)
        assert_approx_eq!(kde.bandwidth(), 2.5f64.sqrt() * 5f64.powf(-0.2), 1e-12);
    }

    #[test]
    fn silverman_bandwidth_scales_sample_std() {
        let kde = GaussianKde::new(&[1.0, 2.0, 3.0, 4.0, 5.0], BandwidthRule::Silverman).unwrap();
        assert_approx_eq!(kde.bandwidth(), 2.5f64.sqrt() * 3.75f64.powf(-0.2), 1e-12);
    }

    #[test]
    fn two_point_density_matches_closed_form() {
        let kde = GaussianKde::new(&[0.0, 2.0], BandwidthRule::Fixed(1.0)).unwrap();
        let phi = |z: f64| (-(z * z) / 2.0).exp() / (2.0 * core::f64::consts::PI).sqrt();
        assert_approx_eq!(kde.evaluate(0.0), (phi(0.0) + phi(2.0)) / 2.0, 1e-12);
        assert_approx_eq!(kde.evaluate(1.0), phi(1.0), 1e-12);
    }

    #[test]
    fn density_integrates_to_about_one() {
        let kde = GaussianKde::new(&SAMPLE, BandwidthRule::Scott).unwrap();
        let xs = linspace(-100.0, 250.0, 7001);
        let dx = xs[1] - xs[0];
        let area: f64 = kde.evaluate_many(&xs).iter().sum::<f64>() * dx;
        assert_approx_eq!(area, 1.0, 1e-3);
    }

    #[test]
    fn curve_spans_observed_range() {
        let curve = estimate_density(&SAMPLE, 200, BandwidthRule::Scott).unwrap();
        assert_eq!(curve.len(), 200);
        assert_eq!(curve.values.len(), curve.domain.len());
        assert_eq!(curve.domain[0], 9.6);
        assert_eq!(curve.domain[199], 85.9);
        assert!(curve.values.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn nan_entries_are_ignored() {
        let mut with_nan = SAMPLE.to_vec();
        with_nan.push(f64::NAN);
        let a = estimate_density(&SAMPLE, 50, BandwidthRule::Scott).unwrap();
        let b = estimate_density(&with_nan, 50, BandwidthRule::Scott).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn constant_input_is_insufficient() {
        let err = estimate_density(&[5.0, 5.0, 5.0], 200, BandwidthRule::Scott).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn single_or_empty_input_is_insufficient() {
        assert!(estimate_density(&[1.0], 200, BandwidthRule::Scott).is_err());
        assert!(estimate_density::<f64>(&[], 200, BandwidthRule::Scott).is_err());
    }

    #[test]
    fn evaluation_is_bit_reproducible() {
        let a = estimate_density(&SAMPLE, 200, BandwidthRule::Scott).unwrap();
        let b = estimate_density(&SAMPLE, 200, BandwidthRule::Scott).unwrap();
        assert!(
            a.values
                .iter()
                .zip(&b.values)
                .all(|(x, y)| x.to_bits() == y.to_bits())
        );
    }
}
