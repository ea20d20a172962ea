use num_traits::Float;

use crate::Kbn;

/// Central moments of a batch of values
///
/// Computed in two passes: the mean first, then the second, third and fourth
/// central moments about it. Both passes use Kahan-Babuska-Neumaier summation,
/// which keeps large, tightly clustered inputs (sunspot counts near a
/// common level, years near 1900) from losing precision.
///
/// Non-finite inputs are skipped, so the moments always describe the same
/// null filtered projection the quantile helpers sort.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments<T> {
    /// Number of finite values
    count: usize,
    /// Delta Degrees of Freedom
    ddof: bool,
    /// Arithmetic mean
    mean: T,
    /// Second central moment
    m2: T,
    /// Third central moment
    m3: T,
    /// Fourth central moment
    m4: T,
}

impl<T: Float + Default> Moments<T> {
    /// Computes the moments of `values`
    ///
    /// # Arguments
    ///
    /// * `values` - The values, non-finite entries are ignored
    ///
    /// # Returns
    ///
    /// * `Option<Self>` - `None` if there is no finite value
    pub fn from_slice(values: &[T]) -> Option<Self> {
        let mut sum = Kbn::<T>::default();
        let mut count = 0usize;
        for &v in values.iter().filter(|v| v.is_finite()) {
            sum += v;
            count += 1;
        }
        if count == 0 {
            return None;
        }

        let n = T::from(count)?;
        let mean = sum.total() / n;

        let mut s2 = Kbn::<T>::default();
        let mut s3 = Kbn::<T>::default();
        let mut s4 = Kbn::<T>::default();
        for &v in values.iter().filter(|v| v.is_finite()) {
            let d = v - mean;
            let d2 = d * d;
            s2 += d2;
            s3 += d2 * d;
            s4 += d2 * d2;
        }

        Some(Self {
            count,
            ddof: false,
            mean,
            m2: s2.total() / n,
            m3: s3.total() / n,
            m4: s4.total() / n,
        })
    }

    /// Returns the Delta Degrees of Freedom
    #[inline]
    pub const fn ddof(&self) -> bool {
        self.ddof
    }

    /// Sets the Delta Degrees of Freedom
    ///
    /// With `ddof` the variance uses the `n - 1` denominator and skewness and
    /// kurtosis apply the usual sample bias corrections.
    ///
    /// # Returns
    ///
    /// * `Self` - The moments with the flag applied
    #[inline]
    pub const fn with_ddof(mut self, ddof: bool) -> Self {
        self.ddof = ddof;
        self
    }

    /// Number of finite values the moments were computed from
    #[inline]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean
    #[inline]
    pub const fn mean(&self) -> T {
        self.mean
    }

    /// Variance, NaN when `ddof` is set and there is a single value
    pub fn variance(&self) -> T {
        let Some(n) = T::from(self.count) else {
            return T::nan();
        };
        let denom = if self.ddof { n - T::one() } else { n };
        if denom > T::zero() {
            self.m2 * n / denom
        } else {
            T::nan()
        }
    }

    /// Standard deviation, NaN whenever the variance is
    pub fn stddev(&self) -> T {
        self.variance().sqrt()
    }

    /// Returns true when the spread is indistinguishable from zero
    ///
    /// Equal inputs such as `[0.1, 0.1, 0.1]` can leave a second moment of a
    /// few ulps after rounding; it is compared against the resolution of the
    /// mean rather than against exact zero.
    pub fn is_degenerate(&self) -> bool {
        let resolution = T::from(1e-15).unwrap_or_else(T::epsilon) * self.mean;
        self.m2 <= resolution * resolution
    }

    /// Skewness, NaN for zero variance
    ///
    /// Without `ddof` this is the biased estimator `g1 = m3 / m2^1.5`; with it the
    /// adjusted Fisher-Pearson coefficient `G1 = g1 * sqrt(n (n - 1)) / (n - 2)`,
    /// which is NaN for fewer than three values.
    pub fn skew(&self) -> T {
        if self.is_degenerate() {
            return T::nan();
        }
        let g1 = self.m3 / (self.m2 * self.m2.sqrt());
        if !self.ddof {
            return g1;
        }
        match (T::from(self.count), T::from(2.0)) {
            (Some(n), Some(_2)) if n > _2 => g1 * (n * (n - T::one())).sqrt() / (n - _2),
            _ => T::nan(),
        }
    }

    /// Excess kurtosis (a normal distribution scores 0), NaN for zero variance
    ///
    /// Without `ddof` this is `g2 = m4 / m2^2 - 3`; with it the sample estimator
    /// `G2`, which is NaN for fewer than four values.
    pub fn kurt(&self) -> T {
        if self.is_degenerate() {
            return T::nan();
        }
        let (Some(n), Some(_1), Some(_2), Some(_3), Some(_6)) = (
            T::from(self.count),
            T::from(1.0),
            T::from(2.0),
            T::from(3.0),
            T::from(6.0),
        ) else {
            return T::nan();
        };
        let g2 = self.m4 / (self.m2 * self.m2) - _3;
        if !self.ddof {
            return g2;
        }
        if n <= _3 {
            return T::nan();
        }
        ((n + _1) * g2 + _6) * (n - _1) / ((n - _2) * (n - _3))
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn mean_and_variance_work() {
        let m = Moments::from_slice(&[25.4, 26.2, 26.0]).unwrap();
        assert_eq!(m.count(), 3);
        assert_approx_eq!(m.mean(), 25.8667, 0.0001);
        assert_approx_eq!(m.variance(), 0.1156, 0.0001);
        assert_approx_eq!(m.with_ddof(true).variance(), 0.1733, 0.0001);
        assert_approx_eq!(m.with_ddof(true).stddev(), 0.4163, 0.0001);
    }

    #[test]
    fn skew_works() {
        let m = Moments::from_slice(&[25.4, 26.2, 26.0, 26.1]).unwrap();
        assert_approx_eq!(m.skew(), -0.9794, 0.0001);
        assert_approx_eq!(m.with_ddof(true).skew(), -1.6964, 0.0001);
    }

    #[test]
    fn kurt_works() {
        let m = Moments::from_slice(&[25.4, 26.2, 26.0, 26.1]).unwrap();
        assert_approx_eq!(m.kurt(), -0.7981, 0.0001);
        assert_approx_eq!(m.with_ddof(true).kurt(), 3.0144, 0.0001);
    }

    #[test]
    fn large_offsets_keep_precision() {
        let m = Moments::from_slice(&[1_000_000.1, 1_000_000.2, 1_000_000.3]).unwrap();
        assert_approx_eq!(m.mean(), 1_000_000.2, 0.0001);
        assert_approx_eq!(m.with_ddof(true).variance(), 0.01, 0.0001);
    }

    #[test]
    fn zero_variance_gives_nan_shape() {
        let m = Moments::from_slice(&[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(m.variance(), 0.0);
        assert!(m.skew().is_nan());
        assert!(m.kurt().is_nan());
        assert!(m.is_degenerate());

        let m = Moments::from_slice(&[0.1, 0.1, 0.1]).unwrap();
        assert!(m.skew().is_nan());
        assert!(m.kurt().is_nan());
    }

    #[test]
    fn single_value_sample_variance_is_nan() {
        let m = Moments::from_slice(&[3.0]).unwrap().with_ddof(true);
        assert!(m.variance().is_nan());
        assert!(m.stddev().is_nan());
    }

    #[test]
    fn non_finite_values_are_skipped() {
        let m = Moments::from_slice(&[1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(m.count(), 2);
        assert_eq!(m.mean(), 2.0);
        assert!(Moments::<f64>::from_slice(&[f64::NAN]).is_none());
        assert!(Moments::<f64>::from_slice(&[]).is_none());
    }
}
