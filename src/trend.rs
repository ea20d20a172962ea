use num_traits::Float;
use serde::Serialize;

use crate::{AnalysisError, Kbn, Result, Series};

/// Ordinary least squares line `value = slope * year + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine<T> {
    /// Change in value per year
    pub slope: T,
    /// Value at year zero
    pub intercept: T,
    /// Coefficient of determination over the fitted pairs
    pub r_squared: T,
    /// Number of pairs the line was fitted to
    pub count: usize,
}

impl<T: Float + Default> TrendLine<T> {
    /// Fits a line to `(x, y)` pairs
    ///
    /// Pairs with a non-finite coordinate are skipped. The fit is centred on
    /// the means before the cross products are accumulated, which keeps the
    /// normal equations well conditioned for calendar years.
    ///
    /// # Arguments
    ///
    /// * `pairs` - The `(x, y)` pairs
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - `InsufficientData` for fewer than two valid pairs or
    ///   when every `x` is identical
    ///
    /// # Examples
    ///
    /// ```
    /// # use sunspot_analysis::TrendLine;
    /// # use assert_approx_eq::assert_approx_eq;
    /// let pairs: Vec<(f64, f64)> = (1700..=1720).map(|y| (y as f64, 2.0 * y as f64 + 5.0)).collect();
    /// let line = TrendLine::fit(&pairs).unwrap();
    ///
    /// assert_approx_eq!(line.slope, 2.0, 1e-6);
    /// assert_approx_eq!(line.intercept, 5.0, 1e-6);
    /// assert_approx_eq!(line.predict(1800.0), 3605.0, 1e-6);
    /// ```
    pub fn fit(pairs: &[(T, T)]) -> Result<Self> {
        let valid: Vec<(T, T)> = pairs
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if valid.len() < 2 {
            return Err(AnalysisError::insufficient(
                "trend",
                2,
                valid.len(),
                "valid pairs",
            ));
        }

        let n = T::from(valid.len())
            .ok_or(AnalysisError::insufficient("trend", 2, 0, "valid pairs"))?;
        let mut sum_x = Kbn::<T>::default();
        let mut sum_y = Kbn::<T>::default();
        for &(x, y) in &valid {
            sum_x += x;
            sum_y += y;
        }
        let mean_x = sum_x.total() / n;
        let mean_y = sum_y.total() / n;

        let mut sxx = Kbn::<T>::default();
        let mut sxy = Kbn::<T>::default();
        let mut syy = Kbn::<T>::default();
        for &(x, y) in &valid {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        let (sxx, sxy, syy) = (sxx.total(), sxy.total(), syy.total());

        if sxx <= T::zero() {
            // every x identical: the slope is unidentified
            return Err(AnalysisError::insufficient(
                "trend",
                2,
                1,
                "distinct years",
            ));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let r_squared = if syy > T::zero() {
            sxy * sxy / (sxx * syy)
        } else {
            T::nan()
        };

        Ok(Self {
            slope,
            intercept,
            r_squared,
            count: valid.len(),
        })
    }

    /// Predicted value at `x`
    #[inline]
    pub fn predict(&self, x: T) -> T {
        self.slope * x + self.intercept
    }

    /// Predicted values at every point of `xs`
    pub fn predict_many(&self, xs: &[T]) -> Vec<T> {
        xs.iter().map(|&x| self.predict(x)).collect()
    }
}

impl TrendLine<f64> {
    /// Fits the trend of a series, skipping years with a missing value
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - `InsufficientData` for fewer than two non-null years
    pub fn from_series(series: &Series) -> Result<Self> {
        let pairs: Vec<(f64, f64)> = series
            .pairs()
            .filter_map(|(year, value)| value.map(|v| (f64::from(year), v)))
            .collect();
        let line = Self::fit(&pairs)?;
        tracing::debug!(
            slope = line.slope,
            intercept = line.intercept,
            pairs = line.count,
            "fitted trend line"
        );
        Ok(line)
    }

    /// Predicted values at the given years
    pub fn predict_years(&self, years: &[i32]) -> Vec<f64> {
        years.iter().map(|&y| self.predict(f64::from(y))).collect()
    }
}
