use num_traits::Float;
use serde::Serialize;

use crate::{AnalysisError, Result, helper::linspace};

/// Equal width histogram normalised to a probability density
///
/// Heights are `count / (n * width)`, so the bars integrate to one and can be
/// overlaid with a [`DensityCurve`](crate::DensityCurve).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram<T> {
    /// Bin edges, one more than the number of bins
    pub edges: Vec<T>,
    /// Raw count per bin
    pub counts: Vec<usize>,
    /// Density height per bin
    pub densities: Vec<T>,
}

impl<T: Float> Histogram<T> {
    /// Bins the finite entries of `values`
    ///
    /// Bins cover `[min, max]`; every bin is half open except the last, which
    /// also holds `max`. When all values are equal the range is widened to
    /// `[v - 0.5, v + 0.5]` so the bars keep a usable width.
    ///
    /// # Arguments
    ///
    /// * `values` - The sample
    /// * `bins` - Number of bins
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - `InsufficientData` when there is no finite value or `bins` is zero
    pub fn from_values(values: &[T], bins: usize) -> Result<Self> {
        let finite: Vec<T> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Err(AnalysisError::insufficient(
                "histogram",
                1,
                finite.len(),
                "values",
            ));
        }

        let (mut lo, mut hi) = finite
            .iter()
            .fold((T::infinity(), T::neg_infinity()), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo == hi {
            let half = T::from(0.5).unwrap_or_else(T::one);
            lo = lo - half;
            hi = hi + half;
        }

        let edges = linspace(lo, hi, bins + 1);
        let width = (hi - lo) / T::from(bins).unwrap_or_else(T::one);

        let mut counts = vec![0usize; bins];
        for &v in &finite {
            let offset = ((v - lo) / width).floor().to_usize().unwrap_or(0);
            counts[offset.min(bins - 1)] += 1;
        }

        let norm = T::from(finite.len()).unwrap_or_else(T::one) * width;
        let densities = counts
            .iter()
            .map(|&c| T::from(c).unwrap_or_else(T::zero) / norm)
            .collect();

        Ok(Self {
            edges,
            counts,
            densities,
        })
    }

    /// Number of bins
    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Width shared by every bin
    pub fn bin_width(&self) -> T {
        match (self.edges.first(), self.edges.last()) {
            (Some(&lo), Some(&hi)) if self.bins() > 0 => {
                (hi - lo) / T::from(self.bins()).unwrap_or_else(T::one)
            }
            _ => T::zero(),
        }
    }
}
