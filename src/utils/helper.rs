use core::cmp::Ordering;

use num_traits::Float;

/// Returns a sorted copy of the finite values of a slice
///
/// NaN and infinities are dropped, so the result can be indexed by the
/// quantile helpers without further checks.
///
/// # Arguments
///
/// * `values` - The values, in any order
///
/// # Returns
///
/// * `Vec<T>` - The finite values in ascending order
pub fn sorted_finite<T: Float>(values: &[T]) -> Vec<T> {
    let mut sorted: Vec<T> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Returns the median from a sorted slice
///
/// # Arguments
///
/// * `ss` - The sorted slice
///
/// # Returns
///
/// * `Option<T>` - The median, or `None` if the slice is empty
#[inline]
pub fn median_from_sorted_slice<T: Float>(ss: &[T]) -> Option<T> {
    quantile_from_sorted_slice(ss, 0.5)
}

/// Returns the quantile from a sorted slice
///
/// Linear interpolation between the closest ranks: the position of `q` is
/// `q * (n - 1)` and the value is interpolated between the two neighbouring
/// order statistics. Descriptive statistics, outlier fences and box plots all
/// go through this function so their quartiles always agree.
///
/// # Arguments
///
/// * `ss` - The sorted slice
/// * `q` - The quantile to calculate, in `[0, 1]`
///
/// # Returns
///
/// * `Option<T>` - The quantile, or `None` if the slice is empty or `q` is out of range
#[inline]
pub fn quantile_from_sorted_slice<T: Float>(ss: &[T], q: f64) -> Option<T> {
    if ss.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (ss.len() as f64 - 1.0);
    let lower_index = pos.floor() as usize;
    let upper_index = pos.ceil() as usize;

    if lower_index == upper_index {
        Some(ss[lower_index])
    } else {
        let lower_value = ss[lower_index];
        let upper_value = ss[upper_index];
        let weight = T::from(pos - lower_index as f64)?;

        Some(lower_value + weight * (upper_value - lower_value))
    }
}

/// Returns `num` evenly spaced points over `[start, stop]`, both ends included
///
/// # Arguments
///
/// * `start` - First point
/// * `stop` - Last point
/// * `num` - Number of points
///
/// # Returns
///
/// * `Vec<T>` - The points; empty for `num == 0`, `[start]` for `num == 1`
pub fn linspace<T: Float>(start: T, stop: T, num: usize) -> Vec<T> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let Some(div) = T::from(num - 1) else {
                return Vec::new();
            };
            let step = (stop - start) / div;
            (0..num)
                .map(|i| {
                    if i == num - 1 {
                        stop
                    } else {
                        T::from(i).map_or(start, |i| start + step * i)
                    }
                })
                .collect()
        }
    }
}

/// Returns the number of distinct finite values
pub fn distinct_count<T: Float>(values: &[T]) -> usize {
    let mut sorted = sorted_finite(values);
    sorted.dedup();
    sorted.len()
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn quantile_interpolates_linearly() {
        let ss = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert_eq!(quantile_from_sorted_slice(&ss, 0.25), Some(2.0));
        assert_eq!(quantile_from_sorted_slice(&ss, 0.5), Some(3.0));
        assert_eq!(quantile_from_sorted_slice(&ss, 0.75), Some(4.0));

        let ss = [10.0, 20.0, 30.0, 40.0];
        assert_approx_eq!(quantile_from_sorted_slice(&ss, 0.25).unwrap(), 17.5);
        assert_approx_eq!(quantile_from_sorted_slice(&ss, 0.75).unwrap(), 32.5);
    }

    #[test]
    fn quantile_of_single_value_is_that_value() {
        assert_eq!(quantile_from_sorted_slice(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile_from_sorted_slice(&[7.0], 0.75), Some(7.0));
    }

    #[test]
    fn quantile_rejects_empty_and_out_of_range() {
        assert_eq!(quantile_from_sorted_slice::<f64>(&[], 0.5), None);
        assert_eq!(quantile_from_sorted_slice(&[1.0, 2.0], 1.5), None);
        assert_eq!(quantile_from_sorted_slice(&[1.0, 2.0], -0.1), None);
    }

    #[test]
    fn median_works() {
        assert_eq!(median_from_sorted_slice(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median_from_sorted_slice(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn sorted_finite_drops_nan() {
        let sorted = sorted_finite(&[3.0, f64::NAN, 1.0, f64::INFINITY, 2.0]);
        assert_eq!(sorted, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn linspace_includes_both_ends() {
        let xs = linspace(0.0, 1.0, 5);
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75, 1.0]);

        let xs = linspace(3.0, 17.3, 200);
        assert_eq!(xs.len(), 200);
        assert_eq!(xs[0], 3.0);
        assert_eq!(xs[199], 17.3);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));

        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
    }

    #[test]
    fn distinct_count_ignores_repeats() {
        assert_eq!(distinct_count(&[5.0, 5.0, 5.0]), 1);
        assert_eq!(distinct_count(&[1.0, 2.0, 1.0, f64::NAN]), 2);
    }
}
