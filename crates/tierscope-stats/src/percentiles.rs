//! Linear-interpolation percentiles and the median.

/// Computes a single percentile value from sorted data.
///
/// For a dataset with n values, the k-th percentile sits at fractional
/// position `h = (n - 1) * k / 100`; the result interpolates linearly between
/// the order statistics at `floor(h)` and `ceil(h)`.
///
/// Returns `f64::NAN` if the input is empty. Percentiles outside `0..=100` are
/// clamped.
///
/// # Examples
///
/// ```
/// use tierscope_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
///
/// assert_eq!(compute_percentile(&values, 50.0), 3.0);
/// assert_eq!(compute_percentile(&values, 25.0), 2.0);
/// assert_eq!(compute_percentile(&values, 12.5), 1.5);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    let Some(&first) = sorted_values.first() else {
        return f64::NAN;
    };
    if sorted_values.len() == 1 {
        return first;
    }

    let fraction = percentile.clamp(0.0, 100.0) / 100.0;
    let position = (sorted_values.len() - 1) as f64 * fraction;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    let lo = sorted_values[lower];
    let hi = sorted_values[upper];
    lo + (hi - lo) * weight
}

/// Median of sorted data, `None` for an empty slice.
#[must_use]
pub fn median_sorted(sorted_values: &[f64]) -> Option<f64> {
    if sorted_values.is_empty() {
        None
    } else {
        Some(compute_percentile(sorted_values, 50.0))
    }
}

/// Median of unsorted data, `None` for an empty slice.
///
/// ```
/// use tierscope_stats::percentiles::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0, 10.0]), Some(2.5));
/// assert_eq!(median(&[]), None);
/// ```
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    median_sorted(&sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_nan() {
        assert!(compute_percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_single_value() {
        assert_eq!(compute_percentile(&[4.0], 2.5), 4.0);
        assert_eq!(compute_percentile(&[4.0], 97.5), 4.0);
    }

    #[test]
    fn test_quartiles_interpolate() {
        let values = [1.0, 3.0, 5.0];
        assert_eq!(compute_percentile(&values, 25.0), 2.0);
        assert_eq!(compute_percentile(&values, 75.0), 4.0);
    }

    #[test]
    fn test_extremes() {
        let values = [1.0, 2.0, 9.0];
        assert_eq!(compute_percentile(&values, 0.0), 1.0);
        assert_eq!(compute_percentile(&values, 100.0), 9.0);
        assert_eq!(compute_percentile(&values, 150.0), 9.0);
    }

    #[test]
    fn test_bootstrap_tails() {
        let values = (1..=101).map(f64::from).collect::<Vec<_>>();
        assert!((compute_percentile(&values, 2.5) - 3.5).abs() < 1e-12);
        assert!((compute_percentile(&values, 97.5) - 98.5).abs() < 1e-12);
    }
}
