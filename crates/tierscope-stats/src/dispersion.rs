//! Robust dispersion measures.

use crate::percentiles::median;

/// Median absolute deviation, `median(|x - median(x)|)`.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn median_absolute_deviation(values: &[f64]) -> Option<f64> {
    let center = median(values)?;
    let deviations = values.iter().map(|v| (v - center).abs()).collect::<Vec<_>>();
    median(&deviations)
}

/// Relative median absolute deviation, `MAD / median`.
///
/// This is the "decision variance" of a set of scores. Returns `None` for an
/// empty slice or when the median is exactly zero.
///
/// # Examples
///
/// ```
/// use tierscope_stats::dispersion::relative_mad;
///
/// assert_eq!(relative_mad(&[1.0, 1.0, 1.0, 1.0]), Some(0.0));
/// assert_eq!(relative_mad(&[0.0, 0.0, 0.0]), None);
/// assert_eq!(relative_mad(&[1.0, 2.0, 4.0]), Some(0.5));
/// ```
#[must_use]
pub fn relative_mad(values: &[f64]) -> Option<f64> {
    let center = median(values)?;
    if center == 0.0 {
        return None;
    }
    let mad = median_absolute_deviation(values)?;
    Some(mad / center)
}
