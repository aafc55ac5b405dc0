//! Confidence intervals for a mean.

use crate::distribution::students_t_quantile;

/// A two-sided confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

/// Student-t interval `mean ± t((1 + level) / 2, n - 1) * sd / sqrt(n)`.
///
/// Returns `None` for `n <= 1` or a non-finite standard deviation.
///
/// # Examples
///
/// ```
/// use tierscope_stats::interval::t_interval;
///
/// let ci = t_interval(3.0, 2.0, 3, 0.95).unwrap();
/// // t(0.975, 2) = 4.3027
/// assert!((ci.lower - (3.0 - 4.302_652_729_911_275 * 2.0 / 3.0_f64.sqrt())).abs() < 1e-6);
///
/// assert!(t_interval(3.0, 0.0, 1, 0.95).is_none());
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn t_interval(mean: f64, std_dev: f64, n: usize, level: f64) -> Option<ConfidenceInterval> {
    if n <= 1 || !std_dev.is_finite() {
        return None;
    }
    let quantile = students_t_quantile(f64::midpoint(1.0, level), (n - 1) as f64)?;
    let margin = quantile * std_dev / (n as f64).sqrt();
    Some(ConfidenceInterval {
        lower: mean - margin,
        upper: mean + margin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_spread_collapses() {
        let ci = t_interval(4.0, 0.0, 10, 0.95).unwrap();
        assert_eq!(ci.lower, 4.0);
        assert_eq!(ci.upper, 4.0);
    }

    #[test]
    fn test_symmetric() {
        let ci = t_interval(2.5, 1.2, 25, 0.95).unwrap();
        assert!((2.5 - ci.lower - (ci.upper - 2.5)).abs() < 1e-12);
        // t(0.975, 24) = 2.0639
        assert!((ci.upper - 2.5 - 2.063_898_561_628_021 * 1.2 / 5.0).abs() < 1e-6);
    }
}
