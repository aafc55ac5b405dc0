//! Family-wise error correction.

/// Single-step Bonferroni correction, `min(p * comparisons, 1)`.
///
/// # Examples
///
/// ```
/// use tierscope_stats::correction::bonferroni;
///
/// assert!((bonferroni(0.02, 3) - 0.06).abs() < 1e-12);
/// assert_eq!(bonferroni(0.5, 3), 1.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn bonferroni(p_value: f64, comparisons: usize) -> f64 {
    (p_value * comparisons as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_comparison_is_identity() {
        assert_eq!(bonferroni(0.031, 1), 0.031);
    }

    #[test]
    fn test_cap_at_one() {
        assert_eq!(bonferroni(0.34, 3), 1.0);
        assert_eq!(bonferroni(1.0, 3), 1.0);
    }
}
