//! Wilcoxon signed-rank test for paired samples.
//!
//! Zero differences are discarded before ranking (Wilcoxon's original
//! treatment). The reported statistic is `T = min(W+, W-)` and the test is
//! two-sided.
//!
//! # P-value
//!
//! - **Exact**: when at most [`EXACT_LIMIT`] non-zero differences remain and
//!   their absolute values contain no ties, the null distribution of `W+` is
//!   enumerated directly.
//! - **Normal approximation**: otherwise, `z = (T - n(n+1)/4) / se` with the
//!   tie-corrected variance `n(n+1)(2n+1)/24 - Σ(t³ - t)/48`, no continuity
//!   correction.
//!
//! # Examples
//!
//! ```
//! use tierscope_stats::signed_rank::wilcoxon_signed_rank;
//!
//! let before = [5.0, 4.0, 5.0, 3.0, 4.0];
//! let after = [4.0, 2.0, 2.0, -1.0, -1.0];
//! let test = wilcoxon_signed_rank(&before, &after).unwrap();
//!
//! assert_eq!(test.statistic, 0.0);
//! assert!((test.p_value - 0.0625).abs() < 1e-12);
//! ```

use crate::{TestError, distribution::normal_two_sided, rank::Ranks};

/// Largest number of non-zero differences for which the exact null
/// distribution is used.
pub const EXACT_LIMIT: usize = 50;

/// How a p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PValueMethod {
    /// Enumerated null distribution.
    Exact,
    /// Large-sample normal approximation.
    Normal,
}

/// Result of a Wilcoxon signed-rank test.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRankTest {
    /// `min(W+, W-)`.
    pub statistic: f64,
    /// Sum of ranks of positive differences.
    pub w_plus: f64,
    /// Sum of ranks of negative differences.
    pub w_minus: f64,
    /// Number of pairs entering the test.
    pub n_pairs: usize,
    /// Number of pairs with a non-zero difference.
    pub n_nonzero: usize,
    /// Standardized statistic, only for the normal approximation.
    pub z: Option<f64>,
    /// Two-sided p-value.
    pub p_value: f64,
    /// How `p_value` was computed.
    pub method: PValueMethod,
}

/// Runs a two-sided Wilcoxon signed-rank test on `x[i] - y[i]`.
///
/// # Errors
///
/// - [`TestError::LengthMismatch`] if the samples differ in length
/// - [`TestError::InsufficientData`] if the samples are empty
/// - [`TestError::AllTied`] if every difference is zero
pub fn wilcoxon_signed_rank(x: &[f64], y: &[f64]) -> Result<SignedRankTest, TestError> {
    if x.len() != y.len() {
        return Err(TestError::LengthMismatch);
    }
    if x.is_empty() {
        return Err(TestError::InsufficientData);
    }

    let differences = x
        .iter()
        .zip(y)
        .map(|(a, b)| a - b)
        .filter(|d| *d != 0.0)
        .collect::<Vec<_>>();
    if differences.is_empty() {
        return Err(TestError::AllTied);
    }

    let magnitudes = differences.iter().map(|d| d.abs()).collect::<Vec<_>>();
    let ranks = Ranks::average(&magnitudes);

    let mut w_plus = 0.0;
    let mut w_minus = 0.0;
    for (d, r) in differences.iter().zip(&ranks.ranks) {
        if *d > 0.0 {
            w_plus += r;
        } else {
            w_minus += r;
        }
    }
    let statistic = f64::min(w_plus, w_minus);
    let n = differences.len();

    let (z, p_value, method) = if n <= EXACT_LIMIT && ranks.tie_sizes.is_empty() {
        (None, exact_p_value(n, statistic), PValueMethod::Exact)
    } else {
        let z = normal_z(n, statistic, ranks.tie_term());
        (Some(z), normal_two_sided(z), PValueMethod::Normal)
    };

    Ok(SignedRankTest {
        statistic,
        w_plus,
        w_minus,
        n_pairs: x.len(),
        n_nonzero: n,
        z,
        p_value,
        method,
    })
}

#[expect(clippy::cast_precision_loss)]
fn normal_z(n: usize, statistic: f64, tie_term: f64) -> f64 {
    let n = n as f64;
    let mean = n * (n + 1.0) / 4.0;
    let variance = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_term / 48.0;
    (statistic - mean) / variance.sqrt()
}

/// Two-sided exact p-value `min(1, 2 * P(W <= t))` for `n` untied ranks.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn exact_p_value(n: usize, statistic: f64) -> f64 {
    let max_sum = n * (n + 1) / 2;
    // counts[s] = number of subsets of {1..=n} whose sum is s
    let mut counts = vec![0.0_f64; max_sum + 1];
    counts[0] = 1.0;
    for k in 1..=n {
        for s in (k..=max_sum).rev() {
            counts[s] += counts[s - k];
        }
    }

    let total = 2.0_f64.powi(n as i32);
    let t = (statistic.round() as usize).min(max_sum);
    let lower_tail = counts[..=t].iter().sum::<f64>() / total;
    (2.0 * lower_tail).min(1.0)
}
