//! Mann–Whitney U (Wilcoxon rank-sum) test for two independent samples.
//!
//! The reported statistic is `U` of the first sample,
//! `U1 = R1 - n1(n1 + 1)/2`. The test is two-sided.
//!
//! # P-value
//!
//! - **Exact**: both samples have at most [`EXACT_LIMIT`] observations and the
//!   pooled data contain no ties.
//! - **Normal approximation**: otherwise, using `U = max(U1, U2)`,
//!   a continuity correction of 0.5, and the tie-corrected standard deviation
//!   `sqrt(n1 n2 / 12 * ((n + 1) - Σ(t³ - t) / (n(n - 1))))`.
//!
//! When every pooled observation is tied the standard deviation vanishes and
//! the p-value is undefined; the statistic is still reported.
//!
//! # Examples
//!
//! ```
//! use tierscope_stats::rank_sum::mann_whitney_u;
//!
//! let test = mann_whitney_u(&[1.0, 2.0], &[3.0, 4.0]).unwrap();
//! assert_eq!(test.statistic, 0.0);
//! assert!((test.p_value.unwrap() - 1.0 / 3.0).abs() < 1e-12);
//! ```

use crate::{TestError, distribution::normal_sf, rank::Ranks, signed_rank::PValueMethod};

/// Largest per-sample size for which the exact null distribution is used.
pub const EXACT_LIMIT: usize = 8;

/// Result of a Mann–Whitney U test.
#[derive(Debug, Clone, PartialEq)]
pub struct RankSumTest {
    /// `U` statistic of the first sample.
    pub statistic: f64,
    /// `U` statistic of the second sample, `n1 * n2 - statistic`.
    pub statistic_other: f64,
    /// Size of the first sample.
    pub n1: usize,
    /// Size of the second sample.
    pub n2: usize,
    /// Two-sided p-value, `None` when all observations are tied.
    pub p_value: Option<f64>,
    /// How `p_value` was computed.
    pub method: PValueMethod,
}

/// Runs a two-sided Mann–Whitney U test.
///
/// # Errors
///
/// Returns [`TestError::InsufficientData`] if either sample is empty.
#[expect(clippy::cast_precision_loss)]
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<RankSumTest, TestError> {
    if x.is_empty() || y.is_empty() {
        return Err(TestError::InsufficientData);
    }

    let n1 = x.len();
    let n2 = y.len();
    let pooled = x.iter().chain(y).copied().collect::<Vec<_>>();
    let ranks = Ranks::average(&pooled);

    let r1 = ranks.ranks[..n1].iter().sum::<f64>();
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;

    let (p_value, method) = if n1 <= EXACT_LIMIT && n2 <= EXACT_LIMIT && ranks.tie_sizes.is_empty()
    {
        (Some(exact_p_value(n1, n2, u1.max(u2))), PValueMethod::Exact)
    } else {
        (
            normal_p_value(n1, n2, u1.max(u2), ranks.tie_term()),
            PValueMethod::Normal,
        )
    };

    Ok(RankSumTest {
        statistic: u1,
        statistic_other: u2,
        n1,
        n2,
        p_value,
        method,
    })
}

#[expect(clippy::cast_precision_loss)]
fn normal_p_value(n1: usize, n2: usize, u_max: f64, tie_term: f64) -> Option<f64> {
    let n1 = n1 as f64;
    let n2 = n2 as f64;
    let n = n1 + n2;
    let mean = n1 * n2 / 2.0;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if variance.is_nan() || variance <= 0.0 {
        return None;
    }
    let z = (u_max - mean - 0.5) / variance.sqrt();
    Some((2.0 * normal_sf(z)).clamp(0.0, 1.0))
}

/// Two-sided exact p-value `min(1, 2 * P(U >= u_max))`.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn exact_p_value(n1: usize, n2: usize, u_max: f64) -> f64 {
    let counts = exact_distribution(n1, n2);
    let total = counts.iter().sum::<f64>();
    let u = (u_max.round() as usize).min(counts.len() - 1);
    let upper_tail = counts[u..].iter().sum::<f64>() / total;
    (2.0 * upper_tail).min(1.0)
}

/// Frequencies of each `U` value over all orderings of `n1` and `n2` untied
/// observations.
///
/// Built from `f(m, n, u) = f(m - 1, n, u - n) + f(m, n - 1, u)`: the largest
/// observation either belongs to the first sample (beating all `n` of the
/// second) or to the second.
fn exact_distribution(n1: usize, n2: usize) -> Vec<f64> {
    // table[m][n] holds the distribution for sample sizes (m, n)
    let mut table = vec![vec![Vec::<f64>::new(); n2 + 1]; n1 + 1];
    for m in 0..=n1 {
        for n in 0..=n2 {
            let mut dist = vec![0.0; m * n + 1];
            if m == 0 || n == 0 {
                dist[0] = 1.0;
            } else {
                for (u, count) in table[m - 1][n].iter().enumerate() {
                    dist[u + n] += count;
                }
                for (u, count) in table[m][n - 1].iter().enumerate() {
                    dist[u] += count;
                }
            }
            table[m][n] = dist;
        }
    }
    std::mem::take(&mut table[n1][n2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample() {
        assert_eq!(
            mann_whitney_u(&[], &[1.0]),
            Err(TestError::InsufficientData)
        );
    }

    #[test]
    fn test_exact_distribution_counts_orderings() {
        // C(5, 2) = 10 orderings
        let dist = exact_distribution(2, 3);
        assert_eq!(dist, vec![1.0, 1.0, 2.0, 2.0, 2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_statistics_are_complementary() {
        let test = mann_whitney_u(&[1.0, 5.0, 7.0], &[2.0, 3.0, 4.0, 6.0]).unwrap();
        assert_eq!(test.statistic + test.statistic_other, 12.0);
        assert_eq!(test.statistic, 7.0);
        assert_eq!(test.method, PValueMethod::Exact);
    }

    #[test]
    fn test_identical_samples_have_unit_p_value() {
        let test = mann_whitney_u(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(test.method, PValueMethod::Normal);
        assert_eq!(test.statistic, 4.5);
        assert_eq!(test.p_value, Some(1.0));
    }

    #[test]
    fn test_all_tied_has_undefined_p_value() {
        let test = mann_whitney_u(&[3.0, 3.0], &[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(test.statistic, 3.0);
        assert_eq!(test.p_value, None);
    }

    #[test]
    fn test_normal_approximation_with_ties() {
        let x = [1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 5.0, 5.0];
        let y = [3.0, 4.0, 4.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0];
        let test = mann_whitney_u(&x, &y).unwrap();
        assert_eq!(test.method, PValueMethod::Normal);
        assert_eq!(test.statistic, 18.5);
        assert!((test.p_value.unwrap() - 0.013_196).abs() < 1e-5);
    }
}
