//! Rank-based omnibus tests for three or more groups.
//!
//! - [`friedman`]: repeated measures, where row `i` of every group belongs to
//!   the same block (respondent). Effect size is Kendall's W.
//! - [`kruskal_wallis`]: independent groups of any size. Effect size is the
//!   rank epsilon-squared `(H - k + 1) / (N - k)`.
//!
//! Both statistics are tie-corrected and referred to a chi-squared
//! distribution with `k - 1` degrees of freedom.

use crate::{TestError, distribution::chi_squared_sf, rank::Ranks};

/// Result of an omnibus rank test.
#[derive(Debug, Clone, PartialEq)]
pub struct OmnibusTest {
    /// Tie-corrected chi-squared statistic (Friedman's Q or Kruskal–Wallis H).
    pub statistic: f64,
    /// Degrees of freedom, `k - 1`.
    pub df: usize,
    /// Upper-tail chi-squared p-value.
    pub p_value: f64,
    /// Number of groups compared.
    pub groups: usize,
    /// Blocks for Friedman, total observations for Kruskal–Wallis.
    pub n: usize,
    /// Kendall's W for Friedman, epsilon-squared for Kruskal–Wallis.
    pub effect_size: Option<f64>,
}

/// Friedman test over `k >= 3` equally long groups.
///
/// # Examples
///
/// ```
/// use tierscope_stats::omnibus::friedman;
///
/// let a = [1.0, 1.0, 1.0, 1.0];
/// let b = [2.0, 2.0, 2.0, 2.0];
/// let c = [3.0, 3.0, 3.0, 3.0];
/// let test = friedman(&[&a, &b, &c]).unwrap();
///
/// assert!((test.statistic - 8.0).abs() < 1e-12);
/// assert!((test.effect_size.unwrap() - 1.0).abs() < 1e-12);
/// ```
///
/// # Errors
///
/// - [`TestError::TooFewGroups`] for fewer than three groups
/// - [`TestError::LengthMismatch`] if the groups differ in length
/// - [`TestError::InsufficientData`] for fewer than two blocks
/// - [`TestError::AllTied`] if every block is entirely tied
#[expect(clippy::cast_precision_loss)]
pub fn friedman(groups: &[&[f64]]) -> Result<OmnibusTest, TestError> {
    let k = groups.len();
    if k < 3 {
        return Err(TestError::TooFewGroups);
    }
    let n = groups[0].len();
    if groups.iter().any(|g| g.len() != n) {
        return Err(TestError::LengthMismatch);
    }
    if n < 2 {
        return Err(TestError::InsufficientData);
    }

    let mut rank_sums = vec![0.0; k];
    let mut tie_total = 0.0;
    for block in 0..n {
        let row = groups.iter().map(|g| g[block]).collect::<Vec<_>>();
        let ranks = Ranks::average(&row);
        for (sum, rank) in rank_sums.iter_mut().zip(&ranks.ranks) {
            *sum += rank;
        }
        tie_total += ranks.tie_term();
    }

    let kf = k as f64;
    let nf = n as f64;
    let correction = 1.0 - tie_total / (kf * (kf * kf - 1.0) * nf);
    if correction <= 0.0 {
        return Err(TestError::AllTied);
    }

    let ssbn = rank_sums.iter().map(|r| r * r).sum::<f64>();
    let statistic =
        (12.0 / (kf * nf * (kf + 1.0)) * ssbn - 3.0 * nf * (kf + 1.0)) / correction;
    let df = k - 1;
    let p_value = chi_squared_sf(statistic, df as f64).ok_or(TestError::TooFewGroups)?;
    let effect_size = Some(statistic / (nf * (kf - 1.0)));

    Ok(OmnibusTest {
        statistic,
        df,
        p_value,
        groups: k,
        n,
        effect_size,
    })
}

/// Kruskal–Wallis H test over `k >= 2` independent groups.
///
/// The effect size is undefined when the total sample size does not exceed
/// the number of groups.
///
/// # Examples
///
/// ```
/// use tierscope_stats::omnibus::kruskal_wallis;
///
/// let test = kruskal_wallis(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]]).unwrap();
/// assert!((test.statistic - 7.2).abs() < 1e-9);
/// assert_eq!(test.n, 9);
/// ```
///
/// # Errors
///
/// - [`TestError::TooFewGroups`] for fewer than two groups
/// - [`TestError::InsufficientData`] if any group is empty
/// - [`TestError::AllTied`] if every observation is tied
#[expect(clippy::cast_precision_loss)]
pub fn kruskal_wallis(groups: &[&[f64]]) -> Result<OmnibusTest, TestError> {
    let k = groups.len();
    if k < 2 {
        return Err(TestError::TooFewGroups);
    }
    if groups.iter().any(|g| g.is_empty()) {
        return Err(TestError::InsufficientData);
    }

    let pooled = groups.iter().flat_map(|g| g.iter().copied()).collect::<Vec<_>>();
    let total = pooled.len();
    let ranks = Ranks::average(&pooled);

    let nf = total as f64;
    let correction = 1.0 - ranks.tie_term() / (nf * nf * nf - nf);
    if correction <= 0.0 {
        return Err(TestError::AllTied);
    }

    let mut offset = 0;
    let mut weighted = 0.0;
    for group in groups {
        let sum = ranks.ranks[offset..offset + group.len()].iter().sum::<f64>();
        weighted += sum * sum / group.len() as f64;
        offset += group.len();
    }
    let statistic = (12.0 / (nf * (nf + 1.0)) * weighted - 3.0 * (nf + 1.0)) / correction;

    let kf = k as f64;
    let df = k - 1;
    let p_value = chi_squared_sf(statistic, df as f64).ok_or(TestError::TooFewGroups)?;
    let effect_size = (total > k).then(|| (statistic - kf + 1.0) / (nf - kf));

    Ok(OmnibusTest {
        statistic,
        df,
        p_value,
        groups: k,
        n: total,
        effect_size,
    })
}
