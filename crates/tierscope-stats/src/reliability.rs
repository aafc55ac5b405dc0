//! Internal-consistency reliability.

use crate::descriptive::sample_variance;

/// Cronbach's alpha for a respondents × items matrix of complete rows.
///
/// `alpha = k / (k - 1) * (1 - Σ var(item) / var(row sum))` with sample
/// variances. Every row must have the same number of items.
///
/// Returns `None` when the coefficient is undefined: fewer than two items,
/// fewer than two rows, or zero variance of the row sums. Negative values and
/// values above one are returned as computed.
///
/// # Examples
///
/// ```
/// use tierscope_stats::reliability::cronbach_alpha;
///
/// let rows = [[1.0, 1.0], [2.0, 2.0], [4.0, 4.0]];
/// let alpha = cronbach_alpha(&rows).unwrap();
/// assert!((alpha - 1.0).abs() < 1e-12);
///
/// assert_eq!(cronbach_alpha(&[[1.0], [2.0]]), None);
/// ```
///
/// # Panics
///
/// Panics if the rows differ in length.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn cronbach_alpha<R>(rows: &[R]) -> Option<f64>
where
    R: AsRef<[f64]>,
{
    let k = rows.first()?.as_ref().len();
    assert!(
        rows.iter().all(|row| row.as_ref().len() == k),
        "all rows must have the same number of items"
    );
    if k < 2 || rows.len() < 2 {
        return None;
    }

    let item_variance_sum = (0..k)
        .map(|item| {
            let column = rows.iter().map(|row| row.as_ref()[item]).collect::<Vec<_>>();
            sample_variance(&column)
        })
        .sum::<Option<f64>>()?;

    let row_sums = rows
        .iter()
        .map(|row| row.as_ref().iter().sum::<f64>())
        .collect::<Vec<_>>();
    let total_variance = sample_variance(&row_sums)?;
    if total_variance == 0.0 {
        return None;
    }

    let k = k as f64;
    Some(k / (k - 1.0) * (1.0 - item_variance_sum / total_variance))
}
