//! Average ranking with tie bookkeeping.
//!
//! Every rank-based test in this crate ranks its data the same way: values are
//! sorted, and each run of equal values shares the mean of the ranks it
//! occupies (1-based). The sizes of those runs feed the tie corrections.

/// Ranks assigned to a sample, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranks {
    /// Rank of each input value (1-based, ties averaged).
    pub ranks: Vec<f64>,
    /// Sizes of tied runs with more than one member.
    pub tie_sizes: Vec<usize>,
}

impl Ranks {
    /// Assigns average ranks to `values`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tierscope_stats::rank::Ranks;
    ///
    /// let ranks = Ranks::average(&[10.0, 20.0, 10.0, 30.0]);
    /// assert_eq!(ranks.ranks, vec![1.5, 3.0, 1.5, 4.0]);
    /// assert_eq!(ranks.tie_sizes, vec![2]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn average(values: &[f64]) -> Self {
        let mut order = (0..values.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

        let mut ranks = vec![0.0; values.len()];
        let mut tie_sizes = Vec::new();

        let mut start = 0;
        while start < order.len() {
            let mut end = start + 1;
            while end < order.len() && values[order[end]] == values[order[start]] {
                end += 1;
            }
            // positions start..end hold ranks start+1 ..= end
            let shared = (start + 1 + end) as f64 / 2.0;
            for &idx in &order[start..end] {
                ranks[idx] = shared;
            }
            if end - start > 1 {
                tie_sizes.push(end - start);
            }
            start = end;
        }

        Self { ranks, tie_sizes }
    }

    /// Sum of `t^3 - t` over the tied runs.
    #[must_use]
    pub fn tie_term(&self) -> f64 {
        tie_term(&self.tie_sizes)
    }
}

/// Sum of `t^3 - t` over tie run sizes.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn tie_term(tie_sizes: &[usize]) -> f64 {
    tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ties() {
        let ranks = Ranks::average(&[3.0, 1.0, 2.0]);
        assert_eq!(ranks.ranks, vec![3.0, 1.0, 2.0]);
        assert!(ranks.tie_sizes.is_empty());
        assert_eq!(ranks.tie_term(), 0.0);
    }

    #[test]
    fn test_all_tied() {
        let ranks = Ranks::average(&[2.0, 2.0, 2.0]);
        assert_eq!(ranks.ranks, vec![2.0, 2.0, 2.0]);
        assert_eq!(ranks.tie_sizes, vec![3]);
        assert_eq!(ranks.tie_term(), 24.0);
    }

    #[test]
    fn test_rank_sum_is_triangular() {
        let values = [4.0, 4.0, 1.0, 7.0, 1.0, 1.0, 9.0];
        let ranks = Ranks::average(&values);
        let total: f64 = ranks.ranks.iter().sum();
        assert_eq!(total, 28.0);
    }

    #[test]
    fn test_empty() {
        let ranks = Ranks::average(&[]);
        assert!(ranks.ranks.is_empty());
    }
}
