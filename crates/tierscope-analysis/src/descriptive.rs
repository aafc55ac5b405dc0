//! Per-group summaries of composite scores.

use serde::Serialize;
use tierscope_stats::{
    descriptive::DescriptiveStats,
    interval::{ConfidenceInterval, t_interval},
};

use crate::{
    aggregate::ScoreTable,
    schema::{Agent, Tier},
};

/// Verbal band of a mean score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum Label {
    Low,
    Moderate,
    High,
}

impl Label {
    /// Low `[1, 2.5)`, Moderate `[2.5, 3.5)`, High `[3.5, 5]`; `None` outside `[1, 5]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tierscope_analysis::descriptive::Label;
    ///
    /// assert_eq!(Label::from_mean(2.49), Some(Label::Low));
    /// assert_eq!(Label::from_mean(2.5), Some(Label::Moderate));
    /// assert_eq!(Label::from_mean(5.0), Some(Label::High));
    /// assert_eq!(Label::from_mean(0.5), None);
    /// ```
    #[must_use]
    pub fn from_mean(mean: f64) -> Option<Self> {
        match mean {
            m if (1.0..2.5).contains(&m) => Some(Self::Low),
            m if (2.5..3.5).contains(&m) => Some(Self::Moderate),
            m if (3.5..=5.0).contains(&m) => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveRecord {
    pub agent: Agent,
    pub tier: Tier,
    pub criterion: String,
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    /// Sample standard deviation, `None` for a single score.
    pub sd: Option<f64>,
    pub iqr: f64,
    pub label: Option<Label>,
    /// Student-t interval of the mean, `None` for a single score.
    #[serde(skip)]
    pub ci: Option<ConfidenceInterval>,
}

/// Summaries of every (agent, tier, criterion) group with at least one score.
///
/// Records are ordered by agent, then tier and criterion in table order.
#[must_use]
pub fn describe(scores: &ScoreTable, confidence: f64) -> Vec<DescriptiveRecord> {
    let mut groups = scores.groups();
    groups.sort_by_key(|g| g.agent);

    groups
        .into_iter()
        .filter_map(|g| {
            let stats = DescriptiveStats::new(scores.values(g.tier, g.criterion, g.agent))?;
            let ci = stats
                .std_dev
                .and_then(|sd| t_interval(stats.mean, sd, stats.count, confidence));
            Some(DescriptiveRecord {
                agent: g.agent,
                tier: g.tier,
                criterion: g.criterion.to_owned(),
                n: stats.count,
                mean: stats.mean,
                median: stats.median,
                q1: stats.q1,
                q3: stats.q3,
                sd: stats.std_dev,
                iqr: stats.iqr(),
                label: Label::from_mean(stats.mean),
                ci,
            })
        })
        .collect()
}

/// Median and IQR of one cell of the performance matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatrixCell {
    pub median: f64,
    pub iqr: f64,
}

/// Criterion × (tier, agent) grid of medians and IQRs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMatrix {
    /// Column headers, tier-major.
    pub columns: Vec<(Tier, Agent)>,
    /// One row per criterion, one optional cell per column.
    pub rows: Vec<(String, Vec<Option<MatrixCell>>)>,
}

impl PerformanceMatrix {
    /// Pivots descriptive records. Rows are sorted by criterion name; columns
    /// cover every tier and agent that has at least one record.
    #[must_use]
    pub fn from_records(records: &[DescriptiveRecord]) -> Self {
        let columns = Tier::ALL
            .into_iter()
            .flat_map(|tier| Agent::ALL.map(|agent| (tier, agent)))
            .filter(|(tier, agent)| records.iter().any(|r| r.tier == *tier && r.agent == *agent))
            .collect::<Vec<_>>();

        let mut criteria = records.iter().map(|r| r.criterion.as_str()).collect::<Vec<_>>();
        criteria.sort_unstable();
        criteria.dedup();

        let rows = criteria
            .into_iter()
            .map(|criterion| {
                let cells = columns
                    .iter()
                    .map(|(tier, agent)| {
                        records
                            .iter()
                            .find(|r| r.tier == *tier && r.agent == *agent && r.criterion == criterion)
                            .map(|r| MatrixCell {
                                median: r.median,
                                iqr: r.iqr,
                            })
                    })
                    .collect();
                (criterion.to_owned(), cells)
            })
            .collect();

        Self { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate::CriterionScore, table::RespondentId};

    fn score(tier: Tier, criterion: &str, agent: Agent, id: &str, score: f64) -> CriterionScore {
        CriterionScore {
            respondent: RespondentId(id.into()),
            tier,
            criterion: criterion.into(),
            agent,
            score,
        }
    }

    #[test]
    fn test_label_boundaries() {
        assert_eq!(Label::from_mean(1.0), Some(Label::Low));
        assert_eq!(Label::from_mean(3.49), Some(Label::Moderate));
        assert_eq!(Label::from_mean(3.5), Some(Label::High));
        assert_eq!(Label::from_mean(5.01), None);
        assert_eq!(Label::from_mean(f64::NAN), None);
    }

    #[test]
    fn test_describe_group() {
        let table = ScoreTable::from_scores(vec![
            score(Tier::Strategic, "Fit", Agent::Ai, "a", 5.0),
            score(Tier::Strategic, "Fit", Agent::Ai, "b", 3.0),
            score(Tier::Strategic, "Fit", Agent::Ai, "c", 1.0),
        ]);
        let records = describe(&table, 0.95);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.n, 3);
        assert_eq!(r.mean, 3.0);
        assert_eq!(r.median, 3.0);
        assert_eq!(r.q1, 2.0);
        assert_eq!(r.q3, 4.0);
        assert_eq!(r.iqr, 2.0);
        assert_eq!(r.sd, Some(2.0));
        assert_eq!(r.label, Some(Label::Moderate));
        let ci = r.ci.unwrap();
        assert!((ci.upper - (3.0 + 4.302_652_729_911_275 * 2.0 / 3.0_f64.sqrt())).abs() < 1e-6);
    }

    #[test]
    fn test_single_score_has_no_spread() {
        let table =
            ScoreTable::from_scores(vec![score(Tier::Tactical, "Fit", Agent::Human, "a", 4.0)]);
        let r = &describe(&table, 0.95)[0];
        assert_eq!(r.sd, None);
        assert_eq!(r.ci, None);
        assert_eq!(r.iqr, 0.0);
        assert_eq!(r.label, Some(Label::High));
    }

    #[test]
    fn test_records_are_agent_major() {
        let table = ScoreTable::from_scores(vec![
            score(Tier::Strategic, "Fit", Agent::Human, "a", 2.0),
            score(Tier::Strategic, "Fit", Agent::Ai, "a", 4.0),
            score(Tier::Tactical, "Cost", Agent::Ai, "a", 1.0),
        ]);
        let order = describe(&table, 0.95)
            .iter()
            .map(|r| (r.agent, r.tier))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            [
                (Agent::Ai, Tier::Strategic),
                (Agent::Ai, Tier::Tactical),
                (Agent::Human, Tier::Strategic),
            ]
        );
    }

    #[test]
    fn test_performance_matrix() {
        let table = ScoreTable::from_scores(vec![
            score(Tier::Tactical, "Fit", Agent::Ai, "a", 2.0),
            score(Tier::Tactical, "Fit", Agent::Ai, "b", 4.0),
            score(Tier::Strategic, "Cost", Agent::Human, "a", 1.0),
        ]);
        let matrix = PerformanceMatrix::from_records(&describe(&table, 0.95));
        assert_eq!(
            matrix.columns,
            [(Tier::Strategic, Agent::Human), (Tier::Tactical, Agent::Ai)]
        );
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0].0, "Cost");
        assert_eq!(
            matrix.rows[0].1,
            [Some(MatrixCell { median: 1.0, iqr: 0.0 }), None]
        );
        assert_eq!(
            matrix.rows[1].1,
            [None, Some(MatrixCell { median: 3.0, iqr: 1.0 })]
        );
    }
}
