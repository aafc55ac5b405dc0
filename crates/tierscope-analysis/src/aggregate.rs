//! Composite criterion scores.

use serde::Serialize;

use crate::{
    schema::{Agent, Tier},
    scoring::ItemMatrix,
    table::RespondentId,
};

/// Composite score of one respondent for one (tier, criterion, agent).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionScore {
    pub respondent: RespondentId,
    pub tier: Tier,
    pub criterion: String,
    pub agent: Agent,
    pub score: f64,
}

/// Mean of the available values, `None` if all are missing.
///
/// # Examples
///
/// ```
/// use tierscope_analysis::aggregate::skip_missing_mean;
///
/// assert_eq!(skip_missing_mean(&[Some(4.0), None, Some(2.0)]), Some(3.0));
/// assert_eq!(skip_missing_mean(&[None, None]), None);
/// ```
#[must_use]
pub fn skip_missing_mean(values: &[Option<f64>]) -> Option<f64> {
    let present = values.iter().flatten().copied().collect::<Vec<_>>();
    tierscope_stats::descriptive::mean(&present)
}

/// Long-format table of composite scores.
///
/// Scores are kept in the order they were aggregated: tier, criterion and
/// agent as in the schema, respondents in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoreTable {
    scores: Vec<CriterionScore>,
}

/// Identity of a score group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupKey<'a> {
    pub tier: Tier,
    pub criterion: &'a str,
    pub agent: Agent,
}

impl ScoreTable {
    /// Skip-missing mean of every respondent's items.
    ///
    /// Respondents with no available item produce no score.
    #[must_use]
    pub fn aggregate(matrices: &[ItemMatrix]) -> Self {
        let scores = matrices
            .iter()
            .flat_map(|matrix| {
                matrix
                    .respondents
                    .iter()
                    .zip(&matrix.rows)
                    .filter_map(|(respondent, row)| {
                        Some(CriterionScore {
                            respondent: respondent.clone(),
                            tier: matrix.tier,
                            criterion: matrix.criterion.clone(),
                            agent: matrix.agent,
                            score: skip_missing_mean(row)?,
                        })
                    })
            })
            .collect();
        Self { scores }
    }

    #[must_use]
    pub fn from_scores(scores: Vec<CriterionScore>) -> Self {
        Self { scores }
    }

    #[must_use]
    pub fn scores(&self) -> &[CriterionScore] {
        &self.scores
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn group<'a>(
        &'a self,
        tier: Tier,
        criterion: &'a str,
        agent: Agent,
    ) -> impl Iterator<Item = &'a CriterionScore> + 'a {
        self.scores
            .iter()
            .filter(move |s| s.tier == tier && s.agent == agent && s.criterion == criterion)
    }

    #[must_use]
    pub fn values(&self, tier: Tier, criterion: &str, agent: Agent) -> Vec<f64> {
        self.group(tier, criterion, agent).map(|s| s.score).collect()
    }

    /// All scores of one agent in one tier, pooled over criteria.
    #[must_use]
    pub fn pooled_values(&self, tier: Tier, agent: Agent) -> Vec<f64> {
        self.scores
            .iter()
            .filter(|s| s.tier == tier && s.agent == agent)
            .map(|s| s.score)
            .collect()
    }

    /// Distinct groups in order of first appearance.
    #[must_use]
    pub fn groups(&self) -> Vec<GroupKey<'_>> {
        let mut groups = Vec::<GroupKey>::new();
        for s in &self.scores {
            let key = GroupKey {
                tier: s.tier,
                criterion: &s.criterion,
                agent: s.agent,
            };
            if !groups.contains(&key) {
                groups.push(key);
            }
        }
        groups
    }

    /// Distinct criterion names in order of first appearance.
    #[must_use]
    pub fn criteria(&self) -> Vec<&str> {
        let mut criteria = Vec::<&str>::new();
        for s in &self.scores {
            if !criteria.contains(&s.criterion.as_str()) {
                criteria.push(&s.criterion);
            }
        }
        criteria
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(tier: Tier, agent: Agent, rows: Vec<Vec<Option<f64>>>) -> ItemMatrix {
        ItemMatrix {
            tier,
            criterion: "Fit".into(),
            agent,
            items: vec!["a".into(), "b".into(), "c".into()],
            respondents: (0..rows.len()).map(|i| RespondentId(i.to_string())).collect(),
            rows,
        }
    }

    #[test]
    fn test_skip_missing_mean_per_respondent() {
        let table = ScoreTable::aggregate(&[matrix(
            Tier::Strategic,
            Agent::Ai,
            vec![
                vec![Some(4.0), None, Some(2.0)],
                vec![None, None, None],
                vec![Some(5.0), Some(5.0), Some(2.0)],
            ],
        )]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.values(Tier::Strategic, "Fit", Agent::Ai), [3.0, 4.0]);
        let ids = table
            .scores()
            .iter()
            .map(|s| s.respondent.0.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["0", "2"]);
    }

    #[test]
    fn test_groups_and_pooling() {
        let table = ScoreTable::aggregate(&[
            matrix(Tier::Strategic, Agent::Ai, vec![vec![Some(1.0)]]),
            matrix(Tier::Strategic, Agent::Human, vec![vec![Some(2.0)]]),
            matrix(Tier::Tactical, Agent::Ai, vec![vec![Some(3.0)], vec![Some(4.0)]]),
        ]);
        let groups = table
            .groups()
            .into_iter()
            .map(|g| (g.tier, g.agent))
            .collect::<Vec<_>>();
        assert_eq!(
            groups,
            [
                (Tier::Strategic, Agent::Ai),
                (Tier::Strategic, Agent::Human),
                (Tier::Tactical, Agent::Ai),
            ]
        );
        assert_eq!(table.criteria(), ["Fit"]);
        assert_eq!(table.pooled_values(Tier::Tactical, Agent::Ai), [3.0, 4.0]);
        assert!(table.pooled_values(Tier::Operational, Agent::Ai).is_empty());
    }
}
