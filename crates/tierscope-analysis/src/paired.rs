//! AI versus Human comparison within each (tier, criterion).
//!
//! Scores are paired by respondent identifier (inner join), never by
//! position, and compared with the Wilcoxon signed-rank test.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tierscope_stats::signed_rank::{PValueMethod, wilcoxon_signed_rank};

use crate::{
    aggregate::ScoreTable,
    diagnostics::{Diagnostic, DiagnosticKind, Group, Stage},
    schema::{Agent, Tier},
    table::RespondentId,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedTestRecord {
    pub tier: Tier,
    pub criterion: String,
    /// Number of joined respondents.
    pub n: usize,
    /// `min(W+, W-)`, `None` when all differences are zero.
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    /// Rank-biserial style `|T| / (n(n+1)/2)`.
    pub effect_size: Option<f64>,
    #[serde(skip)]
    pub method: Option<PValueMethod>,
}

/// Respondent-aligned AI and Human scores of one (tier, criterion).
///
/// The first occurrence of a duplicated respondent is used.
#[must_use]
pub fn join_by_respondent(
    scores: &ScoreTable,
    tier: Tier,
    criterion: &str,
) -> (Vec<f64>, Vec<f64>) {
    let mut human = HashMap::<&RespondentId, f64>::new();
    for s in scores.group(tier, criterion, Agent::Human) {
        human.entry(&s.respondent).or_insert(s.score);
    }

    let mut seen = HashSet::new();
    scores
        .group(tier, criterion, Agent::Ai)
        .filter(|s| seen.insert(&s.respondent))
        .filter_map(|s| Some((s.score, *human.get(&s.respondent)?)))
        .unzip()
}

/// Runs the paired test for every (tier, criterion) with scores for both agents.
#[must_use]
pub fn compare_agents(scores: &ScoreTable) -> (Vec<PairedTestRecord>, Vec<Diagnostic>) {
    let mut records = vec![];
    let mut diagnostics = vec![];

    let mut pairs = Vec::<(Tier, &str)>::new();
    for g in scores.groups() {
        if !pairs.contains(&(g.tier, g.criterion)) {
            pairs.push((g.tier, g.criterion));
        }
    }

    for (tier, criterion) in pairs {
        let group = Group::tier(tier).with_criterion(criterion);
        let has_both = Agent::ALL
            .iter()
            .all(|agent| scores.group(tier, criterion, *agent).next().is_some());
        if !has_both {
            continue;
        }

        let (ai, human) = join_by_respondent(scores, tier, criterion);
        if ai.is_empty() {
            diagnostics.push(Diagnostic::new(Stage::Paired, group, DiagnosticKind::EmptyJoin));
            continue;
        }

        let n = ai.len();
        let record = match wilcoxon_signed_rank(&ai, &human) {
            Ok(test) => PairedTestRecord {
                tier,
                criterion: criterion.to_owned(),
                n,
                statistic: Some(test.statistic),
                p_value: Some(test.p_value),
                effect_size: Some(rank_biserial(test.statistic, n)),
                method: Some(test.method),
            },
            Err(error) => {
                let kind = if error.is_all_tied() {
                    DiagnosticKind::AllTied
                } else {
                    DiagnosticKind::Undefined {
                        statistic: "Wilcoxon signed-rank",
                    }
                };
                diagnostics.push(Diagnostic::new(Stage::Paired, group, kind));
                PairedTestRecord {
                    tier,
                    criterion: criterion.to_owned(),
                    n,
                    statistic: None,
                    p_value: None,
                    effect_size: None,
                    method: None,
                }
            }
        };
        records.push(record);
    }

    (records, diagnostics)
}

#[expect(clippy::cast_precision_loss)]
fn rank_biserial(statistic: f64, n: usize) -> f64 {
    let n = n as f64;
    statistic.abs() / (n * (n + 1.0) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CriterionScore;

    fn score(agent: Agent, id: &str, score: f64) -> CriterionScore {
        CriterionScore {
            respondent: RespondentId(id.into()),
            tier: Tier::Strategic,
            criterion: "Fit".into(),
            agent,
            score,
        }
    }

    #[test]
    fn test_join_is_by_respondent_not_position() {
        let table = ScoreTable::from_scores(vec![
            score(Agent::Ai, "a", 5.0),
            score(Agent::Ai, "b", 4.0),
            score(Agent::Ai, "c", 3.0),
            score(Agent::Human, "c", 1.0),
            score(Agent::Human, "a", 2.0),
            score(Agent::Human, "z", 9.0),
        ]);
        let (ai, human) = join_by_respondent(&table, Tier::Strategic, "Fit");
        assert_eq!(ai, [5.0, 3.0]);
        assert_eq!(human, [2.0, 1.0]);
    }

    #[test]
    fn test_paired_record() {
        let table = ScoreTable::from_scores(
            ["a", "b", "c", "d", "e"]
                .iter()
                .zip([1.0, 2.0, 3.0, 4.0, 5.0])
                .flat_map(|(id, d)| [score(Agent::Ai, id, 1.0 + d), score(Agent::Human, id, 1.0)])
                .collect(),
        );
        let (records, diagnostics) = compare_agents(&table);
        assert!(diagnostics.is_empty());
        let r = &records[0];
        assert_eq!(r.n, 5);
        assert_eq!(r.statistic, Some(0.0));
        assert!((r.p_value.unwrap() - 0.0625).abs() < 1e-12);
        assert_eq!(r.effect_size, Some(0.0));
        assert_eq!(r.method, Some(PValueMethod::Exact));
    }

    #[test]
    fn test_effect_size_uses_joined_size() {
        assert!((rank_biserial(5.0, 6) - 5.0 / 21.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_tied_is_explicit() {
        let table = ScoreTable::from_scores(vec![
            score(Agent::Ai, "a", 3.0),
            score(Agent::Human, "a", 3.0),
        ]);
        let (records, diagnostics) = compare_agents(&table);
        assert_eq!(records[0].n, 1);
        assert_eq!(records[0].statistic, None);
        assert_eq!(records[0].p_value, None);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::AllTied);
    }

    #[test]
    fn test_empty_join_and_single_agent() {
        let table = ScoreTable::from_scores(vec![
            score(Agent::Ai, "a", 3.0),
            score(Agent::Human, "b", 3.0),
        ]);
        let (records, diagnostics) = compare_agents(&table);
        assert!(records.is_empty());
        assert_eq!(diagnostics[0].kind, DiagnosticKind::EmptyJoin);

        let only_ai = ScoreTable::from_scores(vec![score(Agent::Ai, "a", 3.0)]);
        let (records, diagnostics) = compare_agents(&only_ai);
        assert!(records.is_empty());
        assert!(diagnostics.is_empty());
    }
}
