//! Omnibus comparison of one agent's criterion scores across the three tiers.
//!
//! One policy is applied to the whole report:
//!
//! - [`OmnibusPolicy::Friedman`] treats the tiers as repeated measures. The
//!   three vectors are aligned either by truncating to the shortest
//!   ([`Alignment::Truncate`]) or by keeping respondents present in every tier
//!   ([`Alignment::Respondent`]).
//! - [`OmnibusPolicy::KruskalWallis`] treats the tiers as independent groups
//!   and uses every score.

use std::collections::HashSet;

use serde::Serialize;
use tierscope_stats::omnibus::{OmnibusTest, friedman, kruskal_wallis};

use crate::{
    aggregate::ScoreTable,
    diagnostics::{Diagnostic, DiagnosticKind, Group, Stage},
    schema::{Agent, Tier},
    table::RespondentId,
};

/// Smallest tier vector accepted by the omnibus tests.
pub const MIN_GROUP_SIZE: usize = 2;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum OmnibusPolicy {
    #[default]
    #[display("Friedman")]
    Friedman,
    #[display("Kruskal-Wallis")]
    KruskalWallis,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    /// Positional truncation to the shortest tier vector.
    #[default]
    #[display("truncate")]
    Truncate,
    /// Respondents present in all three tiers, in first-tier order.
    #[display("respondent")]
    Respondent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OmnibusRecord {
    pub agent: Agent,
    pub criterion: String,
    pub test: OmnibusPolicy,
    pub groups: usize,
    /// Aligned length for Friedman, total scores for Kruskal–Wallis.
    pub n: usize,
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    /// Kendall's W for Friedman, epsilon-squared for Kruskal–Wallis.
    pub effect_size: Option<f64>,
}

fn tier_scores<'a>(
    scores: &'a ScoreTable,
    criterion: &'a str,
    agent: Agent,
) -> [Vec<(&'a RespondentId, f64)>; 3] {
    Tier::ALL.map(|tier| {
        scores
            .group(tier, criterion, agent)
            .map(|s| (&s.respondent, s.score))
            .collect()
    })
}

/// Aligns three tier vectors for a repeated-measures test.
#[must_use]
pub fn align(vectors: &[Vec<(&RespondentId, f64)>; 3], alignment: Alignment) -> [Vec<f64>; 3] {
    match alignment {
        Alignment::Truncate => {
            let len = vectors.iter().map(Vec::len).min().unwrap_or(0);
            vectors
                .each_ref()
                .map(|v| v[..len].iter().map(|(_, score)| *score).collect())
        }
        Alignment::Respondent => {
            let mut seen = HashSet::new();
            let common = vectors[0]
                .iter()
                .map(|(id, _)| *id)
                .filter(|id| seen.insert(*id))
                .filter(|id| {
                    vectors[1..]
                        .iter()
                        .all(|v| v.iter().any(|(other, _)| other == id))
                })
                .collect::<Vec<_>>();
            vectors.each_ref().map(|v| {
                common
                    .iter()
                    .filter_map(|id| v.iter().find(|(other, _)| other == id).map(|(_, s)| *s))
                    .collect()
            })
        }
    }
}

/// Runs the omnibus test for every (agent, criterion) with scores in all
/// three tiers.
#[must_use]
pub fn compare_tiers(
    scores: &ScoreTable,
    policy: OmnibusPolicy,
    alignment: Alignment,
) -> (Vec<OmnibusRecord>, Vec<Diagnostic>) {
    let mut records = vec![];
    let mut diagnostics = vec![];

    for agent in Agent::ALL {
        for criterion in scores.criteria() {
            let vectors = tier_scores(scores, criterion, agent);
            if vectors.iter().all(Vec::is_empty) {
                continue;
            }
            let group = Group::default().with_criterion(criterion).with_agent(agent);

            let missing = Tier::ALL
                .into_iter()
                .zip(&vectors)
                .find_map(|(tier, v)| v.is_empty().then_some(tier));
            if let Some(tier) = missing {
                diagnostics.push(Diagnostic::new(
                    Stage::CrossTier,
                    group,
                    DiagnosticKind::MissingTier { tier },
                ));
                continue;
            }

            let samples = match policy {
                OmnibusPolicy::Friedman => align(&vectors, alignment),
                OmnibusPolicy::KruskalWallis => vectors
                    .each_ref()
                    .map(|v| v.iter().map(|(_, score)| *score).collect()),
            };
            let shortest = samples.iter().map(Vec::len).min().unwrap_or(0);
            if shortest < MIN_GROUP_SIZE {
                diagnostics.push(Diagnostic::new(
                    Stage::CrossTier,
                    group,
                    DiagnosticKind::InsufficientData {
                        required: MIN_GROUP_SIZE,
                        found: shortest,
                    },
                ));
                continue;
            }

            let slices = samples.each_ref().map(Vec::as_slice);
            let result = match policy {
                OmnibusPolicy::Friedman => friedman(&slices),
                OmnibusPolicy::KruskalWallis => kruskal_wallis(&slices),
            };
            let n = match policy {
                OmnibusPolicy::Friedman => shortest,
                OmnibusPolicy::KruskalWallis => samples.iter().map(Vec::len).sum(),
            };
            let record = match result {
                Ok(OmnibusTest {
                    statistic,
                    p_value,
                    effect_size,
                    ..
                }) => OmnibusRecord {
                    agent,
                    criterion: criterion.to_owned(),
                    test: policy,
                    groups: Tier::ALL.len(),
                    n,
                    statistic: Some(statistic),
                    p_value: Some(p_value),
                    effect_size,
                },
                Err(error) => {
                    let kind = if error.is_all_tied() {
                        DiagnosticKind::AllTied
                    } else {
                        DiagnosticKind::Undefined {
                            statistic: "omnibus statistic",
                        }
                    };
                    diagnostics.push(Diagnostic::new(Stage::CrossTier, group, kind));
                    OmnibusRecord {
                        agent,
                        criterion: criterion.to_owned(),
                        test: policy,
                        groups: Tier::ALL.len(),
                        n,
                        statistic: None,
                        p_value: None,
                        effect_size: None,
                    }
                }
            };
            records.push(record);
        }
    }

    (records, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CriterionScore;

    fn table(rows: &[(Tier, Agent, &str, f64)]) -> ScoreTable {
        ScoreTable::from_scores(
            rows.iter()
                .map(|&(tier, agent, id, score)| CriterionScore {
                    respondent: RespondentId(id.into()),
                    tier,
                    criterion: "Fit".into(),
                    agent,
                    score,
                })
                .collect(),
        )
    }

    fn three_tiers(values: [&[f64]; 3]) -> ScoreTable {
        let mut rows = vec![];
        for (tier, values) in Tier::ALL.into_iter().zip(values) {
            for (i, v) in values.iter().enumerate() {
                rows.push((tier, Agent::Ai, ["a", "b", "c", "d", "e"][i], *v));
            }
        }
        table(&rows)
    }

    #[test]
    fn test_friedman_truncates_to_shortest() {
        let scores = three_tiers([
            &[1.0, 2.0, 1.5, 0.0, 9.0],
            &[2.0, 3.0, 2.5, 1.0],
            &[3.0, 4.0, 3.5, 2.0],
        ]);
        let (records, diagnostics) =
            compare_tiers(&scores, OmnibusPolicy::Friedman, Alignment::Truncate);
        assert!(diagnostics.is_empty());
        let r = &records[0];
        assert_eq!(r.n, 4);
        assert_eq!(r.groups, 3);
        assert!((r.statistic.unwrap() - 8.0).abs() < 1e-12);
        assert!((r.effect_size.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_respondent_alignment() {
        let scores = table(&[
            (Tier::Strategic, Agent::Ai, "a", 1.0),
            (Tier::Strategic, Agent::Ai, "b", 2.0),
            (Tier::Strategic, Agent::Ai, "c", 3.0),
            (Tier::Tactical, Agent::Ai, "c", 30.0),
            (Tier::Tactical, Agent::Ai, "a", 10.0),
            (Tier::Operational, Agent::Ai, "a", 100.0),
            (Tier::Operational, Agent::Ai, "c", 300.0),
            (Tier::Operational, Agent::Ai, "b", 200.0),
        ]);
        let vectors = tier_scores(&scores, "Fit", Agent::Ai);
        let [s, t, o] = align(&vectors, Alignment::Respondent);
        assert_eq!(s, [1.0, 3.0]);
        assert_eq!(t, [10.0, 30.0]);
        assert_eq!(o, [100.0, 300.0]);

        let [s, t, o] = align(&vectors, Alignment::Truncate);
        assert_eq!(s, [1.0, 2.0]);
        assert_eq!(t, [30.0, 10.0]);
        assert_eq!(o, [100.0, 300.0]);
    }

    #[test]
    fn test_kruskal_wallis_uses_all_scores() {
        let scores = three_tiers([&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]]);
        let (records, _) =
            compare_tiers(&scores, OmnibusPolicy::KruskalWallis, Alignment::Truncate);
        let r = &records[0];
        assert_eq!(r.test, OmnibusPolicy::KruskalWallis);
        assert_eq!(r.n, 9);
        assert!((r.statistic.unwrap() - 7.2).abs() < 1e-9);
    }

    #[test]
    fn test_missing_tier_and_small_groups_are_skipped() {
        let scores = three_tiers([&[1.0, 2.0], &[], &[1.0, 2.0]]);
        let (records, diagnostics) =
            compare_tiers(&scores, OmnibusPolicy::Friedman, Alignment::Truncate);
        assert!(records.is_empty());
        assert_eq!(
            diagnostics[0].kind,
            DiagnosticKind::MissingTier {
                tier: Tier::Tactical
            }
        );

        let scores = three_tiers([&[1.0, 2.0], &[3.0], &[1.0, 2.0]]);
        let (records, diagnostics) =
            compare_tiers(&scores, OmnibusPolicy::Friedman, Alignment::Truncate);
        assert!(records.is_empty());
        assert_eq!(
            diagnostics[0].kind,
            DiagnosticKind::InsufficientData {
                required: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_fully_tied_layout_is_undefined() {
        let scores = three_tiers([&[2.0, 4.0], &[2.0, 4.0], &[2.0, 4.0]]);
        let (records, diagnostics) =
            compare_tiers(&scores, OmnibusPolicy::Friedman, Alignment::Truncate);
        assert_eq!(records[0].statistic, None);
        assert_eq!(records[0].p_value, None);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::AllTied);
    }
}
