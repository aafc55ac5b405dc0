//! Decision variance: relative MAD of an agent's scores within a tier.

use rand::Rng;
use serde::Serialize;
use tierscope_stats::{bootstrap::Bootstrap, dispersion::relative_mad};

use crate::{
    aggregate::ScoreTable,
    diagnostics::{Diagnostic, DiagnosticKind, Group, Stage},
    schema::{Agent, Tier},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionVarianceRecord {
    pub tier: Tier,
    pub agent: Agent,
    pub n: usize,
    /// `MAD / median`, `None` when the median is zero.
    pub dv: Option<f64>,
    pub ci_lower: Option<f64>,
    pub ci_upper: Option<f64>,
}

/// Decision variance per (tier, agent), pooling all criterion scores, with a
/// percentile bootstrap interval.
///
/// Groups are visited in tier then agent order, each drawing its chunk seeds
/// from `rng` in turn, so a seeded `rng` reproduces every interval exactly.
pub fn estimate<R>(
    scores: &ScoreTable,
    bootstrap: &Bootstrap,
    rng: &mut R,
) -> (Vec<DecisionVarianceRecord>, Vec<Diagnostic>)
where
    R: Rng + ?Sized,
{
    let mut records = vec![];
    let mut diagnostics = vec![];

    for tier in Tier::ALL {
        for agent in Agent::ALL {
            let values = scores.pooled_values(tier, agent);
            if values.is_empty() {
                continue;
            }
            let group = Group::tier(tier).with_agent(agent);

            let dv = relative_mad(&values);
            if dv.is_none() {
                diagnostics.push(Diagnostic::new(
                    Stage::DecisionVariance,
                    group.clone(),
                    DiagnosticKind::Undefined {
                        statistic: "decision variance",
                    },
                ));
            }
            let interval = bootstrap.percentile_interval(&values, relative_mad, rng);
            if interval.is_none() {
                diagnostics.push(Diagnostic::new(
                    Stage::DecisionVariance,
                    group,
                    DiagnosticKind::Undefined {
                        statistic: "bootstrap interval",
                    },
                ));
            }
            tracing::debug!(
                %tier,
                %agent,
                n = values.len(),
                defined = interval.map_or(0, |i| i.defined),
                "bootstrapped decision variance"
            );

            records.push(DecisionVarianceRecord {
                tier,
                agent,
                n: values.len(),
                dv,
                ci_lower: interval.map(|i| i.lower),
                ci_upper: interval.map(|i| i.upper),
            });
        }
    }

    (records, diagnostics)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{aggregate::CriterionScore, table::RespondentId};

    fn table(rows: &[(Tier, Agent, &str, f64)]) -> ScoreTable {
        ScoreTable::from_scores(
            rows.iter()
                .enumerate()
                .map(|(i, &(tier, agent, criterion, score))| CriterionScore {
                    respondent: RespondentId(i.to_string()),
                    tier,
                    criterion: criterion.into(),
                    agent,
                    score,
                })
                .collect(),
        )
    }

    #[test]
    fn test_constant_scores_have_zero_variance() {
        let scores = table(&[
            (Tier::Strategic, Agent::Ai, "Fit", 1.0),
            (Tier::Strategic, Agent::Ai, "Fit", 1.0),
            (Tier::Strategic, Agent::Ai, "Cost", 1.0),
            (Tier::Strategic, Agent::Ai, "Cost", 1.0),
        ]);
        let mut rng = Pcg32::seed_from_u64(0);
        let (records, diagnostics) = estimate(&scores, &Bootstrap::new(200), &mut rng);
        assert!(diagnostics.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].n, 4);
        assert_eq!(records[0].dv, Some(0.0));
        assert_eq!(records[0].ci_lower, Some(0.0));
        assert_eq!(records[0].ci_upper, Some(0.0));
    }

    #[test]
    fn test_zero_median_is_undefined() {
        let scores = table(&[
            (Tier::Tactical, Agent::Human, "Fit", 0.0),
            (Tier::Tactical, Agent::Human, "Fit", 0.0),
        ]);
        let mut rng = Pcg32::seed_from_u64(0);
        let (records, diagnostics) = estimate(&scores, &Bootstrap::new(100), &mut rng);
        assert_eq!(records[0].dv, None);
        assert_eq!(records[0].ci_lower, None);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let scores = table(&[
            (Tier::Strategic, Agent::Ai, "Fit", 1.0),
            (Tier::Strategic, Agent::Ai, "Fit", 2.0),
            (Tier::Strategic, Agent::Ai, "Fit", 4.0),
            (Tier::Strategic, Agent::Ai, "Fit", 5.0),
            (Tier::Operational, Agent::Human, "Fit", 3.0),
            (Tier::Operational, Agent::Human, "Fit", 2.5),
            (Tier::Operational, Agent::Human, "Fit", 4.5),
        ]);
        let run = |workers| {
            let mut rng = Pcg32::seed_from_u64(2024);
            estimate(&scores, &Bootstrap::new(2500).with_workers(workers), &mut rng).0
        };
        let first = run(1);
        assert_eq!(first.len(), 2);
        assert_eq!(first, run(1));
        assert_eq!(first, run(4));
    }
}
