//! Pairwise tier comparisons with Bonferroni correction.

use serde::Serialize;
use tierscope_stats::{correction::bonferroni, rank_sum::mann_whitney_u};

use crate::{
    aggregate::ScoreTable,
    diagnostics::{Diagnostic, DiagnosticKind, Group, Stage},
    schema::{Agent, Tier},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosthocRecord {
    pub agent: Agent,
    pub criterion: String,
    pub first: Tier,
    pub second: Tier,
    /// Mann–Whitney `U` of the first tier.
    pub statistic: f64,
    pub p_uncorrected: Option<f64>,
    pub p_corrected: Option<f64>,
    /// Size of the comparison family.
    pub comparisons: usize,
}

impl PosthocRecord {
    /// `"Strategic vs Tactical"` style label.
    #[must_use]
    pub fn comparison(&self) -> String {
        format!("{} vs {}", self.first, self.second)
    }
}

/// Mann–Whitney tests for every tier pair of every (agent, criterion).
///
/// Every tier with at least one score belongs to the family, which needs at
/// least two tiers. One record is produced per pair, regardless of
/// significance, and each is corrected for the full family size.
#[must_use]
pub fn compare_pairs(scores: &ScoreTable) -> (Vec<PosthocRecord>, Vec<Diagnostic>) {
    let mut records = vec![];
    let mut diagnostics = vec![];

    for agent in Agent::ALL {
        for criterion in scores.criteria() {
            let samples = Tier::ALL.map(|tier| scores.values(tier, criterion, agent));
            if samples.iter().all(Vec::is_empty) {
                continue;
            }
            let group = Group::default().with_criterion(criterion).with_agent(agent);

            let present = Tier::ALL
                .into_iter()
                .zip(&samples)
                .filter(|(_, sample)| !sample.is_empty())
                .map(|(tier, sample)| (tier, sample.as_slice()))
                .collect::<Vec<_>>();
            if present.len() < 2 {
                diagnostics.push(Diagnostic::new(
                    Stage::Posthoc,
                    group,
                    DiagnosticKind::InsufficientData {
                        required: 2,
                        found: present.len(),
                    },
                ));
                continue;
            }

            let comparisons = present.len() * (present.len() - 1) / 2;
            for (i, &(first, x)) in present.iter().enumerate() {
                for &(second, y) in &present[i + 1..] {
                    let Ok(test) = mann_whitney_u(x, y) else {
                        continue;
                    };
                    if test.p_value.is_none() {
                        diagnostics.push(Diagnostic::new(
                            Stage::Posthoc,
                            group.clone(),
                            DiagnosticKind::AllTied,
                        ));
                    }
                    records.push(PosthocRecord {
                        agent,
                        criterion: criterion.to_owned(),
                        first,
                        second,
                        statistic: test.statistic,
                        p_uncorrected: test.p_value,
                        p_corrected: test.p_value.map(|p| bonferroni(p, comparisons)),
                        comparisons,
                    });
                }
            }
        }
    }

    (records, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate::CriterionScore, table::RespondentId};

    fn table(values: [&[f64]; 3]) -> ScoreTable {
        let mut scores = vec![];
        for (tier, values) in Tier::ALL.into_iter().zip(values) {
            for (i, score) in values.iter().enumerate() {
                scores.push(CriterionScore {
                    respondent: RespondentId(i.to_string()),
                    tier,
                    criterion: "Fit".into(),
                    agent: Agent::Human,
                    score: *score,
                });
            }
        }
        ScoreTable::from_scores(scores)
    }

    #[test]
    fn test_three_tiers_give_three_rows() {
        let scores = table([&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0, 7.0]]);
        let (records, diagnostics) = compare_pairs(&scores);
        assert!(diagnostics.is_empty());
        let labels = records.iter().map(PosthocRecord::comparison).collect::<Vec<_>>();
        assert_eq!(
            labels,
            [
                "Strategic vs Tactical",
                "Strategic vs Operational",
                "Tactical vs Operational"
            ]
        );
        assert!(records.iter().all(|r| r.comparisons == 3));

        let first = &records[0];
        assert_eq!(first.statistic, 0.0);
        let p = first.p_uncorrected.unwrap();
        assert!((p - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(first.p_corrected, Some(1.0));
    }

    #[test]
    fn test_two_tiers_form_a_family_of_one() {
        let scores = table([&[1.0, 2.0], &[], &[5.0, 6.0]]);
        let (records, _) = compare_pairs(&scores);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].comparisons, 1);
        assert_eq!(records[0].second, Tier::Operational);
        assert_eq!(records[0].p_corrected, records[0].p_uncorrected);
    }

    #[test]
    fn test_single_score_tier_stays_in_family() {
        let scores = table([
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &[5.5],
            &[6.0, 7.0, 8.0, 9.0, 10.0],
        ]);
        let (records, diagnostics) = compare_pairs(&scores);
        assert!(diagnostics.is_empty());
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.comparisons == 3));

        let outer = records
            .iter()
            .find(|r| r.first == Tier::Strategic && r.second == Tier::Operational)
            .unwrap();
        let p = outer.p_uncorrected.unwrap();
        assert!((p - 2.0 / 252.0).abs() < 1e-12);
        assert!((outer.p_corrected.unwrap() - 3.0 * p).abs() < 1e-12);
    }

    #[test]
    fn test_single_tier_is_skipped() {
        let scores = table([&[1.0, 2.0], &[], &[]]);
        let (records, diagnostics) = compare_pairs(&scores);
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
    fn test_tied_pair_reports_statistic_without_p_value() {
        let scores = table([&[3.0, 3.0], &[3.0, 3.0], &[]]);
        let (records, diagnostics) = compare_pairs(&scores);
        assert_eq!(records[0].statistic, 2.0);
        assert_eq!(records[0].p_uncorrected, None);
        assert_eq!(records[0].p_corrected, None);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::AllTied);
    }
}
