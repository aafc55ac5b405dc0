//! Internal consistency of each criterion's items.

use serde::Serialize;
use tierscope_stats::reliability::cronbach_alpha;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, Group, Stage},
    schema::{Agent, Tier},
    scoring::ItemMatrix,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReliabilityRecord {
    pub tier: Tier,
    pub criterion: String,
    pub agent: Agent,
    /// Cronbach's alpha, `None` when undefined.
    pub alpha: Option<f64>,
    pub items: usize,
    /// Respondents with every item present.
    pub complete_rows: usize,
}

/// Cronbach's alpha per item matrix, on complete rows of the reverse-coded
/// items.
///
/// Single-item criteria are reported with an undefined alpha and no
/// diagnostic. Multi-item criteria whose alpha is still undefined (fewer than
/// two complete rows or constant row sums) also carry a diagnostic.
#[must_use]
pub fn estimate(matrices: &[ItemMatrix]) -> (Vec<ReliabilityRecord>, Vec<Diagnostic>) {
    let mut records = vec![];
    let mut diagnostics = vec![];

    for matrix in matrices {
        let rows = matrix.complete_rows();
        let alpha = cronbach_alpha(&rows);
        if alpha.is_none() && matrix.item_count() > 1 {
            let group = Group::triple(matrix.tier, &matrix.criterion, matrix.agent);
            let kind = if rows.len() < 2 {
                DiagnosticKind::InsufficientData {
                    required: 2,
                    found: rows.len(),
                }
            } else {
                DiagnosticKind::Undefined {
                    statistic: "Cronbach's alpha",
                }
            };
            diagnostics.push(Diagnostic::new(Stage::Reliability, group, kind));
        }
        records.push(ReliabilityRecord {
            tier: matrix.tier,
            criterion: matrix.criterion.clone(),
            agent: matrix.agent,
            alpha,
            items: matrix.item_count(),
            complete_rows: rows.len(),
        });
    }

    (records, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RespondentId;

    fn matrix(rows: Vec<Vec<Option<f64>>>) -> ItemMatrix {
        let items = rows.first().map_or(0, Vec::len);
        ItemMatrix {
            tier: Tier::Operational,
            criterion: "Fit".into(),
            agent: Agent::Ai,
            items: (0..items).map(|i| format!("q{i}")).collect(),
            respondents: (0..rows.len()).map(|i| RespondentId(i.to_string())).collect(),
            rows,
        }
    }

    #[test]
    fn test_perfectly_correlated_items() {
        let (records, diagnostics) = estimate(&[matrix(vec![
            vec![Some(1.0), Some(1.0)],
            vec![Some(3.0), Some(3.0)],
            vec![Some(5.0), Some(5.0)],
            vec![Some(2.0), None],
        ])]);
        let record = &records[0];
        assert!((record.alpha.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(record.items, 2);
        assert_eq!(record.complete_rows, 3);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_single_item_is_undefined_without_diagnostic() {
        let (records, diagnostics) =
            estimate(&[matrix(vec![vec![Some(1.0)], vec![Some(4.0)]])]);
        assert_eq!(records[0].alpha, None);
        assert_eq!(records[0].items, 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_too_few_complete_rows() {
        let (records, diagnostics) = estimate(&[matrix(vec![
            vec![Some(1.0), Some(2.0)],
            vec![None, Some(2.0)],
        ])]);
        assert_eq!(records[0].alpha, None);
        assert_eq!(
            diagnostics[0].kind,
            DiagnosticKind::InsufficientData {
                required: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_constant_row_sums() {
        let (records, diagnostics) = estimate(&[matrix(vec![
            vec![Some(3.0), Some(3.0)],
            vec![Some(3.0), Some(3.0)],
        ])]);
        assert_eq!(records[0].alpha, None);
        assert!(matches!(diagnostics[0].kind, DiagnosticKind::Undefined { .. }));
    }
}
