//! Item-level scoring: sheets to parsed, reverse-coded item matrices.

use std::collections::HashSet;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, Group, Stage},
    resolution::ResolutionReport,
    response::score_cell,
    schema::{Agent, SchemaConfig, Tier},
    table::{RespondentId, ResponseSet},
};

/// Parsed items of one (tier, criterion, agent) triple.
///
/// Rows are respondents in sheet order, columns are the configured items that
/// were found in the sheet. Values are already reverse-coded.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemMatrix {
    pub tier: Tier,
    pub criterion: String,
    pub agent: Agent,
    pub items: Vec<String>,
    pub respondents: Vec<RespondentId>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl ItemMatrix {
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Rows without any missing item.
    #[must_use]
    pub fn complete_rows(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .filter_map(|row| row.iter().copied().collect::<Option<Vec<_>>>())
            .collect()
    }
}

/// Item matrices for every triple with at least one available column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSurvey {
    pub matrices: Vec<ItemMatrix>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses every resolved item column of every tier.
///
/// Triples configured with no items are skipped silently. Triples whose items
/// are all unavailable are skipped with a diagnostic. Tiers without a sheet are
/// skipped; the resolution report already covers them.
#[must_use]
pub fn parse_items(
    schema: &SchemaConfig,
    responses: &ResponseSet,
    resolution: &ResolutionReport,
) -> ParsedSurvey {
    let mut parsed = ParsedSurvey::default();

    for tier_schema in schema.tiers() {
        let tier = tier_schema.tier;
        let (Some(sheet), Some(tier_resolution)) = (responses.sheet(tier), resolution.tier(tier))
        else {
            continue;
        };

        let id_column = tier_resolution.id_column.as_ref().and_then(|c| c.index());
        let respondents = sheet.respondent_ids(id_column);
        let mut seen = HashSet::new();
        for respondent in &respondents {
            if !seen.insert(respondent) {
                parsed.diagnostics.push(Diagnostic::new(
                    Stage::Scoring,
                    Group::tier(tier),
                    DiagnosticKind::DuplicateRespondent {
                        respondent: respondent.clone(),
                    },
                ));
            }
        }

        for criterion in &tier_schema.criteria {
            for agent in Agent::ALL {
                if criterion.items(agent).items.is_empty() {
                    continue;
                }
                let columns = tier_resolution
                    .items_for(&criterion.name, agent)
                    .filter_map(|item| item.column.index().map(|index| (item, index)))
                    .collect::<Vec<_>>();
                if columns.is_empty() {
                    parsed.diagnostics.push(Diagnostic::new(
                        Stage::Scoring,
                        Group::triple(tier, &criterion.name, agent),
                        DiagnosticKind::NoAvailableItems,
                    ));
                    continue;
                }

                let rows = (0..sheet.row_count())
                    .map(|row| {
                        columns
                            .iter()
                            .map(|(item, index)| {
                                score_cell(sheet.cell(row, *index), tier_schema.scale, item.reverse)
                            })
                            .collect()
                    })
                    .collect();
                tracing::debug!(
                    %tier,
                    criterion = %criterion.name,
                    %agent,
                    items = columns.len(),
                    "parsed item matrix"
                );
                parsed.matrices.push(ItemMatrix {
                    tier,
                    criterion: criterion.name.clone(),
                    agent,
                    items: columns.iter().map(|(item, _)| item.item.clone()).collect(),
                    respondents: respondents.clone(),
                    rows,
                });
            }
        }
    }

    parsed
}
