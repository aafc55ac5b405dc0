//! Raw response tables, one sheet per tier.
//!
//! Sheets use a split layout of column names, an optional index and data rows:
//!
//! ```json
//! { "columns": ["ID", "Q1"], "index": [0, 1], "data": [["r1", "4 - Agree"], ["r2", null]] }
//! ```

use std::{borrow::Cow, collections::BTreeMap};

use serde::{Deserialize, Serialize};

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, Group, Stage},
    schema::Tier,
};

/// One raw cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl CellValue {
    /// Textual representation used by the parsers, `None` for null cells.
    #[must_use]
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "True" } else { "False" })),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Text(s) => Some(Cow::Borrowed(s)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// A single tier's sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<CellValue>>,
    pub data: Vec<Vec<CellValue>>,
}

/// Respondent identifier, used to join scores across agents and tiers.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct RespondentId(pub String);

static EMPTY_CELL: CellValue = CellValue::Null;

impl Sheet {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Cell at `row` and `column`. Cells beyond a short row read as
    /// [`CellValue::Null`].
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.data
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// The index, when it has exactly one entry per row.
    #[must_use]
    pub fn row_index(&self) -> Option<&[CellValue]> {
        self.index
            .as_deref()
            .filter(|index| index.len() == self.data.len())
    }

    /// Layout problems of this sheet: rows whose length differs from the
    /// column count and an index whose length differs from the row count.
    ///
    /// None of them stop an analysis. Absent cells read as empty, extra cells
    /// are ignored and a mismatched index is replaced by row positions.
    #[must_use]
    pub fn layout_diagnostics(&self, tier: Tier) -> Vec<Diagnostic> {
        let expected = self.columns.len();
        let mut diagnostics = self
            .data
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells.len() != expected)
            .map(|(row, cells)| {
                Diagnostic::new(
                    Stage::Input,
                    Group::tier(tier),
                    DiagnosticKind::RaggedRow {
                        row,
                        expected,
                        found: cells.len(),
                    },
                )
            })
            .collect::<Vec<_>>();
        if let Some(index) = &self.index
            && index.len() != self.data.len()
        {
            diagnostics.push(Diagnostic::new(
                Stage::Input,
                Group::tier(tier),
                DiagnosticKind::IndexLength {
                    expected: self.data.len(),
                    found: index.len(),
                },
            ));
        }
        diagnostics
    }

    /// Respondent identifier of every row.
    ///
    /// Taken from `id_column` when given, else from the sheet index (if its
    /// length matches the rows), else the 0-based row position. Empty
    /// identifier cells fall back to the row position.
    #[must_use]
    pub fn respondent_ids(&self, id_column: Option<usize>) -> Vec<RespondentId> {
        (0..self.row_count())
            .map(|row| {
                let cell = match (id_column, self.row_index()) {
                    (Some(column), _) => Some(self.cell(row, column)),
                    (None, Some(index)) => Some(&index[row]),
                    (None, None) => None,
                };
                let text = cell
                    .and_then(CellValue::text)
                    .map(|t| t.trim().to_owned())
                    .filter(|t| !t.is_empty());
                RespondentId(text.unwrap_or_else(|| row.to_string()))
            })
            .collect()
    }
}

/// All response sheets, keyed by tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseSet {
    pub sheets: BTreeMap<Tier, Sheet>,
}

impl ResponseSet {
    #[must_use]
    pub fn sheet(&self, tier: Tier) -> Option<&Sheet> {
        self.sheets.get(&tier)
    }

    /// Layout diagnostics of every sheet, in tier order.
    #[must_use]
    pub fn layout_diagnostics(&self) -> Vec<Diagnostic> {
        self.sheets
            .iter()
            .flat_map(|(tier, sheet)| sheet.layout_diagnostics(*tier))
            .collect()
    }
}
