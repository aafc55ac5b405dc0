//! Structured, non-fatal findings collected while analysing.
//!
//! Every skipped group and every coverage gap is reported as a
//! [`Diagnostic`] carrying the stage, the group identity and the reason.
//! Rendering is left to the caller.

use std::fmt;

use serde::Serialize;

use crate::{
    schema::{Agent, Tier},
    table::RespondentId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    #[display("input")]
    Input,
    #[display("resolution")]
    Resolution,
    #[display("scoring")]
    Scoring,
    #[display("reliability")]
    Reliability,
    #[display("paired")]
    Paired,
    #[display("cross-tier")]
    CrossTier,
    #[display("post-hoc")]
    Posthoc,
    #[display("decision-variance")]
    DecisionVariance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    #[display("info")]
    Info,
    #[display("warning")]
    Warning,
}

/// Identity of the group a diagnostic refers to. Absent parts are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Group {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<Agent>,
}

impl Group {
    #[must_use]
    pub fn tier(tier: Tier) -> Self {
        Self {
            tier: Some(tier),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn triple(tier: Tier, criterion: &str, agent: Agent) -> Self {
        Self {
            tier: Some(tier),
            criterion: Some(criterion.to_owned()),
            agent: Some(agent),
        }
    }

    #[must_use]
    pub fn with_criterion(self, criterion: &str) -> Self {
        Self {
            criterion: Some(criterion.to_owned()),
            ..self
        }
    }

    #[must_use]
    pub fn with_agent(self, agent: Agent) -> Self {
        Self {
            agent: Some(agent),
            ..self
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            self.tier.map(|t| t.to_string()),
            self.criterion.clone(),
            self.agent.map(|a| a.to_string()),
        ];
        let parts = parts.into_iter().flatten().collect::<Vec<_>>();
        if parts.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&parts.join(" / "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DiagnosticKind {
    #[display("row {row} has {found} cells, expected {expected}; absent cells are read as empty")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("index has {found} entries for {expected} rows, using row positions as respondent ids")]
    IndexLength { expected: usize, found: usize },
    #[display("no response sheet")]
    MissingSheet,
    #[display("column '{column}' not found")]
    UnresolvedColumn { column: String },
    #[display("column '{column}' matches {} columns after normalisation", candidates.len())]
    AmbiguousColumn {
        column: String,
        candidates: Vec<String>,
    },
    #[display("column '{column}' matched '{actual}' after normalisation")]
    NormalizedColumn { column: String, actual: String },
    #[display("respondent id column '{column}' not found, using row positions")]
    UnresolvedIdColumn { column: String },
    #[display("respondent '{respondent}' appears more than once, joins use the first row")]
    DuplicateRespondent { respondent: RespondentId },
    #[display("none of the configured items are available")]
    NoAvailableItems,
    #[display("need at least {required} observations, found {found}")]
    InsufficientData { required: usize, found: usize },
    #[display("no scores for tier {tier}")]
    MissingTier { tier: Tier },
    #[display("no respondents with both AI and Human scores")]
    EmptyJoin,
    #[display("all observations are tied, test undefined")]
    AllTied,
    #[display("{statistic} is undefined")]
    Undefined { statistic: &'static str },
}

impl DiagnosticKind {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::RaggedRow { .. }
            | Self::IndexLength { .. }
            | Self::MissingSheet
            | Self::UnresolvedColumn { .. }
            | Self::AmbiguousColumn { .. }
            | Self::UnresolvedIdColumn { .. }
            | Self::DuplicateRespondent { .. }
            | Self::NoAvailableItems => Severity::Warning,
            Self::NormalizedColumn { .. }
            | Self::InsufficientData { .. }
            | Self::MissingTier { .. }
            | Self::EmptyJoin
            | Self::AllTied
            | Self::Undefined { .. } => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display)]
#[display("[{stage}] {group}: {kind}")]
pub struct Diagnostic {
    pub stage: Stage,
    pub group: Group,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    #[must_use]
    pub fn new(stage: Stage, group: Group, kind: DiagnosticKind) -> Self {
        Self { stage, group, kind }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(
            Stage::CrossTier,
            Group::default().with_criterion("Trust").with_agent(Agent::Ai),
            DiagnosticKind::InsufficientData {
                required: 2,
                found: 1,
            },
        );
        assert_eq!(
            diagnostic.to_string(),
            "[cross-tier] Trust / AI: need at least 2 observations, found 1"
        );
        assert_eq!(diagnostic.severity(), Severity::Info);

        let missing = Diagnostic::new(
            Stage::Resolution,
            Group::tier(Tier::Operational),
            DiagnosticKind::MissingSheet,
        );
        assert_eq!(missing.to_string(), "[resolution] Operational: no response sheet");
        assert_eq!(missing.severity(), Severity::Warning);

        let ragged = Diagnostic::new(
            Stage::Input,
            Group::tier(Tier::Tactical),
            DiagnosticKind::RaggedRow {
                row: 2,
                expected: 3,
                found: 1,
            },
        );
        assert_eq!(
            ragged.to_string(),
            "[input] Tactical: row 2 has 1 cells, expected 3; absent cells are read as empty"
        );
        assert_eq!(ragged.severity(), Severity::Warning);
    }

    #[test]
    fn test_serialize_flattens_kind() {
        let diagnostic = Diagnostic::new(
            Stage::Scoring,
            Group::triple(Tier::Strategic, "Cost", Agent::Human),
            DiagnosticKind::NoAvailableItems,
        );
        let value = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "stage": "scoring",
                "group": {"tier": "Strategic", "criterion": "Cost", "agent": "Human"},
                "kind": "no-available-items",
            })
        );
    }
}
