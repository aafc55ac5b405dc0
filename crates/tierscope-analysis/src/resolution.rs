//! Batch resolution of configured item columns against sheet headers.
//!
//! Each configured name is matched exactly first, then by its normalised form
//! (trimmed, lower-cased, inner whitespace collapsed). Everything that cannot
//! be matched is reported together in one [`ResolutionReport`].

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, Group, Stage},
    schema::{Agent, SchemaConfig, Tier},
    table::{ResponseSet, Sheet},
};

/// Canonical form used for the fallback header match.
///
/// # Examples
///
/// ```
/// use tierscope_analysis::resolution::normalize_column_name;
///
/// assert_eq!(normalize_column_name("  How   Likely\tis it? "), "how likely is it?");
/// ```
#[must_use]
pub fn normalize_column_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Outcome of matching one configured column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "match", rename_all = "kebab-case")]
pub enum ColumnMatch {
    Exact { index: usize },
    Normalized { index: usize, actual: String },
    Ambiguous { candidates: Vec<String> },
    Missing,
}

impl ColumnMatch {
    /// Column index when the match is usable.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Exact { index } | Self::Normalized { index, .. } => Some(*index),
            Self::Ambiguous { .. } | Self::Missing => None,
        }
    }
}

#[derive(Debug)]
struct ColumnLookup<'a> {
    columns: &'a [String],
    exact: HashMap<&'a str, usize>,
    normalized: HashMap<String, Vec<usize>>,
}

impl<'a> ColumnLookup<'a> {
    fn new(columns: &'a [String]) -> Self {
        let mut exact = HashMap::new();
        let mut normalized = HashMap::<_, Vec<_>>::new();
        for (index, column) in columns.iter().enumerate() {
            exact.entry(column.as_str()).or_insert(index);
            normalized
                .entry(normalize_column_name(column))
                .or_default()
                .push(index);
        }
        Self {
            columns,
            exact,
            normalized,
        }
    }

    fn resolve(&self, name: &str) -> ColumnMatch {
        if let Some(&index) = self.exact.get(name) {
            return ColumnMatch::Exact { index };
        }
        match self.normalized.get(&normalize_column_name(name)).map(Vec::as_slice) {
            Some(&[index]) => ColumnMatch::Normalized {
                index,
                actual: self.columns[index].clone(),
            },
            Some(indices) if !indices.is_empty() => ColumnMatch::Ambiguous {
                candidates: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            },
            _ => ColumnMatch::Missing,
        }
    }
}

/// Resolution of one configured item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedItem {
    pub tier: Tier,
    pub criterion: String,
    pub agent: Agent,
    pub item: String,
    pub reverse: bool,
    pub column: ColumnMatch,
}

/// Resolution of one tier's sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierResolution {
    pub tier: Tier,
    pub sheet_present: bool,
    /// Respondent identifier column, when the schema names one.
    pub id_column: Option<ColumnMatch>,
    pub items: Vec<ResolvedItem>,
}

impl TierResolution {
    /// Resolved items of one criterion and agent, in schema order.
    pub fn items_for<'a>(
        &'a self,
        criterion: &'a str,
        agent: Agent,
    ) -> impl Iterator<Item = &'a ResolvedItem> + 'a {
        self.items
            .iter()
            .filter(move |i| i.criterion == criterion && i.agent == agent)
    }
}

/// Column resolution of every configured item against the response sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// Respondent identifier column named by the schema.
    pub id_column: Option<String>,
    pub tiers: Vec<TierResolution>,
}

impl ResolutionReport {
    #[must_use]
    pub fn resolve(schema: &SchemaConfig, responses: &ResponseSet) -> Self {
        let tiers = schema
            .tiers()
            .iter()
            .map(|tier_schema| {
                let tier = tier_schema.tier;
                let sheet = responses.sheet(tier);
                let empty = Sheet::default();
                let lookup = ColumnLookup::new(&sheet.unwrap_or(&empty).columns);

                let id_column = schema.id_column().map(|name| lookup.resolve(name));
                let mut items = vec![];
                for criterion in &tier_schema.criteria {
                    for agent in Agent::ALL {
                        let set = criterion.items(agent);
                        for item in &set.items {
                            items.push(ResolvedItem {
                                tier,
                                criterion: criterion.name.clone(),
                                agent,
                                item: item.clone(),
                                reverse: set.is_reversed(item),
                                column: lookup.resolve(item),
                            });
                        }
                    }
                }
                TierResolution {
                    tier,
                    sheet_present: sheet.is_some(),
                    id_column,
                    items,
                }
            })
            .collect();
        Self {
            id_column: schema.id_column().map(str::to_owned),
            tiers,
        }
    }

    #[must_use]
    pub fn tier(&self, tier: Tier) -> Option<&TierResolution> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    /// Items that could not be mapped to exactly one column.
    pub fn unresolved(&self) -> impl Iterator<Item = &ResolvedItem> {
        self.tiers
            .iter()
            .flat_map(|t| &t.items)
            .filter(|i| i.column.index().is_none())
    }

    /// Tiers in the schema without a response sheet.
    pub fn missing_sheets(&self) -> impl Iterator<Item = Tier> + '_ {
        self.tiers
            .iter()
            .filter(|t| !t.sheet_present)
            .map(|t| t.tier)
    }

    /// Whether every configured column and identifier column was found.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved().next().is_none()
            && self.tiers.iter().all(|t| {
                t.sheet_present && t.id_column.as_ref().is_none_or(|c| c.index().is_some())
            })
    }

    /// Coverage gaps and fuzzy matches as diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = vec![];
        for tier in &self.tiers {
            if !tier.sheet_present {
                diagnostics.push(Diagnostic::new(
                    Stage::Resolution,
                    Group::tier(tier.tier),
                    DiagnosticKind::MissingSheet,
                ));
                continue;
            }
            if let Some(id_column) = &tier.id_column
                && id_column.index().is_none()
            {
                diagnostics.push(Diagnostic::new(
                    Stage::Resolution,
                    Group::tier(tier.tier),
                    DiagnosticKind::UnresolvedIdColumn {
                        column: self.id_column.clone().unwrap_or_default(),
                    },
                ));
            }
            for item in &tier.items {
                let kind = match &item.column {
                    ColumnMatch::Exact { .. } => continue,
                    ColumnMatch::Normalized { actual, .. } => DiagnosticKind::NormalizedColumn {
                        column: item.item.clone(),
                        actual: actual.clone(),
                    },
                    ColumnMatch::Ambiguous { candidates } => DiagnosticKind::AmbiguousColumn {
                        column: item.item.clone(),
                        candidates: candidates.clone(),
                    },
                    ColumnMatch::Missing => DiagnosticKind::UnresolvedColumn {
                        column: item.item.clone(),
                    },
                };
                diagnostics.push(Diagnostic::new(
                    Stage::Resolution,
                    Group::triple(item.tier, &item.criterion, item.agent),
                    kind,
                ));
            }
        }
        diagnostics
    }
}
