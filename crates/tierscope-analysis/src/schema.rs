//! Survey schema: which item columns make up each criterion.
//!
//! The schema is read as a [`SchemaFile`] and validated once into an immutable
//! [`SchemaConfig`], which every later stage receives by reference.
//!
//! # File format
//!
//! ```json
//! {
//!   "id_column": "Respondent",
//!   "tiers": {
//!     "Tactical": {
//!       "scale": "categorical-or-likert",
//!       "criteria": [
//!         {
//!           "name": "Trust / Confidence",
//!           "AI": { "items": ["Q1", "Q2"], "reverse": ["Q2"] },
//!           "Human": { "items": [] }
//!         }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Criteria are kept in file order. Tiers are always processed in
//! [`Tier::ALL`] order.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Decision-making level a survey sheet belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Tier {
    Strategic,
    Tactical,
    Operational,
}

impl Tier {
    pub const ALL: [Self; 3] = [Self::Strategic, Self::Tactical, Self::Operational];
}

/// Decision maker being rated.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Agent {
    #[serde(rename = "AI")]
    #[display("AI")]
    Ai,
    Human,
}

impl Agent {
    pub const ALL: [Self; 2] = [Self::Ai, Self::Human];
}

/// How raw cells of a tier's sheet are parsed.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// First digit 1-5 in the cell text.
    #[default]
    NumericLikert,
    /// Leading letter A-D mapped to 1-4, otherwise as [`ScaleMode::NumericLikert`].
    CategoricalOrLikert,
}

/// Item columns of one (tier, criterion, agent) triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSet {
    pub items: Vec<String>,
    /// Subset of `items` that is reverse-coded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reverse: Vec<String>,
}

impl ItemSet {
    #[must_use]
    pub fn is_reversed(&self, item: &str) -> bool {
        self.reverse.iter().any(|r| r == item)
    }
}

/// Schema as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Column holding the respondent identifier, if any.
    #[serde(default)]
    pub id_column: Option<String>,
    pub tiers: BTreeMap<Tier, TierFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierFile {
    #[serde(default)]
    pub scale: ScaleMode,
    pub criteria: Vec<CriterionFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionFile {
    pub name: String,
    #[serde(flatten)]
    pub agents: BTreeMap<Agent, ItemSet>,
}

/// A single integrity problem in a schema file.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SchemaIssue {
    #[display("{tier}: criterion name is empty")]
    EmptyCriterionName { tier: Tier },
    #[display("{tier} / {criterion}: criterion is defined more than once")]
    DuplicateCriterion { tier: Tier, criterion: String },
    #[display("{tier} / {criterion}: no item list for agent {agent}")]
    MissingAgent {
        tier: Tier,
        criterion: String,
        agent: Agent,
    },
    #[display("{tier} / {criterion} / {agent}: item '{item}' is listed more than once")]
    DuplicateItem {
        tier: Tier,
        criterion: String,
        agent: Agent,
        item: String,
    },
    #[display("{tier} / {criterion} / {agent}: reverse-coded item '{item}' is not among the items")]
    UnknownReverseItem {
        tier: Tier,
        criterion: String,
        agent: Agent,
        item: String,
    },
}

/// Schema validation failure, carrying every issue found.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("schema has {} integrity issue(s)", issues.len())]
pub struct SchemaError {
    pub issues: Vec<SchemaIssue>,
}

/// Validated schema of one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSchema {
    pub tier: Tier,
    pub scale: ScaleMode,
    pub criteria: Vec<CriterionSchema>,
}

/// Validated criterion with item sets for both agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionSchema {
    pub name: String,
    ai: ItemSet,
    human: ItemSet,
}

impl CriterionSchema {
    #[must_use]
    pub fn items(&self, agent: Agent) -> &ItemSet {
        match agent {
            Agent::Ai => &self.ai,
            Agent::Human => &self.human,
        }
    }
}

/// Immutable, validated survey schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    id_column: Option<String>,
    tiers: Vec<TierSchema>,
}

impl TryFrom<SchemaFile> for SchemaConfig {
    type Error = SchemaError;

    fn try_from(file: SchemaFile) -> Result<Self, Self::Error> {
        Self::new(file)
    }
}

impl SchemaConfig {
    /// Validates a schema file.
    ///
    /// All integrity issues are collected before failing.
    pub fn new(file: SchemaFile) -> Result<Self, SchemaError> {
        let mut issues = vec![];
        let mut tiers = vec![];

        for (tier, tier_file) in file.tiers {
            let mut seen_criteria = HashSet::new();
            let mut criteria = vec![];
            for mut criterion in tier_file.criteria {
                let name = criterion.name.trim().to_owned();
                if name.is_empty() {
                    issues.push(SchemaIssue::EmptyCriterionName { tier });
                    continue;
                }
                if !seen_criteria.insert(name.clone()) {
                    issues.push(SchemaIssue::DuplicateCriterion {
                        tier,
                        criterion: name,
                    });
                    continue;
                }

                let mut sets = Agent::ALL.map(|agent| {
                    let set = criterion.agents.remove(&agent);
                    if set.is_none() {
                        issues.push(SchemaIssue::MissingAgent {
                            tier,
                            criterion: name.clone(),
                            agent,
                        });
                    }
                    set
                });
                for (agent, set) in Agent::ALL.iter().zip(&sets) {
                    if let Some(set) = set {
                        check_item_set(tier, &name, *agent, set, &mut issues);
                    }
                }
                if let [Some(ai), Some(human)] = &mut sets {
                    criteria.push(CriterionSchema {
                        name,
                        ai: std::mem::take(ai),
                        human: std::mem::take(human),
                    });
                }
            }
            tiers.push(TierSchema {
                tier,
                scale: tier_file.scale,
                criteria,
            });
        }

        if !issues.is_empty() {
            return Err(SchemaError { issues });
        }
        let id_column = file.id_column.filter(|c| !c.trim().is_empty());
        Ok(Self { id_column, tiers })
    }

    #[must_use]
    pub fn id_column(&self) -> Option<&str> {
        self.id_column.as_deref()
    }

    #[must_use]
    pub fn tiers(&self) -> &[TierSchema] {
        &self.tiers
    }

    #[must_use]
    pub fn tier(&self, tier: Tier) -> Option<&TierSchema> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    /// Criterion names across all tiers, in order of first appearance.
    #[must_use]
    pub fn criterion_names(&self) -> Vec<&str> {
        let mut names = Vec::<&str>::new();
        for criterion in self.tiers.iter().flat_map(|t| &t.criteria) {
            if !names.contains(&criterion.name.as_str()) {
                names.push(&criterion.name);
            }
        }
        names
    }
}

fn check_item_set(
    tier: Tier,
    criterion: &str,
    agent: Agent,
    set: &ItemSet,
    issues: &mut Vec<SchemaIssue>,
) {
    let mut seen = HashSet::new();
    for item in &set.items {
        if !seen.insert(item.as_str()) {
            issues.push(SchemaIssue::DuplicateItem {
                tier,
                criterion: criterion.to_owned(),
                agent,
                item: item.clone(),
            });
        }
    }
    for item in &set.reverse {
        if !seen.contains(item.as_str()) {
            issues.push(SchemaIssue::UnknownReverseItem {
                tier,
                criterion: criterion.to_owned(),
                agent,
                item: item.clone(),
            });
        }
    }
}
