//! Survey analysis for AI versus Human decision quality across tiers.
//!
//! This crate turns raw Likert-style survey sheets into composite criterion
//! scores and runs every downstream analysis on them:
//!
//! - **Input**: a validated [`schema::SchemaConfig`] and a
//!   [`table::ResponseSet`] with one sheet per tier
//! - **Scoring**: column resolution, response parsing, reverse-coding and
//!   skip-missing composite means
//! - **Engines**: reliability, descriptive summaries, paired AI/Human tests,
//!   cross-tier omnibus tests, post-hoc pairwise tests and bootstrapped
//!   decision variance
//!
//! Nothing in this crate performs I/O. Every engine returns plain record
//! values together with [`diagnostics::Diagnostic`] values describing what
//! was skipped and why.
//!
//! # Modules
//!
//! - [`schema`]: Tiers, agents and criterion item sets
//! - [`table`]: Raw response sheets and respondent identifiers
//! - [`response`]: Cell parsing and reverse-coding
//! - [`resolution`]: Batch column lookup with normalised matching
//! - [`scoring`]: Per-criterion item matrices
//! - [`aggregate`]: Composite scores
//! - [`reliability`]: Cronbach's alpha per criterion
//! - [`descriptive`]: Group summaries, labels and the performance matrix
//! - [`paired`]: Wilcoxon signed-rank AI versus Human
//! - [`cross_tier`]: Friedman or Kruskal–Wallis across tiers
//! - [`posthoc`]: Bonferroni-corrected Mann–Whitney pairs
//! - [`decision_variance`]: Relative MAD with a bootstrap interval
//! - [`diagnostics`]: Structured skip and coverage reports
//! - [`pipeline`]: The whole run in one call
//!
//! # Examples
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use tierscope_analysis::{
//!     pipeline::{self, AnalysisConfig},
//!     schema::{Agent, SchemaConfig, Tier},
//!     table::ResponseSet,
//! };
//!
//! let schema = SchemaConfig::new(
//!     serde_json::from_str(
//!         r#"{"tiers": {"Strategic": {"criteria": [
//!             {"name": "Fit", "AI": {"items": ["Q1"]}, "Human": {"items": []}}
//!         ]}}}"#,
//!     )
//!     .unwrap(),
//! )
//! .unwrap();
//! let responses: ResponseSet = serde_json::from_str(
//!     r#"{"Strategic": {"columns": ["Q1"], "data": [["4 - Agree"], [2], ["n/a"]]}}"#,
//! )
//! .unwrap();
//!
//! let mut rng = Pcg32::seed_from_u64(0);
//! let report = pipeline::run(&schema, &responses, &AnalysisConfig::default(), &mut rng);
//! assert_eq!(report.scores.values(Tier::Strategic, "Fit", Agent::Ai), [4.0, 2.0]);
//! ```

pub mod aggregate;
pub mod cross_tier;
pub mod decision_variance;
pub mod descriptive;
pub mod diagnostics;
pub mod paired;
pub mod pipeline;
pub mod posthoc;
pub mod reliability;
pub mod resolution;
pub mod response;
pub mod schema;
pub mod scoring;
pub mod table;
