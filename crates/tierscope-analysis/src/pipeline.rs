//! End-to-end analysis run.
//!
//! [`run`] resolves columns, scores items, aggregates composites and feeds the
//! resulting [`ScoreTable`] to every engine. Ragged sheets, coverage gaps and
//! skipped groups never abort the run; they are collected as [`Diagnostic`]
//! values in the order the stages ran.

use rand::Rng;
use tierscope_stats::bootstrap::{Bootstrap, DEFAULT_CONFIDENCE};

use crate::{
    aggregate::ScoreTable,
    cross_tier::{self, Alignment, OmnibusPolicy, OmnibusRecord},
    decision_variance::{self, DecisionVarianceRecord},
    descriptive::{self, DescriptiveRecord, PerformanceMatrix},
    diagnostics::Diagnostic,
    paired::{self, PairedTestRecord},
    posthoc::{self, PosthocRecord},
    reliability::{self, ReliabilityRecord},
    resolution::ResolutionReport,
    schema::SchemaConfig,
    scoring,
    table::ResponseSet,
};

/// Tunables of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub bootstrap: Bootstrap,
    pub omnibus: OmnibusPolicy,
    pub alignment: Alignment,
    /// Level of the Student-t intervals in the descriptive summary.
    pub confidence: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bootstrap: Bootstrap::default(),
            omnibus: OmnibusPolicy::default(),
            alignment: Alignment::default(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

/// Every record set produced by one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub resolution: ResolutionReport,
    pub scores: ScoreTable,
    pub reliability: Vec<ReliabilityRecord>,
    pub descriptives: Vec<DescriptiveRecord>,
    pub paired: Vec<PairedTestRecord>,
    pub omnibus: Vec<OmnibusRecord>,
    pub posthoc: Vec<PosthocRecord>,
    pub decision_variance: Vec<DecisionVarianceRecord>,
    pub performance_matrix: PerformanceMatrix,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the whole analysis.
///
/// `rng` only seeds the decision-variance bootstrap; the same seed gives the
/// same report.
#[must_use]
pub fn run<R>(
    schema: &SchemaConfig,
    responses: &ResponseSet,
    config: &AnalysisConfig,
    rng: &mut R,
) -> AnalysisReport
where
    R: Rng + ?Sized,
{
    let mut diagnostics = responses.layout_diagnostics();
    if !diagnostics.is_empty() {
        tracing::debug!(issues = diagnostics.len(), "response sheets have layout issues");
    }

    let resolution = ResolutionReport::resolve(schema, responses);
    diagnostics.extend(resolution.diagnostics());
    tracing::debug!(
        unresolved = resolution.unresolved().count(),
        "resolved item columns"
    );

    let parsed = scoring::parse_items(schema, responses, &resolution);
    diagnostics.extend(parsed.diagnostics);

    let scores = ScoreTable::aggregate(&parsed.matrices);
    tracing::debug!(
        matrices = parsed.matrices.len(),
        scores = scores.len(),
        "aggregated composite scores"
    );

    let (reliability, found) = reliability::estimate(&parsed.matrices);
    diagnostics.extend(found);

    let descriptives = descriptive::describe(&scores, config.confidence);
    let performance_matrix = PerformanceMatrix::from_records(&descriptives);

    let (paired, found) = paired::compare_agents(&scores);
    diagnostics.extend(found);

    let (omnibus, found) = cross_tier::compare_tiers(&scores, config.omnibus, config.alignment);
    diagnostics.extend(found);

    let (posthoc, found) = posthoc::compare_pairs(&scores);
    diagnostics.extend(found);

    let (decision_variance, found) = decision_variance::estimate(&scores, &config.bootstrap, rng);
    diagnostics.extend(found);

    tracing::debug!(
        descriptives = descriptives.len(),
        paired = paired.len(),
        omnibus = omnibus.len(),
        posthoc = posthoc.len(),
        diagnostics = diagnostics.len(),
        "analysis finished"
    );

    AnalysisReport {
        resolution,
        scores,
        reliability,
        descriptives,
        paired,
        omnibus,
        posthoc,
        decision_variance,
        performance_matrix,
        diagnostics,
    }
}
