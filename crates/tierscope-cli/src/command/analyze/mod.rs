//! Full analysis command
//!
//! Scores every configured criterion, runs all tests and writes the result
//! tables plus a run manifest into the output directory.

mod csv;

use std::{fs, path::PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;
use tierscope_analysis::{
    cross_tier::{Alignment, OmnibusPolicy},
    descriptive::PerformanceMatrix,
    diagnostics::{Diagnostic, Severity},
    pipeline::{self, AnalysisConfig, AnalysisReport},
};
use tierscope_stats::bootstrap::{Bootstrap, DEFAULT_CONFIDENCE, DEFAULT_ITERATIONS};

use self::csv::Format;
use crate::util::{self, Output};

const MANIFEST: &str = "run_manifest.json";
const SIGNIFICANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OmnibusArg {
    /// Repeated measures across tiers
    Friedman,
    /// Independent groups across tiers
    KruskalWallis,
}

impl From<OmnibusArg> for OmnibusPolicy {
    fn from(arg: OmnibusArg) -> Self {
        match arg {
            OmnibusArg::Friedman => Self::Friedman,
            OmnibusArg::KruskalWallis => Self::KruskalWallis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum AlignmentArg {
    /// Truncate tier vectors to the shortest
    Truncate,
    /// Keep respondents present in every tier
    Respondent,
}

impl From<AlignmentArg> for Alignment {
    fn from(arg: AlignmentArg) -> Self {
        match arg {
            AlignmentArg::Truncate => Self::Truncate,
            AlignmentArg::Respondent => Self::Respondent,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Path to the schema JSON file
    #[arg(long)]
    pub schema: PathBuf,

    /// Path to the responses JSON file
    #[arg(long)]
    pub responses: PathBuf,

    /// Directory for the result tables
    #[arg(long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Number of bootstrap resamples for decision variance
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub bootstrap_iterations: usize,

    /// Bootstrap seed; drawn from system entropy when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Bootstrap worker threads; defaults to the available parallelism
    #[arg(long)]
    pub workers: Option<usize>,

    /// Cross-tier omnibus test
    #[arg(long, value_enum, default_value_t = OmnibusArg::Friedman)]
    pub omnibus: OmnibusArg,

    /// How tier vectors are aligned for the Friedman test
    #[arg(long, value_enum, default_value_t = AlignmentArg::Truncate)]
    pub alignment: AlignmentArg,

    /// Confidence level of the t and bootstrap intervals
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    pub confidence: f64,

    /// Decimal places in the CSV output
    #[arg(long, default_value_t = 4)]
    pub precision: usize,
}

#[derive(Debug, Serialize)]
struct RunManifest<'a> {
    generated_at: DateTime<Utc>,
    schema: &'a std::path::Path,
    responses: &'a std::path::Path,
    seed: u64,
    bootstrap_iterations: usize,
    bootstrap_workers: usize,
    confidence: f64,
    omnibus: OmnibusPolicy,
    alignment: Alignment,
    precision: usize,
    files: Vec<String>,
    diagnostics: &'a [Diagnostic],
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    if !(arg.confidence > 0.0 && arg.confidence < 1.0) {
        anyhow::bail!("Confidence level must be in (0, 1), got {}", arg.confidence);
    }

    let schema = util::read_schema_file(&arg.schema)?;
    let responses = util::read_responses_file(&arg.responses)?;

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut bootstrap =
        Bootstrap::new(arg.bootstrap_iterations).with_confidence(arg.confidence);
    if let Some(workers) = arg.workers {
        bootstrap = bootstrap.with_workers(workers);
    }
    let config = AnalysisConfig {
        bootstrap,
        omnibus: arg.omnibus.into(),
        alignment: arg.alignment.into(),
        confidence: arg.confidence,
    };
    tracing::info!(
        seed,
        iterations = bootstrap.iterations,
        workers = bootstrap.workers,
        omnibus = %config.omnibus,
        alignment = %config.alignment,
        "starting analysis"
    );

    let mut rng = Pcg32::seed_from_u64(seed);
    let report = pipeline::run(&schema, &responses, &config, &mut rng);
    util::log_diagnostics(&report.diagnostics);

    fs::create_dir_all(&arg.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            arg.output_dir.display()
        )
    })?;
    let mut paths = csv::write_all(&arg.output_dir, &report, Format::new(arg.precision))?;

    let manifest_path = arg.output_dir.join(MANIFEST);
    let manifest = RunManifest {
        generated_at: Utc::now(),
        schema: &arg.schema,
        responses: &arg.responses,
        seed,
        bootstrap_iterations: bootstrap.iterations,
        bootstrap_workers: bootstrap.workers,
        confidence: arg.confidence,
        omnibus: config.omnibus,
        alignment: config.alignment,
        precision: arg.precision,
        files: paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect(),
        diagnostics: &report.diagnostics,
    };
    Output::open(manifest_path.clone())?.write_json(&manifest)?;
    paths.push(manifest_path);

    print_report(&report, seed);
    println!();
    println!("Results saved to: {}", arg.output_dir.display());
    for path in &paths {
        println!("  {}", path.display());
    }
    Ok(())
}

fn print_report(report: &AnalysisReport, seed: u64) {
    println!("Tierscope Analysis Report (seed={seed})");
    println!("=========================================\n");

    println!("Composite scores: {}", report.scores.len());
    println!("Summary groups:   {}", report.descriptives.len());
    println!(
        "Paired tests:     {} ({} with p < {SIGNIFICANCE})",
        report.paired.len(),
        significant(report.paired.iter().map(|r| r.p_value))
    );
    println!(
        "Omnibus tests:    {} ({} with p < {SIGNIFICANCE})",
        report.omnibus.len(),
        significant(report.omnibus.iter().map(|r| r.p_value))
    );
    println!(
        "Post-hoc pairs:   {} ({} with corrected p < {SIGNIFICANCE})",
        report.posthoc.len(),
        significant(report.posthoc.iter().map(|r| r.p_corrected))
    );
    let warnings = report
        .diagnostics
        .iter()
        .filter(|d| d.severity() == Severity::Warning)
        .count();
    println!(
        "Diagnostics:      {} ({warnings} warning(s))",
        report.diagnostics.len()
    );

    println!();
    print_performance_matrix(&report.performance_matrix);
}

fn significant<I>(p_values: I) -> usize
where
    I: IntoIterator<Item = Option<f64>>,
{
    p_values
        .into_iter()
        .filter(|p| p.is_some_and(|p| p < SIGNIFICANCE))
        .count()
}

fn print_performance_matrix(matrix: &PerformanceMatrix) {
    println!("Comparative Performance Matrix (median [IQR])");
    if matrix.rows.is_empty() {
        println!("  (no scores)");
        return;
    }

    let width = matrix
        .rows
        .iter()
        .map(|(criterion, _)| criterion.chars().count())
        .max()
        .unwrap_or(0)
        .max("Criterion".len());
    print!("  {:<width$}", "Criterion");
    for (tier, agent) in &matrix.columns {
        print!(" | {:>18}", format!("{tier} {agent}"));
    }
    println!();
    for (criterion, cells) in &matrix.rows {
        print!("  {criterion:<width$}");
        for cell in cells {
            let text = cell.map_or_else(
                || "-".to_owned(),
                |c| format!("{:.2} [{:.2}]", c.median, c.iqr),
            );
            print!(" | {text:>18}");
        }
        println!();
    }
}
