//! CSV rendering of analysis records.
//!
//! Values are kept at full precision until they are written here. Undefined
//! values are written as [`NA`].

use std::{
    borrow::Cow,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tierscope_analysis::{
    cross_tier::OmnibusRecord,
    decision_variance::DecisionVarianceRecord,
    descriptive::{DescriptiveRecord, PerformanceMatrix},
    paired::PairedTestRecord,
    pipeline::AnalysisReport,
    posthoc::PosthocRecord,
    reliability::ReliabilityRecord,
};

pub(crate) const NA: &str = "NA";

pub(crate) const SUMMARY: &str = "summary_table.csv";
pub(crate) const SUMMARY_WITH_CI: &str = "summary_table_with_CI.csv";
pub(crate) const RELIABILITY: &str = "reliability.csv";
pub(crate) const INFERENTIAL: &str = "inferential_stats.csv";
pub(crate) const OMNIBUS: &str = "omnibus_test.csv";
pub(crate) const POSTHOC: &str = "posthoc_comparisons.csv";
pub(crate) const DECISION_VARIANCE: &str = "decision_variance.csv";
pub(crate) const PERFORMANCE_MATRIX: &str = "performance_matrix.csv";

const PAIRED_TEST: &str = "Wilcoxon signed-rank";

/// Number formatting shared by every table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Format {
    precision: usize,
}

impl Format {
    pub(crate) fn new(precision: usize) -> Self {
        Self { precision }
    }

    pub(crate) fn num(self, value: f64) -> String {
        if value.is_finite() {
            format!("{value:.prec$}", prec = self.precision)
        } else {
            NA.to_owned()
        }
    }

    pub(crate) fn opt(self, value: Option<f64>) -> String {
        value.map_or_else(|| NA.to_owned(), |v| self.num(v))
    }
}

fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn push_row<I, S>(csv: &mut String, fields: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let line = fields
        .into_iter()
        .map(|f| quote(f.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    writeln!(csv, "{line}").context("Failed to format CSV row")
}

fn summary_fields(r: &DescriptiveRecord, format: Format) -> Vec<String> {
    vec![
        r.agent.to_string(),
        r.tier.to_string(),
        r.criterion.clone(),
        r.n.to_string(),
        format.num(r.mean),
        format.num(r.median),
        format.num(r.q1),
        format.num(r.q3),
        format.opt(r.sd),
        format.num(r.iqr),
        r.label.map_or_else(|| NA.to_owned(), |l| l.to_string()),
    ]
}

const SUMMARY_HEADER: [&str; 11] = [
    "Agent", "Level", "Criterion", "N", "Mean", "Median", "Q1", "Q3", "SD", "IQR", "Label",
];

pub(crate) fn summary_table(records: &[DescriptiveRecord], format: Format) -> anyhow::Result<String> {
    let mut csv = String::new();
    push_row(&mut csv, SUMMARY_HEADER)?;
    for r in records {
        push_row(&mut csv, summary_fields(r, format))?;
    }
    Ok(csv)
}

pub(crate) fn summary_table_with_ci(
    records: &[DescriptiveRecord],
    format: Format,
) -> anyhow::Result<String> {
    let mut csv = String::new();
    push_row(&mut csv, SUMMARY_HEADER.into_iter().chain(["CI_low", "CI_high"]))?;
    for r in records {
        let mut fields = summary_fields(r, format);
        fields.push(format.opt(r.ci.map(|ci| ci.lower)));
        fields.push(format.opt(r.ci.map(|ci| ci.upper)));
        push_row(&mut csv, fields)?;
    }
    Ok(csv)
}

pub(crate) fn reliability(records: &[ReliabilityRecord], format: Format) -> anyhow::Result<String> {
    let mut csv = String::new();
    push_row(
        &mut csv,
        ["Level", "Criterion", "Agent", "Alpha", "Items", "CompleteRows"],
    )?;
    for r in records {
        push_row(
            &mut csv,
            [
                r.tier.to_string(),
                r.criterion.clone(),
                r.agent.to_string(),
                format.opt(r.alpha),
                r.items.to_string(),
                r.complete_rows.to_string(),
            ],
        )?;
    }
    Ok(csv)
}

pub(crate) fn inferential(records: &[PairedTestRecord], format: Format) -> anyhow::Result<String> {
    let mut csv = String::new();
    push_row(
        &mut csv,
        ["Level", "Criterion", "N", "Test", "Stat", "p", "EffectSize"],
    )?;
    for r in records {
        push_row(
            &mut csv,
            [
                r.tier.to_string(),
                r.criterion.clone(),
                r.n.to_string(),
                PAIRED_TEST.to_owned(),
                format.opt(r.statistic),
                format.opt(r.p_value),
                format.opt(r.effect_size),
            ],
        )?;
    }
    Ok(csv)
}

pub(crate) fn omnibus(records: &[OmnibusRecord], format: Format) -> anyhow::Result<String> {
    let mut csv = String::new();
    push_row(
        &mut csv,
        ["Agent", "Criterion", "Test", "k", "N", "Stat", "p", "EffectSize"],
    )?;
    for r in records {
        push_row(
            &mut csv,
            [
                r.agent.to_string(),
                r.criterion.clone(),
                r.test.to_string(),
                r.groups.to_string(),
                r.n.to_string(),
                format.opt(r.statistic),
                format.opt(r.p_value),
                format.opt(r.effect_size),
            ],
        )?;
    }
    Ok(csv)
}

pub(crate) fn posthoc(records: &[PosthocRecord], format: Format) -> anyhow::Result<String> {
    let mut csv = String::new();
    push_row(
        &mut csv,
        [
            "Agent",
            "Criterion",
            "Comparison",
            "Stat",
            "p_uncorrected",
            "p_corrected",
            "n_comparisons",
        ],
    )?;
    for r in records {
        push_row(
            &mut csv,
            [
                r.agent.to_string(),
                r.criterion.clone(),
                r.comparison(),
                format.num(r.statistic),
                format.opt(r.p_uncorrected),
                format.opt(r.p_corrected),
                r.comparisons.to_string(),
            ],
        )?;
    }
    Ok(csv)
}

pub(crate) fn decision_variance(
    records: &[DecisionVarianceRecord],
    format: Format,
) -> anyhow::Result<String> {
    let mut csv = String::new();
    push_row(
        &mut csv,
        ["Level", "Agent", "N", "DV", "CI_lower", "CI_upper"],
    )?;
    for r in records {
        push_row(
            &mut csv,
            [
                r.tier.to_string(),
                r.agent.to_string(),
                r.n.to_string(),
                format.opt(r.dv),
                format.opt(r.ci_lower),
                format.opt(r.ci_upper),
            ],
        )?;
    }
    Ok(csv)
}

pub(crate) fn performance_matrix(
    matrix: &PerformanceMatrix,
    format: Format,
) -> anyhow::Result<String> {
    let mut csv = String::new();
    let header = ["Criterion".to_owned()].into_iter().chain(
        matrix
            .columns
            .iter()
            .flat_map(|(tier, agent)| [format!("{tier} {agent} Median"), format!("{tier} {agent} IQR")]),
    );
    push_row(&mut csv, header)?;
    for (criterion, cells) in &matrix.rows {
        let fields = [criterion.clone()].into_iter().chain(cells.iter().flat_map(|cell| {
            [
                format.opt(cell.map(|c| c.median)),
                format.opt(cell.map(|c| c.iqr)),
            ]
        }));
        push_row(&mut csv, fields)?;
    }
    Ok(csv)
}

/// Writes every table of `report` into `dir` and returns the written paths.
pub(crate) fn write_all(
    dir: &Path,
    report: &AnalysisReport,
    format: Format,
) -> anyhow::Result<Vec<PathBuf>> {
    let tables = [
        (SUMMARY, summary_table(&report.descriptives, format)?),
        (SUMMARY_WITH_CI, summary_table_with_ci(&report.descriptives, format)?),
        (RELIABILITY, reliability(&report.reliability, format)?),
        (INFERENTIAL, inferential(&report.paired, format)?),
        (OMNIBUS, omnibus(&report.omnibus, format)?),
        (POSTHOC, posthoc(&report.posthoc, format)?),
        (DECISION_VARIANCE, decision_variance(&report.decision_variance, format)?),
        (PERFORMANCE_MATRIX, performance_matrix(&report.performance_matrix, format)?),
    ];

    let mut paths = vec![];
    for (name, content) in tables {
        let path = dir.join(name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        paths.push(path);
    }
    Ok(paths)
}
