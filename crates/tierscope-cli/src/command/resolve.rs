use std::path::PathBuf;

use clap::Args;
use tierscope_analysis::resolution::{ColumnMatch, ResolutionReport};

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct ResolveArg {
    /// Path to the schema JSON file
    #[arg(long)]
    pub schema: PathBuf,

    /// Path to the responses JSON file
    #[arg(long)]
    pub responses: PathBuf,

    /// Also write the full resolution report as JSON to this path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ResolveArg) -> anyhow::Result<()> {
    let schema = util::read_schema_file(&arg.schema)?;
    let responses = util::read_responses_file(&arg.responses)?;
    util::log_diagnostics(&responses.layout_diagnostics());

    let report = ResolutionReport::resolve(&schema, &responses);

    println!("Column Resolution Report");
    println!("========================");
    for tier in &report.tiers {
        println!();
        if !tier.sheet_present {
            println!("{}: no response sheet", tier.tier);
            continue;
        }
        let found = tier.items.iter().filter(|i| i.column.index().is_some()).count();
        println!("{}: {found}/{} item column(s) found", tier.tier, tier.items.len());
        for item in &tier.items {
            let status = match &item.column {
                ColumnMatch::Exact { .. } => continue,
                ColumnMatch::Normalized { actual, .. } => format!("matched '{actual}'"),
                ColumnMatch::Ambiguous { candidates } => {
                    format!("ambiguous: {}", candidates.join(", "))
                }
                ColumnMatch::Missing => "MISSING".to_owned(),
            };
            println!(
                "  {} / {} / {}: {status}",
                item.criterion, item.agent, item.item
            );
        }
    }

    if let Some(path) = &arg.output {
        Output::open(path.clone())?.write_json(&report)?;
        println!();
        println!("Resolution report saved to: {}", path.display());
    }

    let unresolved = report.unresolved().count();
    let missing_sheets = report.missing_sheets().count();
    if unresolved > 0 || missing_sheets > 0 {
        anyhow::bail!(
            "{unresolved} item column(s) unresolved, {missing_sheets} tier sheet(s) missing"
        );
    }
    println!();
    println!("All configured columns resolved");
    Ok(())
}
