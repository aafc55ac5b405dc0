use clap::{Parser, Subcommand};

use self::{analyze::AnalyzeArg, check_schema::CheckSchemaArg, resolve::ResolveArg};

mod analyze;
mod check_schema;
mod resolve;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the full analysis and write result tables
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Report how schema items map onto response columns
    Resolve(#[clap(flatten)] ResolveArg),
    /// Validate a schema file without reading responses
    CheckSchema(#[clap(flatten)] CheckSchemaArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Resolve(arg) => resolve::run(&arg)?,
        Mode::CheckSchema(arg) => check_schema::run(&arg)?,
    }
    Ok(())
}
