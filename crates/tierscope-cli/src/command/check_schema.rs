use std::path::PathBuf;

use clap::Args;
use tierscope_analysis::schema::{Agent, ScaleMode};

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct CheckSchemaArg {
    /// Path to the schema JSON file
    #[arg(long)]
    pub schema: PathBuf,
}

pub(crate) fn run(arg: &CheckSchemaArg) -> anyhow::Result<()> {
    let schema = util::read_schema_file(&arg.schema)?;

    println!("Schema: {}", arg.schema.display());
    match schema.id_column() {
        Some(column) => println!("  Respondent ID column: {column}"),
        None => println!("  Respondent ID column: (sheet index or row position)"),
    }
    for tier in schema.tiers() {
        let scale = match tier.scale {
            ScaleMode::NumericLikert => "numeric Likert",
            ScaleMode::CategoricalOrLikert => "categorical or Likert",
        };
        println!();
        println!("{} ({scale}, {} criteria)", tier.tier, tier.criteria.len());
        for criterion in &tier.criteria {
            let counts = Agent::ALL.map(|agent| {
                let items = criterion.items(agent);
                if items.reverse.is_empty() {
                    format!("{agent}: {}", items.items.len())
                } else {
                    format!(
                        "{agent}: {} ({} reversed)",
                        items.items.len(),
                        items.reverse.len()
                    )
                }
            });
            println!("  {:<32} {}", criterion.name, counts.join(", "));
        }
    }

    println!();
    println!(
        "Schema is valid: {} tier(s), {} distinct criteria",
        schema.tiers().len(),
        schema.criterion_names().len()
    );
    Ok(())
}
