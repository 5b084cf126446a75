//! Per-gene score statistic U.
//!
//! hlassoc score --file ... [--model allelic|dominant|recessive]

use anyhow::Result;
use clap::Args;
use tracing::info;

use hla_core::assoc::output::write_score_table;
use hla_core::assoc::{assoc_score_u, parse_model};

use super::CommonArgs;

#[derive(Args)]
pub struct ScoreArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Allele encoding: allelic, dominant or recessive
    #[arg(long, default_value = "allelic")]
    model: String,
}

pub fn run(args: ScoreArgs) -> Result<()> {
    info!("=== Score statistic ===");

    let mut config = args.common.base_config()?;
    config.model = parse_model(&args.model)?;

    let table = args.common.load_genotypes()?;
    let scores = assoc_score_u(&table, &config)?;

    args.common
        .write_results(&scores, |mut w| write_score_table(&mut w, &scores))
}
