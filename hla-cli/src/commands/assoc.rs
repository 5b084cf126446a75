//! Per-allele association.
//!
//! hlassoc assoc --file ... [--test chisq|fisher] [--model allelic|dominant|recessive]
//!               [--adjust FDR] [--perm N --seed S]

use anyhow::Result;
use clap::Args;
use tracing::info;

use hla_core::assoc::output::write_allele_table;
use hla_core::assoc::{assoc_alleles, parse_model};
use hla_core::stats::adjust::AdjustMethod;
use hla_core::stats::TestMethod;

use super::{CommonArgs, PermArgs};

#[derive(Args)]
pub struct AssocArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    perm: PermArgs,

    /// Contingency test: chisq or fisher
    #[arg(long, default_value = "chisq")]
    test: String,

    /// Allele encoding: allelic, dominant or recessive
    #[arg(long, default_value = "allelic")]
    model: String,

    /// Multiple-testing correction: Bonferroni, Holm, FDR or FDR_BY
    #[arg(long, default_value = "FDR")]
    adjust: String,
}

pub fn run(args: AssocArgs) -> Result<()> {
    info!("=== Allele association ===");

    let mut config = args.common.base_config()?;
    config.test = args.test.parse::<TestMethod>()?;
    config.model = parse_model(&args.model)?;
    config.adjust = args.adjust.parse::<AdjustMethod>()?;
    config.permutation = args.perm.config();
    info!(
        "Test: {}, model: {}, adjustment: {}, frequency > {}",
        config.test.name(),
        config.model.name(),
        config.adjust.name(),
        config.freq
    );

    let table = args.common.load_genotypes()?;
    let assoc = assoc_alleles(&table, &config)?;
    info!("Tested {} alleles", assoc.results.len());

    args.common
        .write_results(&assoc, |mut w| write_allele_table(&mut w, &assoc))
}
