//! Gene-level 2 x m chi-squared association.
//!
//! hlassoc raw --file ... [--perm N --seed S]

use anyhow::Result;
use clap::Args;
use tracing::info;

use hla_core::assoc::assoc_raw;
use hla_core::assoc::output::write_gene_table;

use super::{CommonArgs, PermArgs};

#[derive(Args)]
pub struct RawArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    perm: PermArgs,
}

pub fn run(args: RawArgs) -> Result<()> {
    info!("=== Gene-level association ===");

    let mut config = args.common.base_config()?;
    config.permutation = args.perm.config();

    let table = args.common.load_genotypes()?;
    let assoc = assoc_raw(&table, &config)?;
    info!(
        "Tested {} genes over {} alleles",
        assoc.results.len(),
        assoc.used_alleles.len()
    );

    args.common
        .write_results(&assoc, |mut w| write_gene_table(&mut w, &assoc))
}
