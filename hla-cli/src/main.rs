//! hlassoc: HLA case/control association analysis.
//!
//! CLI entry point using clap for argument parsing.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hlassoc",
    version,
    about = "HLA allele association testing for case/control cohorts",
    long_about = "Per-allele and per-gene association tests over HLA genotype calls.\n\
                  Chi-squared or Fisher's exact tests, odds ratios, per-gene multiple-testing\n\
                  correction and label-permutation empirical p-values."
)]
struct Cli {
    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-allele 2x2 association with per-gene p-value adjustment
    Assoc(commands::assoc::AssocArgs),

    /// Per-gene 2 x m chi-squared association over all alleles
    Raw(commands::raw::RawArgs),

    /// Per-gene score statistic U
    Score(commands::score::ScoreArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("hlassoc v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Assoc(args) => commands::assoc::run(args),
        Commands::Raw(args) => commands::raw::run(args),
        Commands::Score(args) => commands::score::run(args),
    }
}
