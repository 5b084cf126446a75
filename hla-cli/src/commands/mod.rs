pub mod assoc;
pub mod raw;
pub mod score;

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use hla_core::assoc::{AssocConfig, PermutationConfig};
use hla_geno::exclude::read_exclusion_list;
use hla_geno::GenotypeTable;

/// Input, filtering and output options shared by every subcommand.
#[derive(Args)]
pub struct CommonArgs {
    /// Genotype file (IID, PHENO, then two columns per gene)
    #[arg(long)]
    pub file: String,

    /// Allele resolution in digits (2, 4, 6 or 8)
    #[arg(long, default_value = "4")]
    pub digit: usize,

    /// Test alleles whose combined frequency is strictly above this
    #[arg(long, default_value = "0.0")]
    pub freq: f64,

    /// File listing alleles to leave out, one per line
    #[arg(long)]
    pub exclude: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(long)]
    pub out: Option<String>,

    /// Write results as JSON instead of a table
    #[arg(long, default_value = "false")]
    pub json: bool,
}

/// Permutation options.
#[derive(Args)]
pub struct PermArgs {
    /// Number of valid permutations (0 disables permutation)
    #[arg(long, default_value = "0")]
    pub perm: usize,

    /// Seed for the label shuffles
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Maximum permutation draws, valid or not
    #[arg(long)]
    pub max_attempts: Option<usize>,
}

impl PermArgs {
    pub fn config(&self) -> Option<PermutationConfig> {
        (self.perm > 0).then(|| PermutationConfig {
            n_perm: self.perm,
            seed: self.seed,
            max_attempts: self.max_attempts,
        })
    }
}

impl CommonArgs {
    pub fn load_genotypes(&self) -> Result<GenotypeTable> {
        let table = GenotypeTable::from_path(&self.file, self.digit)?;
        info!(
            "Loaded {} samples ({} cases) x {} genes",
            table.n_samples(),
            table.n_cases(),
            table.genes.len()
        );
        Ok(table)
    }

    /// Base config with the frequency threshold and exclusion list applied.
    pub fn base_config(&self) -> Result<AssocConfig> {
        let mut config = AssocConfig {
            freq: self.freq,
            ..Default::default()
        };
        if let Some(ref path) = self.exclude {
            config.exclude = read_exclusion_list(path)?;
            info!("Excluding {} alleles", config.exclude.len());
        }
        Ok(config)
    }

    pub fn open_output(&self) -> Result<Box<dyn Write>> {
        Ok(match self.out {
            Some(ref path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(io::stdout().lock())),
        })
    }

    /// Write `value` as JSON when `--json` is set, otherwise call `write_table`.
    pub fn write_results<T: Serialize>(
        &self,
        value: &T,
        write_table: impl FnOnce(&mut dyn Write) -> Result<()>,
    ) -> Result<()> {
        let mut writer = self.open_output()?;
        if self.json {
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
        } else {
            write_table(&mut *writer)?;
        }
        writer.flush()?;
        if let Some(ref path) = self.out {
            info!("Results written to {}", path);
        }
        Ok(())
    }
}
