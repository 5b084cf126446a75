//! Core types and the counting trait consumed by the association engine.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use rand::RngCore;

use crate::allele::AlleleId;

/// How genotypes are turned into per-allele counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingModel {
    /// Every allele copy is counted; gene total is the number of typed copies.
    #[default]
    Allelic,
    /// Carriers of at least one copy; gene total is the number of typed samples.
    Dominant,
    /// Homozygous carriers; gene total is the number of typed samples.
    Recessive,
}

impl EncodingModel {
    /// Look up a model by its command-line name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "allelic" | "allele" => Some(Self::Allelic),
            "dom" | "dominant" => Some(Self::Dominant),
            "rec" | "recessive" => Some(Self::Recessive),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Allelic => "allelic",
            Self::Dominant => "dom",
            Self::Recessive => "rec",
        }
    }
}

/// Case/control allele counts and their per-gene denominators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortCounts {
    /// Allele counts among cases.
    pub case_alleles: BTreeMap<AlleleId, u64>,
    /// Allele counts among controls.
    pub ctrl_alleles: BTreeMap<AlleleId, u64>,
    /// Per-gene totals among cases.
    pub case_totals: BTreeMap<String, u64>,
    /// Per-gene totals among controls.
    pub ctrl_totals: BTreeMap<String, u64>,
    /// Number of case samples.
    pub n_cases: usize,
    /// Number of control samples.
    pub n_controls: usize,
}

impl CohortCounts {
    /// Case total for `gene`, zero when the gene was never typed in cases.
    pub fn case_total(&self, gene: &str) -> u64 {
        self.case_totals.get(gene).copied().unwrap_or(0)
    }

    /// Control total for `gene`, zero when the gene was never typed in controls.
    pub fn ctrl_total(&self, gene: &str) -> u64 {
        self.ctrl_totals.get(gene).copied().unwrap_or(0)
    }

    /// Alleles observed in both cohorts.
    pub fn common_alleles(&self) -> BTreeSet<&AlleleId> {
        self.case_alleles
            .keys()
            .filter(|a| self.ctrl_alleles.contains_key(*a))
            .collect()
    }

    /// Whether every allele in `required` is observed in both cohorts.
    pub fn contains_all(&self, required: &BTreeSet<AlleleId>) -> bool {
        required
            .iter()
            .all(|a| self.case_alleles.contains_key(a) && self.ctrl_alleles.contains_key(a))
    }

    /// Genes with a total in both cohorts, sorted.
    pub fn common_genes(&self) -> Vec<String> {
        self.case_totals
            .keys()
            .filter(|g| self.ctrl_totals.contains_key(*g))
            .cloned()
            .collect()
    }

    /// Genes of all alleles observed among cases, sorted.
    pub fn case_genes(&self) -> BTreeSet<&str> {
        self.case_alleles.keys().map(|a| a.gene.as_str()).collect()
    }
}

/// Source of case/control allele counts.
///
/// Implementations count observed genotypes and, for permutation tests,
/// recount them after shuffling case/control labels with the caller's RNG.
/// The RNG is owned by the caller so that one seeded stream drives every draw.
pub trait AlleleCounter {
    /// Counts under the observed case/control labels.
    fn observed(&self, model: EncodingModel) -> Result<CohortCounts>;

    /// Counts under one fresh random shuffle of the case/control labels.
    fn permuted(&self, model: EncodingModel, rng: &mut dyn RngCore) -> Result<CohortCounts>;
}
