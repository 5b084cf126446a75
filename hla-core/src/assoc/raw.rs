//! Gene-level 2 x m association.
//!
//! For each gene typed in both cohorts, the qualifying alleles (present in
//! both cohorts, not excluded, combined frequency above the threshold) form
//! a 2 x m table
//! ```text
//!   cases     c_1 c_2 ... c_m
//!   controls  d_1 d_2 ... d_m
//! ```
//! tested jointly with Pearson's chi-squared test, one result per gene.
//! Counts always use the allelic encoding. Under permutation each gene is
//! retested over the same alleles it was observed with.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use hla_geno::{AlleleCounter, AlleleId, CohortCounts, EncodingModel};
use serde::Serialize;
use tracing::info;

use crate::stats::chisq::chi2_contingency;
use crate::util::value::Value;

use super::config::AssocConfig;
use super::frequency::allele_frequencies;
use super::permutation::{run_permutations, EmpiricalPValue};

/// Result of the 2 x m test for one gene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneResult {
    pub gene: String,
    pub chi2: Value,
    pub dof: Value,
    pub pvalue: Value,
    /// Alleles forming the table columns.
    pub alleles: Vec<AlleleId>,
    pub permutation: Option<EmpiricalPValue>,
}

/// Results of [`assoc_raw`].
#[derive(Debug, Clone, Serialize)]
pub struct GeneAssociation {
    pub results: BTreeMap<String, GeneResult>,
    pub used_alleles: BTreeSet<AlleleId>,
    pub n_perm: Option<usize>,
}

/// Run the gene-level 2 x m pipeline.
pub fn assoc_raw<C: AlleleCounter + ?Sized>(
    counter: &C,
    config: &AssocConfig,
) -> Result<GeneAssociation> {
    config.validate()?;

    let counts = counter.observed(EncodingModel::Allelic)?;
    let mut results = test_genes(&counts, config);
    let used_alleles: BTreeSet<AlleleId> = results
        .values()
        .flat_map(|r| r.alleles.iter().cloned())
        .collect();
    info!(
        "Tested {} genes over {} alleles",
        results.len(),
        used_alleles.len()
    );

    let n_perm = match &config.permutation {
        Some(perm) => {
            let observed: BTreeMap<String, Value> = results
                .iter()
                .map(|(g, r)| (g.clone(), r.pvalue))
                .collect();
            let columns: BTreeMap<String, Vec<AlleleId>> = results
                .iter()
                .map(|(g, r)| (g.clone(), r.alleles.clone()))
                .collect();
            let outcome = run_permutations(
                counter,
                EncodingModel::Allelic,
                &used_alleles,
                &observed,
                perm,
                |draw, gene| Ok(gene_table_pvalue(draw, &columns[gene])),
            )?;
            for (gene, result) in results.iter_mut() {
                result.permutation = outcome.empirical(gene, result.pvalue, perm.n_perm);
            }
            Some(perm.n_perm)
        }
        None => None,
    };

    Ok(GeneAssociation {
        results,
        used_alleles,
        n_perm,
    })
}

/// One 2 x m test per gene present in both cohort totals.
pub fn test_genes(counts: &CohortCounts, config: &AssocConfig) -> BTreeMap<String, GeneResult> {
    let freqs = allele_frequencies(counts);
    let common = counts.common_alleles();

    counts
        .common_genes()
        .into_iter()
        .map(|gene| {
            let alleles: Vec<AlleleId> = common
                .iter()
                .filter(|a| a.gene == gene)
                .filter(|a| !config.exclude.contains(**a))
                .filter(|a| freqs[**a].exceeds(config.freq))
                .map(|a| (*a).clone())
                .collect();
            let chi = chi2_contingency(&gene_rows(counts, &alleles));
            let result = GeneResult {
                gene: gene.clone(),
                chi2: chi.statistic,
                dof: chi.dof,
                pvalue: chi.pvalue,
                alleles,
                permutation: None,
            };
            (gene, result)
        })
        .collect()
}

fn gene_rows(counts: &CohortCounts, alleles: &[AlleleId]) -> Vec<Vec<f64>> {
    let row = |cohort: &BTreeMap<AlleleId, u64>| -> Vec<f64> {
        alleles
            .iter()
            .map(|a| cohort.get(a).copied().unwrap_or(0) as f64)
            .collect()
    };
    vec![row(&counts.case_alleles), row(&counts.ctrl_alleles)]
}

fn gene_table_pvalue(draw: &CohortCounts, alleles: &[AlleleId]) -> Value {
    chi2_contingency(&gene_rows(draw, alleles)).pvalue
}
