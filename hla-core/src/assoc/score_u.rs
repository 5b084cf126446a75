//! Per-gene score statistic U.
//!
//! For gene g with case total n1 and each allele a present in both cohorts
//! whose combined frequency f_a exceeds the threshold:
//!   d_a = c_a - n1 f_a
//!   U_g = sum_a d_a^2 / f_a - d_a / f_a
//! A gene with no qualifying allele, or a non-finite sum, is NA.

use std::collections::BTreeMap;

use anyhow::Result;
use hla_geno::{AlleleCounter, CohortCounts};
use tracing::info;

use crate::util::value::Value;

use super::config::AssocConfig;
use super::frequency::frequency;

/// U statistic for every gene with alleles observed among cases.
pub fn score_u(counts: &CohortCounts, freq: f64) -> BTreeMap<String, Value> {
    counts
        .case_genes()
        .into_iter()
        .map(|gene| {
            let n1 = counts.case_total(gene);
            let n2 = counts.ctrl_total(gene);
            let mut u: Option<f64> = None;

            for allele in counts.common_alleles() {
                if allele.gene != gene {
                    continue;
                }
                let case = counts.case_alleles[allele];
                let ctrl = counts.ctrl_alleles[allele];
                let f = frequency(case, n1, ctrl, n2);
                let Some(f_all) = f.combined.get().filter(|&x| x > freq) else {
                    continue;
                };
                let d = case as f64 - n1 as f64 * f_all;
                *u.get_or_insert(0.0) += d * d / f_all - d / f_all;
            }

            (gene.to_string(), Value::from(u))
        })
        .collect()
}

/// Count observed genotypes and compute [`score_u`].
pub fn assoc_score_u<C: AlleleCounter + ?Sized>(
    counter: &C,
    config: &AssocConfig,
) -> Result<BTreeMap<String, Value>> {
    config.validate()?;
    let counts = counter.observed(config.model)?;
    let scores = score_u(&counts, config.freq);
    info!("Computed score statistics for {} genes", scores.len());
    Ok(scores)
}
