//! Per-allele association under allelic, dominant or recessive encoding.
//!
//! Each allele typed in both cohorts, not excluded, and with combined
//! frequency above the threshold gets a 2x2 table
//!   (case, case_total - case, ctrl, ctrl_total - ctrl)
//! evaluated by chi-squared or Fisher's exact test, plus an odds ratio with
//! 95% CI. P-values are then adjusted gene by gene, and optionally compared
//! against label-permuted draws.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use hla_geno::{AlleleCounter, AlleleId, CohortCounts};
use serde::Serialize;
use tracing::{debug, info};

use crate::stats::adjust::adjust_pvalues;
use crate::stats::{evaluate_table, table_pvalue, ContingencyTable, TableStats, TestMethod};
use crate::util::value::Value;

use super::config::AssocConfig;
use super::frequency::{allele_frequencies, AlleleFrequency};
use super::permutation::{run_permutations, EmpiricalPValue};

/// Association result for one allele.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlleleResult {
    pub allele: AlleleId,
    pub table: ContingencyTable,
    pub freq: AlleleFrequency,
    pub stats: TableStats,
    /// P-value adjusted within the allele's gene.
    pub adjusted_pvalue: Value,
    pub permutation: Option<EmpiricalPValue>,
}

impl AlleleResult {
    pub fn pvalue(&self) -> Value {
        self.stats.pvalue
    }
}

/// Results of [`assoc_alleles`].
#[derive(Debug, Clone, Serialize)]
pub struct AlleleAssociation {
    pub test: TestMethod,
    pub results: BTreeMap<AlleleId, AlleleResult>,
    /// Alleles that passed the filters; permuted draws must reproduce them.
    pub used_alleles: BTreeSet<AlleleId>,
    /// Number of valid permutations, when permutation was requested.
    pub n_perm: Option<usize>,
}

/// Run the per-allele association pipeline.
pub fn assoc_alleles<C: AlleleCounter + ?Sized>(
    counter: &C,
    config: &AssocConfig,
) -> Result<AlleleAssociation> {
    config.validate()?;

    let counts = counter.observed(config.model)?;
    info!(
        "Counted {} case and {} control samples ({} model)",
        counts.n_cases,
        counts.n_controls,
        config.model.name()
    );

    let mut results = test_alleles(&counts, config)?;
    let used_alleles: BTreeSet<AlleleId> = results.keys().cloned().collect();
    info!(
        "Testing {} alleles with {} test",
        used_alleles.len(),
        config.test.name()
    );

    adjust_by_gene(&mut results, &counts.common_genes(), config);

    let n_perm = match &config.permutation {
        Some(perm) => {
            let observed: BTreeMap<AlleleId, Value> = results
                .iter()
                .map(|(a, r)| (a.clone(), r.pvalue()))
                .collect();
            let outcome = run_permutations(
                counter,
                config.model,
                &used_alleles,
                &observed,
                perm,
                |draw, allele| permuted_pvalue(draw, allele, config.test),
            )?;
            for (allele, result) in results.iter_mut() {
                result.permutation = outcome.empirical(allele, result.pvalue(), perm.n_perm);
            }
            Some(perm.n_perm)
        }
        None => None,
    };

    Ok(AlleleAssociation {
        test: config.test,
        results,
        used_alleles,
        n_perm,
    })
}

/// Evaluate every allele that passes the presence, exclusion and frequency filters.
pub fn test_alleles(
    counts: &CohortCounts,
    config: &AssocConfig,
) -> Result<BTreeMap<AlleleId, AlleleResult>> {
    let freqs = allele_frequencies(counts);
    let mut results = BTreeMap::new();

    for allele in counts.common_alleles() {
        if config.exclude.contains(allele) {
            debug!("Skipping excluded allele {}", allele);
            continue;
        }
        let freq = freqs[allele];
        if !freq.exceeds(config.freq) {
            continue;
        }

        let table = allele_table(counts, allele)?;
        let stats = evaluate_table(&table, config.test);
        results.insert(
            allele.clone(),
            AlleleResult {
                allele: allele.clone(),
                table,
                freq,
                stats,
                adjusted_pvalue: Value::Na,
                permutation: None,
            },
        );
    }

    Ok(results)
}

/// Adjust p-values within each gene. NA p-values stay NA and are left out
/// of the adjustment.
pub fn adjust_by_gene(
    results: &mut BTreeMap<AlleleId, AlleleResult>,
    genes: &[String],
    config: &AssocConfig,
) {
    for gene in genes {
        let members: Vec<&AlleleId> = results
            .keys()
            .filter(|a| &a.gene == gene && !results[*a].pvalue().is_na())
            .collect();
        let pvalues: Vec<f64> = members
            .iter()
            .filter_map(|a| results[*a].pvalue().get())
            .collect();
        let adjusted = adjust_pvalues(&pvalues, config.adjust);

        let members: Vec<AlleleId> = members.into_iter().cloned().collect();
        for (allele, adj) in members.iter().zip(adjusted) {
            if let Some(r) = results.get_mut(allele) {
                r.adjusted_pvalue = Value::finite(adj);
            }
        }
    }
}

fn allele_table(counts: &CohortCounts, allele: &AlleleId) -> Result<ContingencyTable> {
    ContingencyTable::from_counts(
        counts.case_alleles.get(allele).copied().unwrap_or(0),
        counts.case_total(&allele.gene),
        counts.ctrl_alleles.get(allele).copied().unwrap_or(0),
        counts.ctrl_total(&allele.gene),
    )
    .with_context(|| format!("Inconsistent counts for allele {}", allele))
}

fn permuted_pvalue(draw: &CohortCounts, allele: &AlleleId, test: TestMethod) -> Result<Value> {
    Ok(table_pvalue(&allele_table(draw, allele)?, test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::adjust::AdjustMethod;

    fn key(s: &str) -> AlleleId {
        s.parse().unwrap()
    }

    /// Gene A: three alleles over 100 case / 100 control copies.
    /// Gene B: one allele, plus B*99 seen only in cases.
    fn counts() -> CohortCounts {
        let mut c = CohortCounts::default();
        for (a, case, ctrl) in [
            ("A*01", 40, 20),
            ("A*02", 30, 30),
            ("A*03", 30, 50),
            ("B*07", 10, 25),
        ] {
            c.case_alleles.insert(key(a), case);
            c.ctrl_alleles.insert(key(a), ctrl);
        }
        c.case_alleles.insert(key("B*99"), 5);
        c.case_totals.insert("A".into(), 100);
        c.ctrl_totals.insert("A".into(), 100);
        c.case_totals.insert("B".into(), 100);
        c.ctrl_totals.insert("B".into(), 100);
        c.n_cases = 50;
        c.n_controls = 50;
        c
    }

    #[test]
    fn test_filters() {
        let mut config = AssocConfig::default();
        config.exclude.insert(key("A*02"));
        let results = test_alleles(&counts(), &config).unwrap();
        let names: Vec<String> = results.keys().map(|a| a.to_string()).collect();
        // B*99 missing from controls, A*02 excluded
        assert_eq!(names, vec!["A*01", "A*03", "B*07"]);

        // combined frequency of B*07 is 35/200 = 0.175; must be strictly greater
        config.freq = 0.175;
        let results = test_alleles(&counts(), &config).unwrap();
        assert!(!results.contains_key(&key("B*07")));
    }

    #[test]
    fn test_allele_table_and_stats() {
        let results = test_alleles(&counts(), &AssocConfig::default()).unwrap();
        let r = &results[&key("A*01")];
        assert_eq!(r.table.cells(), [40, 60, 20, 80]);
        assert_eq!(r.freq.combined, Value::Num(0.3));
        let or = r.stats.odds_ratio.get().unwrap();
        assert!((or - (40.0 * 80.0) / (60.0 * 20.0)).abs() < 1e-12);
        assert!(r.stats.ci_lower.get().unwrap() < or);
    }

    #[test]
    fn test_adjustment_is_gene_scoped() {
        let config = AssocConfig {
            adjust: AdjustMethod::Bonferroni,
            ..Default::default()
        };
        let c = counts();
        let mut results = test_alleles(&c, &config).unwrap();
        adjust_by_gene(&mut results, &c.common_genes(), &config);

        for allele in ["A*01", "A*02", "A*03"] {
            let r = &results[&key(allele)];
            let expected = (r.pvalue().get().unwrap() * 3.0).min(1.0);
            assert!((r.adjusted_pvalue.get().unwrap() - expected).abs() < 1e-12);
        }
        // B*07 is alone in gene B: adjustment is the identity
        let b = &results[&key("B*07")];
        assert_eq!(b.adjusted_pvalue, b.pvalue());
    }

    #[test]
    fn test_na_pvalue_is_not_adjusted() {
        let c = counts();
        let config = AssocConfig::default();
        let mut results = test_alleles(&c, &config).unwrap();

        // A degenerate table in gene B: empty column margin
        let table = ContingencyTable::new(0, 100, 0, 100);
        let stats = evaluate_table(&table, config.test);
        assert!(stats.pvalue.is_na());
        results.insert(
            key("B*08"),
            AlleleResult {
                allele: key("B*08"),
                table,
                freq: super::super::frequency::frequency(0, 100, 0, 100),
                stats,
                adjusted_pvalue: Value::Na,
                permutation: None,
            },
        );
        adjust_by_gene(&mut results, &c.common_genes(), &config);

        assert!(results[&key("B*08")].adjusted_pvalue.is_na());
        // B*07 is still the only p-value adjusted in gene B
        let b07 = &results[&key("B*07")];
        assert_eq!(b07.adjusted_pvalue, b07.pvalue());
    }
}
