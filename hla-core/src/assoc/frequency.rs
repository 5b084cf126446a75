//! Case, control and combined allele frequencies.

use std::collections::{BTreeMap, BTreeSet};

use hla_geno::{AlleleId, CohortCounts};
use serde::Serialize;

use crate::util::math::safe_div;
use crate::util::value::Value;

/// Allele frequencies; `combined` is weighted by the cohort totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlleleFrequency {
    pub case: Value,
    pub ctrl: Value,
    pub combined: Value,
}

impl AlleleFrequency {
    /// Whether the combined frequency is defined and strictly above `threshold`.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.combined.get().is_some_and(|f| f > threshold)
    }
}

/// Frequencies of one allele given its counts and gene totals.
pub fn frequency(case: u64, case_total: u64, ctrl: u64, ctrl_total: u64) -> AlleleFrequency {
    AlleleFrequency {
        case: safe_div(case as f64, case_total as f64),
        ctrl: safe_div(ctrl as f64, ctrl_total as f64),
        combined: safe_div((case + ctrl) as f64, (case_total + ctrl_total) as f64),
    }
}

/// Frequencies for every allele observed in either cohort.
pub fn allele_frequencies(counts: &CohortCounts) -> BTreeMap<AlleleId, AlleleFrequency> {
    let alleles: BTreeSet<&AlleleId> = counts
        .case_alleles
        .keys()
        .chain(counts.ctrl_alleles.keys())
        .collect();

    alleles
        .into_iter()
        .map(|a| {
            let case = counts.case_alleles.get(a).copied().unwrap_or(0);
            let ctrl = counts.ctrl_alleles.get(a).copied().unwrap_or(0);
            let f = frequency(
                case,
                counts.case_total(&a.gene),
                ctrl,
                counts.ctrl_total(&a.gene),
            );
            (a.clone(), f)
        })
        .collect()
}
