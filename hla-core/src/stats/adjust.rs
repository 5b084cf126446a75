//! Multiple-testing correction of p-values.
//!
//! Four procedures, all returning adjusted p-values in input order:
//!   Bonferroni:           p_adj = min(1, n p)
//!   Holm (step-down):     rank ascending, raw (n - r) p, running max
//!   Benjamini-Hochberg:   rank descending, raw n p / (n - r), running min
//!   Benjamini-Yekutieli:  as BH, raw scaled by H(n) = sum_{k<=n} 1/k
//!
//! `r` is the 0-based rank. Ties are ordered by input index (ascending for
//! Holm, descending for BH/BY), so results are deterministic.

use std::str::FromStr;

use serde::Serialize;

use crate::error::AssocError;
use crate::util::math::harmonic_number;

/// Multiple-testing correction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AdjustMethod {
    Bonferroni,
    Holm,
    #[default]
    BenjaminiHochberg,
    BenjaminiYekutieli,
}

impl AdjustMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bonferroni => "Bonferroni",
            Self::Holm => "Holm",
            Self::BenjaminiHochberg => "FDR",
            Self::BenjaminiYekutieli => "FDR_BY",
        }
    }
}

impl FromStr for AdjustMethod {
    type Err = AssocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bonferroni" => Ok(Self::Bonferroni),
            "holm" | "bonferroni-holm" => Ok(Self::Holm),
            "fdr" | "bh" | "benjamini-hochberg" => Ok(Self::BenjaminiHochberg),
            "fdr_by" | "by" | "benjamini-yekutieli" => Ok(Self::BenjaminiYekutieli),
            _ => Err(AssocError::UnknownSelector {
                kind: "adjustment method",
                name: s.to_string(),
                expected: "Bonferroni, Holm, FDR, FDR_BY",
            }),
        }
    }
}

/// Adjust `pvalues` for multiple testing.
///
/// Returns a vector of the same length whose i-th entry is the adjusted
/// value of `pvalues[i]`. An empty input yields an empty output.
pub fn adjust_pvalues(pvalues: &[f64], method: AdjustMethod) -> Vec<f64> {
    let n = pvalues.len();
    if n == 0 {
        return Vec::new();
    }
    let n_f = n as f64;

    match method {
        AdjustMethod::Bonferroni => pvalues.iter().map(|&p| (p * n_f).min(1.0)).collect(),
        AdjustMethod::Holm => {
            let order = rank_ascending(pvalues);
            let raw: Vec<f64> = order
                .iter()
                .enumerate()
                .map(|(rank, &i)| (n - rank) as f64 * pvalues[i])
                .collect();
            enforce_monotone(&order, &raw, n, f64::max)
        }
        AdjustMethod::BenjaminiHochberg => {
            let order = rank_descending(pvalues);
            let raw: Vec<f64> = order
                .iter()
                .enumerate()
                .map(|(rank, &i)| n_f * pvalues[i] / (n - rank) as f64)
                .collect();
            enforce_monotone(&order, &raw, n, f64::min)
        }
        AdjustMethod::BenjaminiYekutieli => {
            let q = harmonic_number(n);
            let order = rank_descending(pvalues);
            let raw: Vec<f64> = order
                .iter()
                .enumerate()
                .map(|(rank, &i)| q * pvalues[i] * n_f / (n - rank) as f64)
                .collect();
            enforce_monotone(&order, &raw, n, f64::min)
        }
    }
}

/// Indices sorted by (p, index) ascending.
fn rank_ascending(pvalues: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pvalues.len()).collect();
    order.sort_by(|&a, &b| pvalues[a].total_cmp(&pvalues[b]).then(a.cmp(&b)));
    order
}

/// Indices sorted by (p, index) descending.
fn rank_descending(pvalues: &[f64]) -> Vec<usize> {
    let mut order = rank_ascending(pvalues);
    order.reverse();
    order
}

/// Walk ranks in order, combining each raw value with the previous rank's
/// adjusted value via `step`, and cap at 1.
///
/// `raw[rank]` belongs to input index `order[rank]`.
fn enforce_monotone(
    order: &[usize],
    raw: &[f64],
    n: usize,
    step: fn(f64, f64) -> f64,
) -> Vec<f64> {
    let mut adjusted = vec![1.0; n];
    let mut prev: Option<f64> = None;
    for (&i, &r) in order.iter().zip(raw.iter()) {
        let value = match prev {
            Some(p) => step(r, p).min(1.0),
            None => r.min(1.0),
        };
        adjusted[i] = value;
        prev = Some(value);
    }
    adjusted
}
