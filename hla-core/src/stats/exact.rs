//! Fisher's exact test for 2x2 tables.
//!
//! For the table
//! ```text
//!            allele   other
//!   cases      n1       n2
//!   controls   n3       n4
//! ```
//! the count n1 is hypergeometric given the margins. The two-sided p-value
//! sums P(X = k) over every k no more likely than the observed table.

use crate::util::math::ln_choose;
use crate::util::value::Value;

use super::ContingencyTable;

/// Relative tolerance when comparing table probabilities.
const REL_TOL: f64 = 1e-7;

/// Result of Fisher's exact test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FisherResult {
    /// Two-sided p-value.
    pub pvalue: Value,
}

/// Fisher's exact test.
///
/// A table with an empty row or column has p = 1.
pub fn fisher_exact(table: &ContingencyTable) -> FisherResult {
    let ContingencyTable { n1, n2, n3, n4 } = *table;
    let row1 = n1 + n2;
    let col1 = n1 + n3;
    let total = n1 + n2 + n3 + n4;
    if row1 == 0 || col1 == 0 || row1 == total || col1 == total {
        return FisherResult { pvalue: Value::Num(1.0) };
    }

    let p_observed = hypergeom_pmf(n1, total, col1, row1);

    let min_k = row1.saturating_sub(total - col1);
    let max_k = row1.min(col1);

    let mut pvalue = 0.0;
    for k in min_k..=max_k {
        let p_k = hypergeom_pmf(k, total, col1, row1);
        if p_k <= p_observed * (1.0 + REL_TOL) {
            pvalue += p_k;
        }
    }

    FisherResult {
        pvalue: Value::finite(pvalue.min(1.0)),
    }
}

/// Hypergeometric PMF: P(X = k | N, K, n)
fn hypergeom_pmf(k: u64, n_total: u64, n_success: u64, n_draws: u64) -> f64 {
    let log_p = ln_choose(n_success, k) + ln_choose(n_total - n_success, n_draws - k)
        - ln_choose(n_total, n_draws);
    log_p.exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: Value) -> f64 {
        v.get().expect("expected a number")
    }

    #[test]
    fn test_hypergeom_pmf_sums_to_one() {
        let total: f64 = (0..=5).map(|k| hypergeom_pmf(k, 10, 5, 5)).sum();
        assert!((total - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_fisher_known_values() {
        let r = fisher_exact(&ContingencyTable::new(1, 9, 11, 3));
        assert!((num(r.pvalue) - 0.002759456185220082).abs() < 1e-9);

        let r = fisher_exact(&ContingencyTable::new(10, 5, 3, 12));
        assert!((num(r.pvalue) - 0.02532768703367596).abs() < 1e-9);
    }

    #[test]
    fn test_fisher_symmetric_table() {
        let r = fisher_exact(&ContingencyTable::new(5, 5, 5, 5));
        assert!((num(r.pvalue) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fisher_zero_cells() {
        let r = fisher_exact(&ContingencyTable::new(10, 0, 0, 10));
        assert!(num(r.pvalue) < 1e-4);

        // empty column margin
        let r = fisher_exact(&ContingencyTable::new(0, 5, 0, 7));
        assert_eq!(r.pvalue, Value::Num(1.0));

        let r = fisher_exact(&ContingencyTable::new(0, 0, 0, 0));
        assert_eq!(r.pvalue, Value::Num(1.0));
    }
}
