//! Contingency-table statistics and multiple-testing correction.

pub mod adjust;
pub mod chisq;
pub mod exact;
pub mod odds_ratio;

use std::str::FromStr;

use serde::Serialize;

use crate::error::AssocError;
use crate::util::value::Value;

use self::chisq::chi2_contingency;
use self::exact::fisher_exact;
use self::odds_ratio::odds_ratio_ci;

/// A 2x2 allele table:
/// ```text
///            allele   other
///   cases      n1       n2
///   controls   n3       n4
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    pub n1: u64,
    pub n2: u64,
    pub n3: u64,
    pub n4: u64,
}

impl ContingencyTable {
    pub fn new(n1: u64, n2: u64, n3: u64, n4: u64) -> Self {
        Self { n1, n2, n3, n4 }
    }

    /// Build the table for an allele from its counts and gene totals.
    ///
    /// A count above its gene total means the counts were not produced
    /// per gene and is rejected.
    pub fn from_counts(
        case: u64,
        case_total: u64,
        ctrl: u64,
        ctrl_total: u64,
    ) -> Result<Self, AssocError> {
        let rest = |count: u64, total: u64| {
            total
                .checked_sub(count)
                .ok_or(AssocError::CountExceedsTotal { count, total })
        };
        Ok(Self::new(case, rest(case, case_total)?, ctrl, rest(ctrl, ctrl_total)?))
    }

    pub fn cells(&self) -> [u64; 4] {
        [self.n1, self.n2, self.n3, self.n4]
    }

    pub fn has_zero_cell(&self) -> bool {
        self.cells().contains(&0)
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        vec![
            vec![self.n1 as f64, self.n2 as f64],
            vec![self.n3 as f64, self.n4 as f64],
        ]
    }
}

/// Which test supplies the primary p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TestMethod {
    /// Pearson's chi-squared test (Yates-corrected on 2x2 tables).
    #[default]
    ChiSquare,
    /// Fisher's exact test.
    Fisher,
}

impl TestMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChiSquare => "chisq",
            Self::Fisher => "fisher",
        }
    }
}

impl FromStr for TestMethod {
    type Err = AssocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chisq" | "chi2" | "chisquare" => Ok(Self::ChiSquare),
            "fisher" | "exact" => Ok(Self::Fisher),
            _ => Err(AssocError::UnknownSelector {
                kind: "test",
                name: s.to_string(),
                expected: "chisq, fisher",
            }),
        }
    }
}

/// All statistics computed for one 2x2 table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableStats {
    /// Primary p-value of the selected test.
    pub pvalue: Value,
    /// Chi-squared statistic (NA under Fisher mode).
    pub chi2: Value,
    /// Degrees of freedom (NA under Fisher mode).
    pub dof: Value,
    /// Fisher exact p-value, computed under both modes.
    pub fisher_pvalue: Value,
    pub odds_ratio: Value,
    pub ci_lower: Value,
    pub ci_upper: Value,
}

/// Evaluate a 2x2 table under `method`.
pub fn evaluate_table(table: &ContingencyTable, method: TestMethod) -> TableStats {
    let fisher = fisher_exact(table);
    let or = odds_ratio_ci(table);
    let (pvalue, chi2, dof) = match method {
        TestMethod::ChiSquare => {
            let chi = chi2_contingency(&table.rows());
            (chi.pvalue, chi.statistic, chi.dof)
        }
        TestMethod::Fisher => (fisher.pvalue, Value::Na, Value::Na),
    };
    TableStats {
        pvalue,
        chi2,
        dof,
        fisher_pvalue: fisher.pvalue,
        odds_ratio: or.or,
        ci_lower: or.lower,
        ci_upper: or.upper,
    }
}

/// Primary p-value only; used when recomputing permuted tables.
pub fn table_pvalue(table: &ContingencyTable, method: TestMethod) -> Value {
    match method {
        TestMethod::ChiSquare => chi2_contingency(&table.rows()).pvalue,
        TestMethod::Fisher => fisher_exact(table).pvalue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_counts() {
        let t = ContingencyTable::from_counts(10, 15, 3, 15).unwrap();
        assert_eq!(t.cells(), [10, 5, 3, 12]);
        assert!(!t.has_zero_cell());
        assert!(ContingencyTable::from_counts(4, 4, 1, 9).unwrap().has_zero_cell());
    }

    #[test]
    fn test_from_counts_rejects_count_above_total() {
        assert_eq!(
            ContingencyTable::from_counts(4, 2, 1, 4),
            Err(AssocError::CountExceedsTotal { count: 4, total: 2 })
        );
        assert_eq!(
            ContingencyTable::from_counts(1, 4, 5, 3),
            Err(AssocError::CountExceedsTotal { count: 5, total: 3 })
        );
    }

    #[test]
    fn test_evaluate_chisq_mode() {
        let t = ContingencyTable::new(10, 5, 3, 12);
        let s = evaluate_table(&t, TestMethod::ChiSquare);
        assert!((s.pvalue.get().unwrap() - 0.027061581911647137).abs() < 1e-6);
        assert_eq!(s.dof, Value::Num(1.0));
        assert!((s.fisher_pvalue.get().unwrap() - 0.02532768703367596).abs() < 1e-9);
        assert_eq!(s.odds_ratio, Value::Num(8.0));
        assert_eq!(s.pvalue, table_pvalue(&t, TestMethod::ChiSquare));
    }

    #[test]
    fn test_evaluate_fisher_mode() {
        let t = ContingencyTable::new(10, 5, 3, 12);
        let s = evaluate_table(&t, TestMethod::Fisher);
        assert_eq!(s.pvalue, s.fisher_pvalue);
        assert!(s.chi2.is_na() && s.dof.is_na());
        assert_eq!(s.pvalue, table_pvalue(&t, TestMethod::Fisher));
    }

    #[test]
    fn test_degenerate_table_is_na_not_error() {
        let t = ContingencyTable::new(0, 10, 0, 12);
        let s = evaluate_table(&t, TestMethod::ChiSquare);
        assert!(s.pvalue.is_na());
        assert!(s.odds_ratio.is_na() && s.ci_lower.is_na() && s.ci_upper.is_na());
        assert_eq!(s.fisher_pvalue, Value::Num(1.0));
    }

    #[test]
    fn test_method_names() {
        assert_eq!("chisq".parse::<TestMethod>().unwrap(), TestMethod::ChiSquare);
        assert_eq!("Fisher".parse::<TestMethod>().unwrap(), TestMethod::Fisher);
        assert!("t-test".parse::<TestMethod>().is_err());
    }
}
