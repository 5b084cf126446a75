//! Pearson's chi-squared test of independence for r x c tables.
//!
//!   E_ij = R_i * C_j / N
//!   X^2  = sum_ij (O_ij - E_ij)^2 / E_ij,  df = (r - 1)(c - 1)
//!
//! Tables with one degree of freedom get Yates' continuity correction:
//! each observed cell moves toward its expectation by at most 0.5.
//! A zero expected cell, or an empty or ragged table, makes every field NA.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::util::value::Value;

/// Result of a chi-squared contingency test.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquareResult {
    pub statistic: Value,
    pub pvalue: Value,
    pub dof: Value,
    /// Expected counts under independence (empty when undefined).
    pub expected: Vec<Vec<f64>>,
}

impl ChiSquareResult {
    fn undefined() -> Self {
        Self {
            statistic: Value::Na,
            pvalue: Value::Na,
            dof: Value::Na,
            expected: Vec::new(),
        }
    }
}

/// Chi-squared test of independence over `rows` (each row one group).
pub fn chi2_contingency(rows: &[Vec<f64>]) -> ChiSquareResult {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, |r| r.len());
    if nrows == 0 || ncols == 0 || rows.iter().any(|r| r.len() != ncols) {
        return ChiSquareResult::undefined();
    }

    let row_sums: Vec<f64> = rows.iter().map(|r| r.iter().sum()).collect();
    let col_sums: Vec<f64> = (0..ncols)
        .map(|j| rows.iter().map(|r| r[j]).sum())
        .collect();
    let total: f64 = row_sums.iter().sum();

    let expected: Vec<Vec<f64>> = row_sums
        .iter()
        .map(|&rs| col_sums.iter().map(|&cs| rs * cs / total).collect())
        .collect();
    if expected.iter().flatten().any(|&e| !(e > 0.0)) {
        return ChiSquareResult::undefined();
    }

    let dof = (nrows - 1) * (ncols - 1);
    if dof == 0 {
        return ChiSquareResult {
            statistic: Value::Num(0.0),
            pvalue: Value::Num(1.0),
            dof: Value::Num(0.0),
            expected,
        };
    }

    let mut statistic = 0.0;
    for (row, exp_row) in rows.iter().zip(expected.iter()) {
        for (&o, &e) in row.iter().zip(exp_row.iter()) {
            let o = if dof == 1 { yates_corrected(o, e) } else { o };
            statistic += (o - e) * (o - e) / e;
        }
    }

    let pvalue = match ChiSquared::new(dof as f64) {
        Ok(dist) => Value::finite(dist.sf(statistic).clamp(0.0, 1.0)),
        Err(_) => Value::Na,
    };

    ChiSquareResult {
        statistic: Value::finite(statistic),
        pvalue,
        dof: Value::Num(dof as f64),
        expected,
    }
}

/// Move `observed` toward `expected` by at most 0.5.
fn yates_corrected(observed: f64, expected: f64) -> f64 {
    let diff = expected - observed;
    observed + diff.abs().min(0.5) * diff.signum()
}
