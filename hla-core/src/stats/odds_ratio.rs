//! Odds ratio with Woolf's 95% confidence interval.
//!
//!   OR = n1 n4 / (n2 n3)
//!   se = sqrt(1/n1 + 1/n2 + 1/n3 + 1/n4)
//!   CI = exp(ln OR -/+ 1.96 se)

use crate::util::math::safe_ln;
use crate::util::value::Value;

use super::ContingencyTable;

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// Odds ratio and its 95% confidence bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsRatio {
    pub or: Value,
    pub lower: Value,
    pub upper: Value,
}

/// Odds ratio with confidence interval.
///
/// Any zero cell leaves the standard error or the log undefined, so the
/// ratio and both bounds are NA.
pub fn odds_ratio_ci(table: &ContingencyTable) -> OddsRatio {
    if table.has_zero_cell() {
        return OddsRatio {
            or: Value::Na,
            lower: Value::Na,
            upper: Value::Na,
        };
    }
    let [n1, n2, n3, n4] = table.cells().map(|c| c as f64);
    let or = Value::finite((n1 * n4) / (n2 * n3));
    let se = (1.0 / n1 + 1.0 / n2 + 1.0 / n3 + 1.0 / n4).sqrt();
    let ln_or = or.and_then(safe_ln);

    OddsRatio {
        or,
        lower: ln_or.map(|l| (l - Z_95 * se).exp()),
        upper: ln_or.map(|l| (l + Z_95 * se).exp()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odds_ratio_ci() {
        let r = odds_ratio_ci(&ContingencyTable::new(10, 5, 3, 12));
        assert_eq!(r.or, Value::Num(8.0));
        let se = (1.0 / 10.0 + 1.0 / 5.0 + 1.0 / 3.0 + 1.0 / 12.0_f64).sqrt();
        let lower = r.lower.get().unwrap();
        let upper = r.upper.get().unwrap();
        assert!((lower - (8.0_f64.ln() - 1.96 * se).exp()).abs() < 1e-12);
        assert!((upper - (8.0_f64.ln() + 1.96 * se).exp()).abs() < 1e-12);
        assert!(lower < 8.0 && 8.0 < upper);
    }

    #[test]
    fn test_ci_is_symmetric_on_log_scale() {
        let r = odds_ratio_ci(&ContingencyTable::new(4, 16, 9, 11));
        let or = r.or.get().unwrap();
        let lower = r.lower.get().unwrap();
        let upper = r.upper.get().unwrap();
        assert!(((or.ln() - lower.ln()) - (upper.ln() - or.ln())).abs() < 1e-12);
    }

    #[test]
    fn test_zero_cell_is_na() {
        for table in [
            ContingencyTable::new(0, 5, 3, 12),
            ContingencyTable::new(10, 0, 3, 12),
            ContingencyTable::new(10, 5, 0, 12),
            ContingencyTable::new(10, 5, 3, 0),
        ] {
            let r = odds_ratio_ci(&table);
            assert!(r.or.is_na() && r.lower.is_na() && r.upper.is_na());
        }
    }
}
