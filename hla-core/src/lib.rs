//! hla-core: Statistical engine for HLA case/control association
//!
//! Implements 2x2 and 2 x m contingency tests (Pearson chi-squared,
//! Fisher's exact), odds ratios with confidence intervals, per-gene
//! multiple-testing correction, label-permutation empirical p-values and
//! the per-gene score statistic. Undefined statistics are carried as
//! `Value::Na` rather than raised.

pub mod assoc;
pub mod error;
pub mod stats;
pub mod util;

pub use error::AssocError;
pub use util::value::Value;
