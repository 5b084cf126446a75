//! Case/control association pipelines.
//!
//! Per-allele 2x2 tests with per-gene p-value adjustment, gene-level 2 x m
//! tests, the per-gene score statistic U, and permutation-based empirical
//! p-values shared by the first two.

pub mod allele;
pub mod config;
pub mod frequency;
pub mod output;
pub mod permutation;
pub mod raw;
pub mod score_u;

pub use allele::{assoc_alleles, AlleleAssociation, AlleleResult};
pub use config::{parse_model, AssocConfig};
pub use permutation::{EmpiricalPValue, PermutationConfig, PermutationTally};
pub use raw::{assoc_raw, GeneAssociation, GeneResult};
pub use score_u::{assoc_score_u, score_u};
