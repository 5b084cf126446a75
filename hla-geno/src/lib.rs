//! hla-geno: HLA genotype input for case/control association
//!
//! Provides parsed allele identifiers, the `AlleleCounter` trait consumed
//! by the association engine, a genotype-table implementation with
//! allelic/dominant/recessive counting and label permutation, and the
//! exclusion-list reader.

pub mod allele;
pub mod exclude;
pub mod genotype;
pub mod traits;

pub use allele::AlleleId;
pub use genotype::GenotypeTable;
pub use traits::{AlleleCounter, CohortCounts, EncodingModel};
