//! Typed errors raised by the association engine.
//!
//! Undefined statistics are never errors; they are carried as
//! [`Value::Na`](crate::util::value::Value::Na).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssocError {
    #[error("Unknown {kind} '{name}' (expected one of: {expected})")]
    UnknownSelector {
        kind: &'static str,
        name: String,
        expected: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Allele count {count} exceeds its gene total {total}")]
    CountExceedsTotal { count: u64, total: u64 },

    #[error("Permutation exhausted: only {valid} valid draws after {attempts} attempts")]
    PermutationExhausted { valid: usize, attempts: usize },
}
