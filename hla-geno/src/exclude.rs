//! Allele exclusion list reader.
//!
//! One allele per line; blank lines and `#` comments are ignored:
//! ```text
//! # rare or poorly typed alleles
//! A*02:05
//! DRB1*04:03
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::allele::AlleleId;

/// Read an exclusion list from `path`.
pub fn read_exclusion_list<P: AsRef<Path>>(path: P) -> Result<BTreeSet<AlleleId>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read exclusion list: {}", path.display()))?;
    parse_exclusion_list(&contents)
        .with_context(|| format!("Invalid exclusion list: {}", path.display()))
}

/// Parse exclusion list contents.
pub fn parse_exclusion_list(contents: &str) -> Result<BTreeSet<AlleleId>> {
    contents
        .lines()
        .map(|l| l.trim())
        .enumerate()
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
        .map(|(i, l)| {
            l.parse::<AlleleId>()
                .with_context(|| format!("line {}", i + 1))
        })
        .collect()
}
