//! Parsed HLA allele identifiers.
//!
//! Alleles are written `GENE*variant` (e.g. `A*02:01`, `DRB1*15:01:01`).
//! The gene and variant are split once at ingestion so that grouping by
//! gene never relies on string prefixes (`DRB1` must not claim `DRB10*01`).

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Serialize, Serializer};

/// Separator between gene and variant.
pub const GENE_SEPARATOR: char = '*';

/// An allele identifier with explicit gene and variant components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlleleId {
    /// Gene (locus) name, e.g. `A`, `DRB1`.
    pub gene: String,
    /// Variant within the gene, e.g. `02:01`.
    pub variant: String,
}

impl AlleleId {
    pub fn new(gene: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            gene: gene.into(),
            variant: variant.into(),
        }
    }

    /// Parse `token` as an allele, falling back to `default_gene` when the
    /// token carries no gene prefix (genotype columns often hold bare variants).
    pub fn parse_with_gene(token: &str, default_gene: &str) -> Result<Self> {
        match token.split_once(GENE_SEPARATOR) {
            Some(_) => token.parse(),
            None if !default_gene.is_empty() && !token.is_empty() => {
                Ok(Self::new(default_gene, token))
            }
            None => bail!("Allele '{}' has no gene prefix", token),
        }
    }

    /// Truncate the variant to `digits` of resolution.
    ///
    /// Colon-separated names keep `digits / 2` fields; compact names keep the
    /// first `digits` characters. Shorter variants are returned unchanged.
    pub fn at_resolution(&self, digits: usize) -> Self {
        let variant = if self.variant.contains(':') {
            let fields = (digits / 2).max(1);
            self.variant
                .split(':')
                .take(fields)
                .collect::<Vec<_>>()
                .join(":")
        } else {
            self.variant.chars().take(digits.max(1)).collect()
        };
        Self::new(self.gene.clone(), variant)
    }
}

impl fmt::Display for AlleleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.gene, GENE_SEPARATOR, self.variant)
    }
}

impl FromStr for AlleleId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(GENE_SEPARATOR) {
            Some((gene, variant)) if !gene.is_empty() && !variant.is_empty() => {
                Ok(Self::new(gene, variant))
            }
            _ => bail!("Invalid allele identifier '{}': expected GENE*variant", s),
        }
    }
}

impl Serialize for AlleleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
