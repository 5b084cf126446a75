//! Association pipeline configuration.

use std::collections::BTreeSet;

use hla_geno::{AlleleId, EncodingModel};

use crate::error::AssocError;
use crate::stats::adjust::AdjustMethod;
use crate::stats::TestMethod;

use super::permutation::PermutationConfig;

/// Configuration shared by the association pipelines.
#[derive(Debug, Clone)]
pub struct AssocConfig {
    /// Alleles are tested only when their combined frequency exceeds this.
    pub freq: f64,
    /// Test supplying the primary p-value.
    pub test: TestMethod,
    /// Genotype encoding passed to the counter.
    pub model: EncodingModel,
    /// Per-gene multiple-testing correction.
    pub adjust: AdjustMethod,
    /// Alleles never tested.
    pub exclude: BTreeSet<AlleleId>,
    /// Empirical p-values by label permutation, when set.
    pub permutation: Option<PermutationConfig>,
}

impl Default for AssocConfig {
    fn default() -> Self {
        Self {
            freq: 0.0,
            test: TestMethod::ChiSquare,
            model: EncodingModel::Allelic,
            adjust: AdjustMethod::BenjaminiHochberg,
            exclude: BTreeSet::new(),
            permutation: None,
        }
    }
}

impl AssocConfig {
    /// Reject configurations that cannot produce meaningful results.
    pub fn validate(&self) -> Result<(), AssocError> {
        if !(0.0..1.0).contains(&self.freq) {
            return Err(AssocError::InvalidConfig(format!(
                "frequency threshold must be in [0, 1), got {}",
                self.freq
            )));
        }
        if let Some(perm) = &self.permutation {
            perm.validate()?;
        }
        Ok(())
    }
}

/// Parse an encoding model selector (`allelic`, `dom`, `rec`).
pub fn parse_model(name: &str) -> Result<EncodingModel, AssocError> {
    EncodingModel::from_name(name).ok_or_else(|| AssocError::UnknownSelector {
        kind: "model",
        name: name.to_string(),
        expected: "allelic, dom, rec",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AssocConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_frequency() {
        for freq in [-0.1, 1.0, f64::NAN] {
            let config = AssocConfig {
                freq,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(AssocError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_invalid_permutation_count() {
        let config = AssocConfig {
            permutation: Some(PermutationConfig::new(0, 1)),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_model() {
        assert_eq!(parse_model("rec").unwrap(), EncodingModel::Recessive);
        let err = parse_model("additive").unwrap_err();
        assert!(err.to_string().contains("additive"));
    }
}
