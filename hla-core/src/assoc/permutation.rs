//! Empirical p-values by case/control label permutation.
//!
//! One ChaCha8 stream is seeded before the loop and drives every draw.
//! A draw is valid only if every allele tested in the observed data is
//! present in both permuted cohorts; invalid draws are discarded without
//! touching any tally. For each valid draw the permuted p-value of every
//! key is compared with the observed one:
//!   permuted or observed NA -> na
//!   permuted < observed     -> more_extreme
//!   otherwise               -> less_extreme
//! and after `n_perm` valid draws
//!   p_perm = (more_extreme + 1) / (n_perm + 1 - na)

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use hla_geno::{AlleleCounter, AlleleId, CohortCounts, EncodingModel};
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AssocError;
use crate::util::value::Value;

/// Minimum number of draws the default attempt budget allows.
const MIN_ATTEMPTS: usize = 1000;
/// Default attempt budget per requested valid draw.
const ATTEMPTS_PER_PERMUTATION: usize = 100;

/// Configuration for permutation testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationConfig {
    /// Number of valid permutations to collect.
    pub n_perm: usize,
    /// Seed for the single random stream.
    pub seed: u64,
    /// Total draws allowed, valid or not. `None` uses
    /// `max(1000, 100 * n_perm)`.
    pub max_attempts: Option<usize>,
}

impl PermutationConfig {
    pub fn new(n_perm: usize, seed: u64) -> Self {
        Self {
            n_perm,
            seed,
            max_attempts: None,
        }
    }

    pub fn attempt_budget(&self) -> usize {
        self.max_attempts.unwrap_or_else(|| {
            self.n_perm
                .saturating_mul(ATTEMPTS_PER_PERMUTATION)
                .max(MIN_ATTEMPTS)
        })
    }

    pub fn validate(&self) -> Result<(), AssocError> {
        if self.n_perm == 0 {
            return Err(AssocError::InvalidConfig(
                "number of permutations must be positive".into(),
            ));
        }
        if self.attempt_budget() < self.n_perm {
            return Err(AssocError::InvalidConfig(format!(
                "max attempts ({}) is below the number of permutations ({})",
                self.attempt_budget(),
                self.n_perm
            )));
        }
        Ok(())
    }
}

/// Running comparison counts for one allele or gene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PermutationTally {
    pub more_extreme: usize,
    pub na: usize,
    pub less_extreme: usize,
}

impl PermutationTally {
    /// Record one valid draw.
    pub fn record(&mut self, observed: Value, permuted: Value) {
        match (observed, permuted) {
            (_, Value::Na) | (Value::Na, _) => self.na += 1,
            (Value::Num(obs), Value::Num(p)) if p < obs => self.more_extreme += 1,
            _ => self.less_extreme += 1,
        }
    }

    /// Empirical p-value after `n_perm` valid draws.
    ///
    /// NA when the observed p-value is NA or every draw was NA.
    pub fn empirical_pvalue(&self, observed: Value, n_perm: usize) -> Value {
        if observed.is_na() || self.na >= n_perm {
            return Value::Na;
        }
        Value::finite((self.more_extreme + 1) as f64 / (n_perm + 1 - self.na) as f64)
    }
}

/// Empirical p-value with the tallies that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmpiricalPValue {
    pub pvalue: Value,
    pub more_extreme: usize,
    pub na: usize,
    pub less_extreme: usize,
}

impl EmpiricalPValue {
    pub fn from_tally(tally: &PermutationTally, observed: Value, n_perm: usize) -> Self {
        Self {
            pvalue: tally.empirical_pvalue(observed, n_perm),
            more_extreme: tally.more_extreme,
            na: tally.na,
            less_extreme: tally.less_extreme,
        }
    }
}

/// Tallies returned by [`run_permutations`].
#[derive(Debug, Clone)]
pub struct PermutationOutcome<K> {
    pub tallies: BTreeMap<K, PermutationTally>,
    /// Draws requested from the counter, including discarded ones.
    pub attempts: usize,
}

impl<K: Ord> PermutationOutcome<K> {
    /// Empirical p-value for `key`.
    pub fn empirical(&self, key: &K, observed: Value, n_perm: usize) -> Option<EmpiricalPValue> {
        self.tallies
            .get(key)
            .map(|t| EmpiricalPValue::from_tally(t, observed, n_perm))
    }
}

/// Progress is logged every `n_perm / 10` valid draws, at least every 2.
pub fn progress_cadence(n_perm: usize) -> usize {
    if n_perm > 10 {
        (n_perm / 10).max(2)
    } else {
        2
    }
}

/// Collect `config.n_perm` valid permutations.
///
/// `observed` maps each tracked key to its observed p-value; `recompute`
/// returns the p-value of a key for one permuted draw. Returns
/// [`AssocError::PermutationExhausted`] if the attempt budget runs out.
pub fn run_permutations<K, C, F>(
    counter: &C,
    model: EncodingModel,
    used: &BTreeSet<AlleleId>,
    observed: &BTreeMap<K, Value>,
    config: &PermutationConfig,
    mut recompute: F,
) -> Result<PermutationOutcome<K>>
where
    K: Ord + Clone,
    C: AlleleCounter + ?Sized,
    F: FnMut(&CohortCounts, &K) -> Result<Value>,
{
    config.validate()?;

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(config.seed);
    let mut tallies: BTreeMap<K, PermutationTally> = observed
        .keys()
        .map(|k| (k.clone(), PermutationTally::default()))
        .collect();

    let budget = config.attempt_budget();
    let cadence = progress_cadence(config.n_perm);
    let mut valid = 0;
    let mut attempts = 0;

    while valid < config.n_perm {
        if attempts >= budget {
            return Err(AssocError::PermutationExhausted { valid, attempts }.into());
        }
        attempts += 1;

        let draw = counter.permuted(model, &mut rng)?;
        if !draw.contains_all(used) {
            debug!("Discarding draw {}: tested alleles not reproduced", attempts);
            continue;
        }

        tally_draw(&mut tallies, observed, |key| recompute(&draw, key))?;
        valid += 1;

        if valid % cadence == 1 {
            info!("permutation {}/{} ...", valid, config.n_perm);
        }
    }

    debug!(
        "Collected {} valid permutations in {} attempts",
        valid, attempts
    );

    Ok(PermutationOutcome { tallies, attempts })
}

/// Fold one valid draw into the tallies.
fn tally_draw<K: Ord + Clone>(
    tallies: &mut BTreeMap<K, PermutationTally>,
    observed: &BTreeMap<K, Value>,
    mut permuted: impl FnMut(&K) -> Result<Value>,
) -> Result<()> {
    for (key, &obs) in observed {
        let p = permuted(key)?;
        tallies.entry(key.clone()).or_default().record(obs, p);
    }
    Ok(())
}
