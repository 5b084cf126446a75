//! Mathematical utility functions.

use statrs::function::factorial::ln_factorial;

use super::value::Value;

/// Harmonic number H(n) = sum_{k=1}^{n} 1/k.
pub fn harmonic_number(n: usize) -> f64 {
    (1..=n).map(|k| 1.0 / k as f64).sum()
}

/// Log of binomial coefficient: ln(C(n, k)).
pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)
}

/// Safe log: NA for x <= 0.
pub fn safe_ln(x: f64) -> Value {
    if x > 0.0 {
        Value::finite(x.ln())
    } else {
        Value::Na
    }
}

/// Safe division: NA when the denominator is zero.
pub fn safe_div(num: f64, den: f64) -> Value {
    if den != 0.0 {
        Value::finite(num / den)
    } else {
        Value::Na
    }
}
