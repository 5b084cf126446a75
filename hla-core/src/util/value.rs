//! NA-tagged numeric values.
//!
//! Statistics that cannot be computed (division by zero, log of a
//! non-positive number, degenerate tables) are carried as [`Value::Na`]
//! through every downstream computation instead of being coerced to zero.

use std::fmt;

use serde::{Serialize, Serializer};

/// A number, or the "not available" marker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    Num(f64),
    #[default]
    Na,
}

impl Value {
    /// Wrap `x`, mapping NaN and infinities to `Na`.
    pub fn finite(x: f64) -> Self {
        if x.is_finite() {
            Value::Num(x)
        } else {
            Value::Na
        }
    }

    pub fn is_na(&self) -> bool {
        matches!(self, Value::Na)
    }

    pub fn get(&self) -> Option<f64> {
        match *self {
            Value::Num(x) => Some(x),
            Value::Na => None,
        }
    }

    /// Apply `f`, keeping `Na` and catching non-finite results.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Value::Num(x) => Value::finite(f(x)),
            Value::Na => Value::Na,
        }
    }

    pub fn and_then(self, f: impl FnOnce(f64) -> Value) -> Self {
        match self {
            Value::Num(x) => f(x),
            Value::Na => Value::Na,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::finite(x)
    }
}

impl From<Option<f64>> for Value {
    fn from(x: Option<f64>) -> Self {
        x.map_or(Value::Na, Value::finite)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(x) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, x),
                None => write!(f, "{}", x),
            },
            Value::Na => write!(f, "NA"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Num(x) => serializer.serialize_some(x),
            Value::Na => serializer.serialize_none(),
        }
    }
}
