//! Shared numeric helpers.

pub mod math;
pub mod value;

pub use value::Value;
