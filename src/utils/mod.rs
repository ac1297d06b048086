//! Utility modules shared across the crate

pub mod validation;

pub use validation::{ValidationError, ValidationResult};
