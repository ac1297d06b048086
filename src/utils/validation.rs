//! Validation utilities for experiment configuration
//!
//! Range checks shared by the configuration loader. Each helper names the
//! offending field so a batch of failures can be reported together.

use thiserror::Error;

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of valid range
    #[error("Field '{field}' value '{value}' is out of range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },
    /// List that must hold at least one entry is empty
    #[error("Field '{0}' must not be empty")]
    EmptyList(String),
    /// NaN or infinite value
    #[error("Field '{field}' value '{value}' is not finite")]
    NotFinite { field: String, value: String },
    /// Custom validation failure
    #[error("{0}")]
    Custom(String),
}

pub fn validate_non_empty<T>(field: &str, values: &[T]) -> ValidationResult<()> {
    if values.is_empty() {
        return Err(ValidationError::EmptyList(field.to_string()));
    }
    Ok(())
}

pub fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Finite and within `[min, max]`
pub fn validate_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    validate_finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    validate_range(field, value, 0.0, f64::MAX)
}

pub fn validate_positive(field: &str, value: f64) -> ValidationResult<()> {
    validate_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min: "(0".to_string(),
            max: "inf)".to_string(),
        });
    }
    Ok(())
}

pub fn validate_probability(field: &str, value: f64) -> ValidationResult<()> {
    validate_range(field, value, 0.0, 1.0)
}

/// Run `check` over every element, collecting failures as `field[i]`
pub fn validate_each(
    field: &str,
    values: &[f64],
    check: impl Fn(&str, f64) -> ValidationResult<()>,
) -> Vec<ValidationError> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, &value)| check(&format!("{field}[{i}]"), value).err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_bounds() {
        assert!(validate_probability("grid.missing_rates", 0.0).is_ok());
        assert!(validate_probability("grid.missing_rates", 1.0).is_ok());
        assert!(validate_probability("grid.missing_rates", 1.2).is_err());
        assert!(validate_probability("grid.missing_rates", -0.1).is_err());
        assert!(matches!(
            validate_probability("grid.missing_rates", f64::NAN),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_positive() {
        assert!(validate_positive("signal.sample_rate_hz", 20.0).is_ok());
        assert!(validate_positive("signal.sample_rate_hz", 0.0).is_err());
        assert!(validate_positive("signal.sample_rate_hz", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_each_names_indices() {
        let errors = validate_each("grid.latencies", &[0.0, -1.0, 0.6, f64::NAN], validate_non_negative);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().contains("grid.latencies[1]"));
        assert!(errors[1].to_string().contains("grid.latencies[3]"));
    }

    #[test]
    fn test_non_empty() {
        assert!(validate_non_empty::<f64>("grid.noise_stds", &[]).is_err());
        assert!(validate_non_empty("grid.noise_stds", &[0.0]).is_ok());
    }
}
