// src/error.rs
//! Unified error handling for the experiment driver
//!
//! Signal generation and degradation are total and never fail. Everything
//! around them (configuration, the simulation environment, recording to disk)
//! reports through [`BioError`] so the grid runner can log a failed case and
//! move on to the next one.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for the experiment driver
#[derive(Debug, Error)]
pub enum BioError {
    /// Inconsistent or unsupported settings
    #[error("[CONFIG] Configuration error in {component}: {reason}")]
    Configuration { component: String, reason: String },

    /// Configuration file could not be loaded
    #[error("[CONFIG] {0}")]
    Config(#[from] ConfigError),

    /// Filesystem failures while preparing output or saving snapshots
    #[error("[IO] {operation} failed for {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tabular record sink failure
    #[error("[SINK] Record sink error: {0}")]
    Sink(#[from] csv::Error),

    /// Manifest serialization failure
    #[error("[SERIALIZE] Manifest serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure reported by the simulation environment
    #[error("[ENV] Simulation environment error during {operation}: {reason}")]
    Environment { operation: String, reason: String },
}

/// Result type alias for driver operations
pub type BioResult<T> = Result<T, BioError>;

impl BioError {
    pub fn configuration(component: &str, reason: impl Into<String>) -> Self {
        BioError::Configuration {
            component: component.to_string(),
            reason: reason.into(),
        }
    }

    pub fn environment(operation: &str, reason: impl Into<String>) -> Self {
        BioError::Environment {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BioError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Convenience trait for mapping foreign errors raised inside an environment
pub trait IntoBioError<T> {
    fn bio_err(self, operation: &str) -> BioResult<T>;
}

impl<T, E> IntoBioError<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn bio_err(self, operation: &str) -> BioResult<T> {
        self.map_err(|err| BioError::environment(operation, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BioError::io(
            "create result directory",
            "/nonexistent/results",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );

        let display = err.to_string();
        assert!(display.contains("[IO]"));
        assert!(display.contains("/nonexistent/results"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn test_error_source_preserved() {
        use std::error::Error;

        let err = BioError::io(
            "write snapshot",
            "a.ppm",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BioError>();
    }

    #[test]
    fn test_into_bio_error_trait() {
        let result: Result<i32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "actor blueprint missing",
        ));

        match result.bio_err("begin_case").unwrap_err() {
            BioError::Environment { operation, reason } => {
                assert_eq!(operation, "begin_case");
                assert!(reason.contains("actor blueprint missing"));
            }
            other => panic!("Expected environment error, got {other:?}"),
        }
    }
}
