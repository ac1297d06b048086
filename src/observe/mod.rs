//! Observability: logging setup for the experiment runner

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
