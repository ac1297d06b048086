//! Biosignal-Core: synthetic physiological signals under simulated sensor degradation
//!
//! This library drives driving-simulator experiments that record heart rate,
//! heart-rate variability and electrodermal activity alongside a per-tick
//! risk proxy. It features:
//!
//! - A risk-driven physiological signal generator with drifting HR/EDA state
//! - A degradation pipeline: latency buffering, sample dropout, Gaussian noise
//! - A grid runner over town, weather, latency, missing-rate and noise conditions
//! - Layered TOML configuration and structured logging
//!
//! # Quick Start
//!
//! ```rust
//! use biosignal_core::degradation::{DegradationConfig, DegradationPipeline};
//! use biosignal_core::signal::SignalGenerator;
//!
//! let mut generator = SignalGenerator::from_seed(7);
//! let mut pipeline = DegradationPipeline::builder(DegradationConfig::new(0.6, 0.2, 0.1))
//!     .seed(7)
//!     .build();
//!
//! for risk in [0.1, 0.4, 0.9] {
//!     let recorded = pipeline.apply(generator.step(risk));
//!     println!("HR={:.1} HRV={:.1} EDA={:.2}", recorded.hr, recorded.hrv, recorded.eda);
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod degradation;
pub mod error;
pub mod experiment;
pub mod observe;
pub mod signal;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{ConfigLoader, ExperimentConfig};
pub use degradation::{DegradationConfig, DegradationPipeline, MissingPolicy};
pub use error::{BioError, BioResult};
pub use experiment::{ExperimentGrid, SimulationEnvironment, SyntheticEnvironment};
pub use signal::{Sample, SignalGenerator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
