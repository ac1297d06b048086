// src/config/mod.rs
//! Experiment configuration: driver settings, condition grid, signal options

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use crate::degradation::MissingPolicy;
use crate::observe::LogConfig;
use crate::utils::validation::{
    validate_each, validate_finite, validate_non_empty, validate_non_negative, validate_positive,
    validate_probability, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete experiment configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub experiment: ExperimentSettings,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub signal: SignalSettings,
    #[serde(default)]
    pub logging: LogConfig,
}

/// Per-case driver settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExperimentSettings {
    #[serde(default = "defaults::result_dir")]
    pub result_dir: PathBuf,

    #[serde(default = "defaults::max_steps")]
    pub max_steps: u32,

    #[serde(default = "defaults::fixed_delta_seconds")]
    pub fixed_delta_seconds: f64,

    /// Snapshots are saved only on ticks with risk strictly above this
    #[serde(default = "defaults::risk_tau")]
    pub risk_tau: f64,

    #[serde(default = "defaults::max_images_per_case")]
    pub max_images_per_case: u32,

    /// Ticks before the camera delivers its first frame
    #[serde(default = "defaults::warmup_ticks")]
    pub warmup_ticks: u32,

    /// Master seed; every case derives its own seeds from it. Entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Sleep `fixed_delta_seconds` after every tick
    #[serde(default)]
    pub realtime: bool,
}

/// Enumerated experiment conditions. Cases are the cartesian product.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GridConfig {
    #[serde(default = "defaults::towns")]
    pub towns: Vec<String>,

    #[serde(default = "defaults::weathers")]
    pub weathers: Vec<String>,

    #[serde(default = "defaults::latencies")]
    pub latencies: Vec<f64>,

    #[serde(default = "defaults::missing_rates")]
    pub missing_rates: Vec<f64>,

    #[serde(default = "defaults::noise_stds")]
    pub noise_stds: Vec<f64>,
}

/// Where latency buffers live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyBufferScope {
    /// Fresh buffers for every case
    #[default]
    Case,
    /// Buffers persist across cases sharing a latency value
    Process,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SignalSettings {
    /// Stream rate used to convert latency seconds into buffer length
    #[serde(default = "defaults::sample_rate_hz")]
    pub sample_rate_hz: f64,

    #[serde(default)]
    pub missing_policy: MissingPolicy,

    #[serde(default)]
    pub latency_buffer_scope: LatencyBufferScope,
}

mod defaults {
    use crate::config::constants::*;
    use std::path::PathBuf;

    pub fn result_dir() -> PathBuf { PathBuf::from(experiment::DEFAULT_RESULT_DIR) }
    pub fn max_steps() -> u32 { experiment::DEFAULT_MAX_STEPS }
    pub fn fixed_delta_seconds() -> f64 { experiment::DEFAULT_FIXED_DELTA_SECONDS }
    pub fn risk_tau() -> f64 { experiment::DEFAULT_RISK_TAU }
    pub fn max_images_per_case() -> u32 { experiment::DEFAULT_MAX_IMAGES_PER_CASE }
    pub fn warmup_ticks() -> u32 { experiment::DEFAULT_WARMUP_TICKS }

    pub fn towns() -> Vec<String> { grid::DEFAULT_TOWNS.iter().map(|s| s.to_string()).collect() }
    pub fn weathers() -> Vec<String> { grid::DEFAULT_WEATHERS.iter().map(|s| s.to_string()).collect() }
    pub fn latencies() -> Vec<f64> { grid::DEFAULT_LATENCIES.to_vec() }
    pub fn missing_rates() -> Vec<f64> { grid::DEFAULT_MISSING_RATES.to_vec() }
    pub fn noise_stds() -> Vec<f64> { grid::DEFAULT_NOISE_STDS.to_vec() }

    pub fn sample_rate_hz() -> f64 { degradation::DEFAULT_SAMPLE_RATE_HZ }
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self {
            result_dir: defaults::result_dir(),
            max_steps: defaults::max_steps(),
            fixed_delta_seconds: defaults::fixed_delta_seconds(),
            risk_tau: defaults::risk_tau(),
            max_images_per_case: defaults::max_images_per_case(),
            warmup_ticks: defaults::warmup_ticks(),
            seed: None,
            realtime: false,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            towns: defaults::towns(),
            weathers: defaults::weathers(),
            latencies: defaults::latencies(),
            missing_rates: defaults::missing_rates(),
            noise_stds: defaults::noise_stds(),
        }
    }
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            sample_rate_hz: defaults::sample_rate_hz(),
            missing_policy: MissingPolicy::default(),
            latency_buffer_scope: LatencyBufferScope::default(),
        }
    }
}

impl GridConfig {
    /// Number of cases in the cartesian product
    pub fn total_cases(&self) -> usize {
        self.towns.len()
            * self.weathers.len()
            * self.latencies.len()
            * self.missing_rates.len()
            * self.noise_stds.len()
    }
}

impl ExperimentConfig {
    /// Check ranges and list sizes, reporting every failure
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let grid = &self.grid;

        errors.extend(validate_non_empty("grid.towns", &grid.towns).err());
        errors.extend(validate_non_empty("grid.weathers", &grid.weathers).err());
        errors.extend(validate_non_empty("grid.latencies", &grid.latencies).err());
        errors.extend(validate_non_empty("grid.missing_rates", &grid.missing_rates).err());
        errors.extend(validate_non_empty("grid.noise_stds", &grid.noise_stds).err());

        errors.extend(validate_each("grid.latencies", &grid.latencies, validate_non_negative));
        errors.extend(validate_each("grid.missing_rates", &grid.missing_rates, validate_probability));
        errors.extend(validate_each("grid.noise_stds", &grid.noise_stds, validate_non_negative));

        errors.extend(validate_positive("signal.sample_rate_hz", self.signal.sample_rate_hz).err());
        errors.extend(validate_finite("experiment.risk_tau", self.experiment.risk_tau).err());
        errors.extend(
            validate_non_negative("experiment.fixed_delta_seconds", self.experiment.fixed_delta_seconds).err(),
        );
        if self.experiment.max_steps == 0 {
            errors.push(ValidationError::Custom(
                "Field 'experiment.max_steps' must be greater than zero".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Command-line settings layered over a loaded configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub result_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub max_steps: Option<u32>,
    pub realtime: bool,
    pub logging: Option<LogConfig>,
}

impl RunOverrides {
    /// Apply the overrides and validate the result again
    pub fn apply(self, mut config: ExperimentConfig) -> Result<ExperimentConfig, ConfigError> {
        if let Some(dir) = self.result_dir {
            config.experiment.result_dir = dir;
        }
        if self.seed.is_some() {
            config.experiment.seed = self.seed;
        }
        if let Some(steps) = self.max_steps {
            config.experiment.max_steps = steps;
        }
        if self.realtime {
            config.experiment.realtime = true;
        }
        if let Some(logging) = self.logging {
            config.logging = logging;
        }

        config.validate().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }
}
