//! Three-stage degradation pipeline
//! Location: src/degradation/pipeline.rs

use crate::config::constants::degradation;
use crate::degradation::latency::LatencyBank;
use crate::degradation::missing::{MissingPolicy, MissingStage};
use crate::degradation::noise::add_gaussian_noise;
use crate::signal::Sample;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Per-case degradation settings. A non-positive value disables its stage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DegradationConfig {
    pub latency_seconds: f64,
    pub missing_rate: f64,
    pub noise_std: f64,
}

impl DegradationConfig {
    pub fn new(latency_seconds: f64, missing_rate: f64, noise_std: f64) -> Self {
        Self {
            latency_seconds,
            missing_rate,
            noise_std,
        }
    }

    /// True when every stage is disabled
    pub fn is_clean(&self) -> bool {
        self.latency_seconds <= 0.0 && self.missing_rate <= 0.0 && self.noise_std <= 0.0
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PipelineStats {
    pub samples_processed: u64,
    pub samples_dropped: u64,
}

/// Latency → missing → noise, applied to one sample per tick.
///
/// The pipeline owns its latency buffers, so a pipeline built per case
/// starts every case with empty buffers. Use
/// [`DegradationPipeline::into_latency_bank`] and
/// [`DegradationPipelineBuilder::latency_bank`] to carry buffers between cases.
#[derive(Debug, Clone)]
pub struct DegradationPipeline {
    config: DegradationConfig,
    latency: LatencyBank,
    missing: MissingStage,
    rng: StdRng,
    stats: PipelineStats,
}

impl DegradationPipeline {
    pub fn new(config: DegradationConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: DegradationConfig) -> DegradationPipelineBuilder {
        DegradationPipelineBuilder {
            config,
            sample_rate_hz: degradation::DEFAULT_SAMPLE_RATE_HZ,
            missing_policy: MissingPolicy::default(),
            latency_bank: None,
            rng: None,
        }
    }

    /// Run all three stages with this pipeline's configuration
    pub fn apply(&mut self, sample: Sample) -> Sample {
        let DegradationConfig {
            latency_seconds,
            missing_rate,
            noise_std,
        } = self.config;

        let delayed = self.apply_latency(sample, latency_seconds);
        let present = self.apply_missing(delayed, missing_rate);
        let out = self.apply_noise(present, noise_std);

        self.stats.samples_processed += 1;
        out
    }

    pub fn apply_latency(&mut self, sample: Sample, latency_seconds: f64) -> Sample {
        self.latency.delay(sample, latency_seconds)
    }

    pub fn apply_missing(&mut self, sample: Sample, rate: f64) -> Sample {
        let dropped_before = self.missing.dropped();
        let out = self.missing.apply(sample, rate, &mut self.rng);
        self.stats.samples_dropped += self.missing.dropped() - dropped_before;
        out
    }

    pub fn apply_noise(&mut self, sample: Sample, std: f64) -> Sample {
        add_gaussian_noise(sample, std, &mut self.rng)
    }

    pub fn config(&self) -> &DegradationConfig {
        &self.config
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn latency_bank(&self) -> &LatencyBank {
        &self.latency
    }

    /// Give up the latency buffers so a later pipeline can continue them
    pub fn into_latency_bank(self) -> LatencyBank {
        self.latency
    }
}

pub struct DegradationPipelineBuilder {
    config: DegradationConfig,
    sample_rate_hz: f64,
    missing_policy: MissingPolicy,
    latency_bank: Option<LatencyBank>,
    rng: Option<StdRng>,
}

impl DegradationPipelineBuilder {
    /// Stream rate used to size latency buffers
    pub fn sample_rate_hz(mut self, sample_rate_hz: f64) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self
    }

    pub fn missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    /// Continue from existing latency buffers instead of starting empty
    pub fn latency_bank(mut self, bank: LatencyBank) -> Self {
        self.latency_bank = Some(bank);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    pub fn rng(mut self, rng: StdRng) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn build(self) -> DegradationPipeline {
        let latency = match self.latency_bank {
            Some(mut bank) => {
                bank.set_sample_rate_hz(self.sample_rate_hz);
                bank
            }
            None => LatencyBank::new(self.sample_rate_hz),
        };

        DegradationPipeline {
            config: self.config,
            latency,
            missing: MissingStage::new(self.missing_policy),
            rng: self.rng.unwrap_or_else(StdRng::from_entropy),
            stats: PipelineStats::default(),
        }
    }
}
