//! Synthetic physiological signal generation driven by a risk scalar
//! Location: src/signal/generator.rs

use super::types::Sample;
use crate::config::constants::signal;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Drifting HR/EDA state plus stateless HRV, advanced once per tick.
///
/// HR and EDA accumulate `gain · risk` every step, so sustained positive risk
/// drifts both upward. HRV is recomputed from the current risk alone and is
/// never below [`signal::HRV_FLOOR_MS`].
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    hr: f64,
    eda: f64,
    rng: StdRng,
    steps: u64,
}

impl SignalGenerator {
    /// Create a generator seeded from system entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a deterministic generator
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a generator drawing from `rng`; the baseline HR is drawn first
    pub fn with_rng(mut rng: StdRng) -> Self {
        let (lo, hi) = signal::HR_BASELINE_RANGE_BPM;
        let hr = rng.gen_range(lo..hi);

        Self {
            hr,
            eda: signal::EDA_INITIAL_US,
            rng,
            steps: 0,
        }
    }

    /// Advance one tick with the given risk and return the new reading.
    ///
    /// Risk is nominally in [0, 1] but is not clamped.
    pub fn step(&mut self, risk: f64) -> Sample {
        self.hr += signal::HR_RISK_GAIN * risk + self.gaussian(signal::HR_NOISE_STD);
        self.eda += signal::EDA_RISK_GAIN * risk + self.gaussian(signal::EDA_NOISE_STD);

        let hrv = (signal::HRV_BASELINE_MS - signal::HRV_RISK_GAIN * risk
            + self.gaussian(signal::HRV_NOISE_STD))
        .max(signal::HRV_FLOOR_MS);

        self.steps += 1;

        Sample {
            hr: self.hr,
            hrv,
            eda: self.eda,
        }
    }

    pub fn heart_rate(&self) -> f64 {
        self.hr
    }

    pub fn electrodermal_activity(&self) -> f64 {
        self.eda
    }

    /// Number of completed calls to [`SignalGenerator::step`]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn gaussian(&mut self, std: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        z * std
    }
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::new()
    }
}
