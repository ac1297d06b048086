// src/config/constants.rs
//! System-wide constants for signal generation, degradation and the experiment grid

/// Physiological signal generator constants
pub mod signal {
    /// Baseline heart rate is drawn uniformly from this half-open range (bpm)
    pub const HR_BASELINE_RANGE_BPM: (f64, f64) = (60.0, 70.0);
    pub const EDA_INITIAL_US: f64 = 0.5;

    pub const HR_RISK_GAIN: f64 = 0.2;
    pub const HR_NOISE_STD: f64 = 0.05;

    pub const EDA_RISK_GAIN: f64 = 0.3;
    pub const EDA_NOISE_STD: f64 = 0.02;

    pub const HRV_BASELINE_MS: f64 = 50.0;
    pub const HRV_RISK_GAIN: f64 = 25.0;
    pub const HRV_NOISE_STD: f64 = 2.0;
    pub const HRV_FLOOR_MS: f64 = 20.0;
}

/// Degradation pipeline constants
pub mod degradation {
    /// Assumed update rate of the signal stream when converting latency to buffer length
    pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 20.0;
    pub const MIN_LATENCY_BUFFER_LEN: usize = 1;
}

/// Experiment driver constants
pub mod experiment {
    pub const DEFAULT_RESULT_DIR: &str = "results";
    pub const DEFAULT_MAX_STEPS: u32 = 200;
    pub const DEFAULT_FIXED_DELTA_SECONDS: f64 = 0.1;
    pub const DEFAULT_RISK_TAU: f64 = 0.7;
    pub const DEFAULT_MAX_IMAGES_PER_CASE: u32 = 5;
    pub const DEFAULT_WARMUP_TICKS: u32 = 1;

    /// Mixed into the master seed for the environment's risk stream, keeping
    /// it apart from the stream that yields per-case seeds
    pub const ENVIRONMENT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

    pub const CSV_HEADER: [&str; 5] = ["step", "risk", "HR", "HRV", "EDA"];
    pub const MANIFEST_FILE_NAME: &str = "manifest.json";
    pub const SNAPSHOT_EXTENSION: &str = "ppm";
}

/// Default experiment grid
pub mod grid {
    pub const DEFAULT_TOWNS: &[&str] = &["Town03", "Town05"];
    pub const DEFAULT_WEATHERS: &[&str] = &["ClearNoon", "WetNoon", "ClearNight"];
    pub const DEFAULT_LATENCIES: &[f64] = &[0.0, 0.6, 1.0];
    pub const DEFAULT_MISSING_RATES: &[f64] = &[0.0, 0.2];
    pub const DEFAULT_NOISE_STDS: &[f64] = &[0.0, 0.1];
}

/// Synthetic environment constants
pub mod synthetic {
    pub const SNAPSHOT_WIDTH: usize = 80;
    pub const SNAPSHOT_HEIGHT: usize = 60;
}

/// Configuration file locations
pub mod paths {
    pub const DEFAULT_CONFIG_FILE: &str = "biosignal.toml";
    pub const PROJECT_CONFIG_FILE: &str = "config/biosignal.toml";
    pub const LOCAL_CONFIG_FILE: &str = "config/local.toml";
    pub const ENV_PREFIX: &str = "BIOSIG_";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_size() {
        let total = grid::DEFAULT_TOWNS.len()
            * grid::DEFAULT_WEATHERS.len()
            * grid::DEFAULT_LATENCIES.len()
            * grid::DEFAULT_MISSING_RATES.len()
            * grid::DEFAULT_NOISE_STDS.len();
        assert_eq!(total, 72);
    }

    #[test]
    fn test_hr_baseline_range_is_ordered() {
        let (lo, hi) = signal::HR_BASELINE_RANGE_BPM;
        assert!(lo < hi);
        assert!(signal::HRV_FLOOR_MS < signal::HRV_BASELINE_MS);
    }
}
