// src/experiment/synthetic.rs
//! Stand-in simulator producing a uniform risk surrogate and flat camera frames

use crate::config::constants::experiment::ENVIRONMENT_SEED_SALT;
use crate::config::constants::synthetic::{SNAPSHOT_HEIGHT, SNAPSHOT_WIDTH};
use crate::error::{BioError, BioResult, IntoBioError};
use crate::experiment::case::CaseSpec;
use crate::experiment::environment::{SimulationEnvironment, Tick};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// Draws risk uniformly from [0, 1) every ready tick. The camera delivers
/// its first frame after `warmup_ticks` ticks of each case.
pub struct SyntheticEnvironment {
    rng: StdRng,
    warmup_ticks: u32,
    town: Option<String>,
    weather: Option<String>,
    active_case: Option<String>,
    ticks_in_case: u32,
    last_risk: Option<f64>,
}

impl SyntheticEnvironment {
    pub fn new(warmup_ticks: u32) -> Self {
        Self::with_rng(StdRng::from_entropy(), warmup_ticks)
    }

    pub fn from_seed(seed: u64, warmup_ticks: u32) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), warmup_ticks)
    }

    /// Seed the risk stream from the run's master seed.
    ///
    /// The grid draws per-case seeds from `master_seed` directly, so the
    /// environment uses a salted copy.
    pub fn from_master_seed(master_seed: u64, warmup_ticks: u32) -> Self {
        Self::from_seed(master_seed ^ ENVIRONMENT_SEED_SALT, warmup_ticks)
    }

    fn with_rng(rng: StdRng, warmup_ticks: u32) -> Self {
        Self {
            rng,
            warmup_ticks,
            town: None,
            weather: None,
            active_case: None,
            ticks_in_case: 0,
            last_risk: None,
        }
    }

    pub fn town(&self) -> Option<&str> {
        self.town.as_deref()
    }

    pub fn weather(&self) -> Option<&str> {
        self.weather.as_deref()
    }

    pub fn active_case(&self) -> Option<&str> {
        self.active_case.as_deref()
    }

    /// Binary PPM: rows shade from the risk colour at the top to black
    fn render_frame(&self, risk: f64) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", SNAPSHOT_WIDTH, SNAPSHOT_HEIGHT);
        let mut bytes = Vec::with_capacity(header.len() + SNAPSHOT_WIDTH * SNAPSHOT_HEIGHT * 3);
        bytes.extend_from_slice(header.as_bytes());

        let risk = risk.clamp(0.0, 1.0);
        for row in 0..SNAPSHOT_HEIGHT {
            let shade = 1.0 - row as f64 / SNAPSHOT_HEIGHT as f64;
            let red = (255.0 * risk * shade) as u8;
            let green = (255.0 * (1.0 - risk) * shade) as u8;
            for _ in 0..SNAPSHOT_WIDTH {
                bytes.extend_from_slice(&[red, green, 0]);
            }
        }
        bytes
    }
}

impl SimulationEnvironment for SyntheticEnvironment {
    fn load_town(&mut self, town: &str) -> BioResult<()> {
        if town.trim().is_empty() {
            return Err(BioError::environment("load_town", "town name is empty"));
        }
        self.town = Some(town.to_string());
        self.weather = None;
        Ok(())
    }

    fn set_weather(&mut self, weather: &str) -> BioResult<()> {
        if self.town.is_none() {
            return Err(BioError::environment("set_weather", "no town loaded"));
        }
        self.weather = Some(weather.to_string());
        Ok(())
    }

    fn begin_case(&mut self, case: &CaseSpec) -> BioResult<()> {
        if let Some(active) = &self.active_case {
            return Err(BioError::environment(
                "begin_case",
                format!("case {} is still active", active),
            ));
        }
        self.active_case = Some(case.name());
        self.ticks_in_case = 0;
        self.last_risk = None;
        Ok(())
    }

    fn tick(&mut self) -> BioResult<Tick> {
        if self.active_case.is_none() {
            return Err(BioError::environment("tick", "no active case"));
        }

        self.ticks_in_case += 1;
        if self.ticks_in_case <= self.warmup_ticks {
            return Ok(Tick::Warming);
        }

        let risk: f64 = self.rng.gen();
        self.last_risk = Some(risk);
        Ok(Tick::Ready { risk })
    }

    fn save_snapshot(&mut self, path: &Path) -> BioResult<()> {
        let risk = self
            .last_risk
            .ok_or_else(|| BioError::environment("save_snapshot", "no camera frame received"))?;
        std::fs::write(path, self.render_frame(risk)).bio_err("save_snapshot")
    }

    fn end_case(&mut self) {
        self.active_case = None;
        self.last_risk = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::degradation::DegradationConfig;

    fn case() -> CaseSpec {
        CaseSpec::new("Town03", "ClearNoon", DegradationConfig::default())
    }

    #[test]
    fn test_warmup_then_ready() {
        let mut env = SyntheticEnvironment::from_seed(1, 2);
        env.load_town("Town03").unwrap();
        env.begin_case(&case()).unwrap();

        assert_eq!(env.tick().unwrap(), Tick::Warming);
        assert_eq!(env.tick().unwrap(), Tick::Warming);
        for _ in 0..100 {
            match env.tick().unwrap() {
                Tick::Ready { risk } => assert!((0.0..1.0).contains(&risk)),
                Tick::Warming => panic!("Camera should be streaming"),
            }
        }
    }

    #[test]
    fn test_master_seed_stream_differs_from_case_seed_stream() {
        let mut env = SyntheticEnvironment::from_master_seed(5, 0);
        env.begin_case(&case()).unwrap();

        let mut case_seeds = StdRng::seed_from_u64(5);
        let first_case_draw: f64 = case_seeds.gen();
        match env.tick().unwrap() {
            Tick::Ready { risk } => assert_ne!(risk, first_case_draw),
            Tick::Warming => panic!("No warm-up configured"),
        }
    }

    #[test]
    fn test_tick_requires_active_case() {
        let mut env = SyntheticEnvironment::from_seed(1, 0);
        assert!(env.tick().is_err());

        env.begin_case(&case()).unwrap();
        assert!(env.tick().is_ok());
        env.end_case();
        assert!(env.tick().is_err());
    }

    #[test]
    fn test_overlapping_cases_rejected() {
        let mut env = SyntheticEnvironment::from_seed(1, 0);
        env.begin_case(&case()).unwrap();
        assert!(env.begin_case(&case()).is_err());
    }

    #[test]
    fn test_weather_requires_town() {
        let mut env = SyntheticEnvironment::from_seed(1, 0);
        assert!(env.set_weather("WetNoon").is_err());
        env.load_town("Town05").unwrap();
        env.set_weather("WetNoon").unwrap();
        assert_eq!(env.weather(), Some("WetNoon"));
    }

    #[test]
    fn test_snapshot_written_as_ppm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.ppm");

        let mut env = SyntheticEnvironment::from_seed(4, 0);
        env.begin_case(&case()).unwrap();
        assert!(env.save_snapshot(&path).is_err());

        env.tick().unwrap();
        env.save_snapshot(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let header = format!("P6\n{} {}\n255\n", SNAPSHOT_WIDTH, SNAPSHOT_HEIGHT);
        assert!(bytes.starts_with(header.as_bytes()));
        assert_eq!(bytes.len(), header.len() + SNAPSHOT_WIDTH * SNAPSHOT_HEIGHT * 3);
    }
}
