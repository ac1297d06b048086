// src/experiment/case.rs
//! Execution of a single experiment case

use crate::config::constants::experiment::SNAPSHOT_EXTENSION;
use crate::config::{ExperimentSettings, SignalSettings};
use crate::degradation::{DegradationConfig, DegradationPipeline, LatencyBank};
use crate::error::{BioError, BioResult};
use crate::experiment::environment::{SimulationEnvironment, Tick};
use crate::experiment::sink::{Record, RecordSink};
use crate::signal::SignalGenerator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One point of the condition grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSpec {
    pub town: String,
    pub weather: String,
    pub degradation: DegradationConfig,
}

impl CaseSpec {
    pub fn new(town: &str, weather: &str, degradation: DegradationConfig) -> Self {
        Self {
            town: town.to_string(),
            weather: weather.to_string(),
            degradation,
        }
    }

    /// `{town}_{weather}_lat{latency}_miss{rate}_noise{std}`
    pub fn name(&self) -> String {
        format!(
            "{}_{}_lat{}_miss{}_noise{}",
            self.town,
            self.weather,
            format_param(self.degradation.latency_seconds),
            format_param(self.degradation.missing_rate),
            format_param(self.degradation.noise_std),
        )
    }
}

/// Shortest round-trip form, always with a decimal point (`0.0`, `0.6`).
///
/// Values below 1e-4 or from 1e16 up use an exponent with a sign and at
/// least two digits (`1e-05`, `2.5e+16`), so names line up with recordings
/// made by the earlier tooling.
fn format_param(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

/// Seeds for the per-case random streams; `None` draws from entropy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseSeeds {
    pub generator: Option<u64>,
    pub pipeline: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub rows_written: u32,
    pub skipped_ticks: u32,
    pub snapshots_saved: u32,
    pub samples_dropped: u64,
}

/// Result of a case plus the latency buffers it ended with
pub struct CaseRun {
    pub result: BioResult<CaseReport>,
    pub latency_bank: LatencyBank,
}

/// Runs one case: fresh generator and pipeline, `max_steps` ticks, one
/// record per ready tick, snapshots on high-risk ticks.
pub struct CaseRunner<'a> {
    settings: &'a ExperimentSettings,
    signal: &'a SignalSettings,
}

impl<'a> CaseRunner<'a> {
    pub fn new(settings: &'a ExperimentSettings, signal: &'a SignalSettings) -> Self {
        Self { settings, signal }
    }

    /// Path of the `index`-th snapshot of `case`
    pub fn snapshot_path(&self, case: &CaseSpec, index: u32) -> PathBuf {
        self.settings
            .result_dir
            .join(format!("{}_img{}.{}", case.name(), index, SNAPSHOT_EXTENSION))
    }

    /// Run `case`, continuing from `carried` latency buffers when given
    pub fn run<E, S>(
        &self,
        env: &mut E,
        case: &CaseSpec,
        seeds: CaseSeeds,
        carried: Option<LatencyBank>,
        sink: &mut S,
    ) -> CaseRun
    where
        E: SimulationEnvironment + ?Sized,
        S: RecordSink + ?Sized,
    {
        let mut generator = match seeds.generator {
            Some(seed) => SignalGenerator::from_seed(seed),
            None => SignalGenerator::new(),
        };

        let mut builder = DegradationPipeline::builder(case.degradation)
            .sample_rate_hz(self.signal.sample_rate_hz)
            .missing_policy(self.signal.missing_policy);
        if let Some(bank) = carried {
            builder = builder.latency_bank(bank);
        }
        if let Some(seed) = seeds.pipeline {
            builder = builder.seed(seed);
        }
        let mut pipeline = builder.build();

        let result = match env.begin_case(case) {
            Ok(()) => self.drive(env, case, &mut generator, &mut pipeline, sink),
            Err(e) => Err(e),
        };
        env.end_case();

        CaseRun {
            result,
            latency_bank: pipeline.into_latency_bank(),
        }
    }

    fn drive<E, S>(
        &self,
        env: &mut E,
        case: &CaseSpec,
        generator: &mut SignalGenerator,
        pipeline: &mut DegradationPipeline,
        sink: &mut S,
    ) -> BioResult<CaseReport>
    where
        E: SimulationEnvironment + ?Sized,
        S: RecordSink + ?Sized,
    {
        let mut report = CaseReport::default();

        for step in 0..self.settings.max_steps {
            let risk = match env.tick()? {
                Tick::Warming => {
                    report.skipped_ticks += 1;
                    continue;
                }
                Tick::Ready { risk } => risk,
            };

            let raw = generator.step(risk);
            let degraded = pipeline.apply(raw);
            sink.write_record(&Record::new(step, risk, degraded))?;
            report.rows_written += 1;

            if risk > self.settings.risk_tau && report.snapshots_saved < self.settings.max_images_per_case {
                let path = self.snapshot_path(case, report.snapshots_saved);
                env.save_snapshot(&path)?;
                tracing::debug!(case = %case.name(), step, risk, path = %path.display(), "Saved snapshot");
                report.snapshots_saved += 1;
            }

            if self.settings.realtime {
                pace(self.settings.fixed_delta_seconds);
            }
        }

        sink.flush()?;
        report.samples_dropped = pipeline.stats().samples_dropped;
        Ok(report)
    }
}

fn pace(seconds: f64) {
    if seconds > 0.0 {
        std::thread::sleep(Duration::from_secs_f64(seconds));
    }
}

/// Create `dir` and its parents if missing
pub fn ensure_dir(dir: &Path) -> BioResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| BioError::io("create result directory", dir, e))
}
