// src/experiment/grid.rs
//! Nested iteration over the experiment condition grid

use crate::config::constants::experiment::MANIFEST_FILE_NAME;
use crate::config::{ExperimentConfig, LatencyBufferScope};
use crate::degradation::{DegradationConfig, LatencyBank};
use crate::error::{BioError, BioResult};
use crate::experiment::case::{ensure_dir, CaseReport, CaseRunner, CaseSeeds, CaseSpec};
use crate::experiment::environment::SimulationEnvironment;
use crate::experiment::sink::CsvRecordSink;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Completed,
    Failed,
}

/// Manifest entry for one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub index: usize,
    pub name: String,
    pub spec: CaseSpec,
    pub csv_path: PathBuf,
    pub status: CaseStatus,
    #[serde(flatten)]
    pub report: CaseReport,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Summary of a grid run, written as `manifest.json` in the result directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub version: String,
    pub seed: Option<u64>,
    pub sample_rate_hz: f64,
    pub total_cases: usize,
    pub cases: Vec<CaseRecord>,
}

impl RunManifest {
    pub fn completed(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| c.status == CaseStatus::Completed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.completed()
    }
}

/// Runs every case of the configured grid against one environment.
///
/// Order is town → weather → latency → missing rate → noise. A failing case
/// is logged and recorded; failures loading a town or setting a weather abort
/// the run.
pub struct ExperimentGrid {
    config: ExperimentConfig,
}

impl ExperimentGrid {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn total_cases(&self) -> usize {
        self.config.grid.total_cases()
    }

    /// Every case in run order
    pub fn cases(&self) -> Vec<CaseSpec> {
        let grid = &self.config.grid;
        let mut cases = Vec::with_capacity(self.total_cases());
        for town in &grid.towns {
            for weather in &grid.weathers {
                cases.extend(self.cases_for(town, weather));
            }
        }
        cases
    }

    fn cases_for(&self, town: &str, weather: &str) -> Vec<CaseSpec> {
        let grid = &self.config.grid;
        let mut cases = Vec::new();
        for &latency in &grid.latencies {
            for &missing in &grid.missing_rates {
                for &noise in &grid.noise_stds {
                    cases.push(CaseSpec::new(
                        town,
                        weather,
                        DegradationConfig::new(latency, missing, noise),
                    ));
                }
            }
        }
        cases
    }

    pub fn run<E>(&self, env: &mut E) -> BioResult<RunManifest>
    where
        E: SimulationEnvironment + ?Sized,
    {
        let settings = &self.config.experiment;
        let signal = &self.config.signal;
        let total = self.total_cases();

        ensure_dir(&settings.result_dir)?;
        tracing::info!(total_cases = total, result_dir = %settings.result_dir.display(), "Total cases to run");

        let mut seed_source = settings.seed.map(StdRng::seed_from_u64);
        let mut shared_bank = match signal.latency_buffer_scope {
            LatencyBufferScope::Process => Some(LatencyBank::new(signal.sample_rate_hz)),
            LatencyBufferScope::Case => None,
        };

        let runner = CaseRunner::new(settings, signal);
        let mut manifest = RunManifest {
            version: crate::VERSION.to_string(),
            seed: settings.seed,
            sample_rate_hz: signal.sample_rate_hz,
            total_cases: total,
            cases: Vec::with_capacity(total),
        };

        for town in &self.config.grid.towns {
            tracing::info!(town = %town, "Loading town");
            env.load_town(town)?;

            for weather in &self.config.grid.weathers {
                tracing::info!(town = %town, weather = %weather, "Setting weather");
                env.set_weather(weather)?;

                for case in self.cases_for(town, weather) {
                    let index = manifest.cases.len() + 1;
                    let name = case.name();
                    tracing::info!("[CASE {}/{}] {}", index, total, name);

                    let seeds = match seed_source.as_mut() {
                        Some(rng) => CaseSeeds {
                            generator: Some(rng.gen()),
                            pipeline: Some(rng.gen()),
                        },
                        None => CaseSeeds::default(),
                    };

                    let csv_path = settings.result_dir.join(format!("{}.csv", name));
                    let result = match CsvRecordSink::create(&csv_path) {
                        Ok(mut sink) => {
                            let run = runner.run(env, &case, seeds, shared_bank.take(), &mut sink);
                            if signal.latency_buffer_scope == LatencyBufferScope::Process {
                                shared_bank = Some(run.latency_bank);
                            }
                            run.result
                        }
                        Err(e) => Err(e),
                    };

                    let record = match result {
                        Ok(report) => {
                            tracing::info!(
                                case = %name,
                                rows = report.rows_written,
                                snapshots = report.snapshots_saved,
                                "Case completed"
                            );
                            CaseRecord {
                                index,
                                name,
                                spec: case,
                                csv_path,
                                status: CaseStatus::Completed,
                                report,
                                error: None,
                            }
                        }
                        Err(e) => {
                            tracing::error!(case = %name, error = %e, "Case failed");
                            CaseRecord {
                                index,
                                name,
                                spec: case,
                                csv_path,
                                status: CaseStatus::Failed,
                                report: CaseReport::default(),
                                error: Some(e.to_string()),
                            }
                        }
                    };
                    manifest.cases.push(record);
                }
            }
        }

        self.write_manifest(&manifest)?;
        if manifest.failed() > 0 {
            tracing::warn!(failed = manifest.failed(), completed = manifest.completed(), "Finished with failed cases");
        } else {
            tracing::info!(completed = manifest.completed(), "All cases finished successfully");
        }
        Ok(manifest)
    }

    fn write_manifest(&self, manifest: &RunManifest) -> BioResult<()> {
        let path = self.config.experiment.result_dir.join(MANIFEST_FILE_NAME);
        let file = File::create(&path).map_err(|e| BioError::io("create manifest", &path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), manifest)?;
        Ok(())
    }
}
