//! Experiment driver: runs the condition grid against a simulation environment
//! and records degraded signals per case.

pub mod case;
pub mod environment;
pub mod grid;
pub mod sink;
pub mod synthetic;

pub use case::{ensure_dir, CaseReport, CaseRun, CaseRunner, CaseSeeds, CaseSpec};
pub use environment::{SimulationEnvironment, Tick};
pub use grid::{CaseRecord, CaseStatus, ExperimentGrid, RunManifest};
pub use sink::{CsvRecordSink, MemorySink, Record, RecordSink};
pub use synthetic::SyntheticEnvironment;
