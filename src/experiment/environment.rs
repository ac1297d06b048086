// src/experiment/environment.rs
//! Interface to the driving simulator that feeds the experiment

use crate::error::BioResult;
use crate::experiment::case::CaseSpec;
use std::path::Path;

/// Outcome of advancing the simulation by one fixed step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// No camera frame has arrived yet; nothing is recorded for this tick
    Warming,
    /// A frame is available and the risk proxy was evaluated
    Ready { risk: f64 },
}

/// A synchronous driving simulation.
///
/// The runner calls `load_town` once per town, `set_weather` once per
/// weather, then for every case `begin_case`, a series of `tick`s with
/// optional `save_snapshot`s, and finally `end_case`. `end_case` is called
/// even when the case fails part way.
pub trait SimulationEnvironment {
    fn load_town(&mut self, town: &str) -> BioResult<()>;

    fn set_weather(&mut self, weather: &str) -> BioResult<()>;

    /// Spawn the ego vehicle and attach the camera
    fn begin_case(&mut self, case: &CaseSpec) -> BioResult<()>;

    fn tick(&mut self) -> BioResult<Tick>;

    /// Write the latest camera frame to `path`
    fn save_snapshot(&mut self, path: &Path) -> BioResult<()>;

    /// Destroy everything spawned by `begin_case`
    fn end_case(&mut self);
}
