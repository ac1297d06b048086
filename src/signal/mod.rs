//! Synthetic physiological signal stream
//! Location: src/signal/mod.rs

pub mod generator;
pub mod types;

pub use generator::SignalGenerator;
pub use types::{Sample, SignalField};
