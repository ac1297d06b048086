//! Sensor degradation stages applied to clean physiological samples
//! Location: src/degradation/mod.rs

pub mod latency;
pub mod missing;
pub mod noise;
pub mod pipeline;

pub use latency::{buffer_len_for, LatencyBank, LatencyBuffer};
pub use missing::{MissingPolicy, MissingStage};
pub use noise::add_gaussian_noise;
pub use pipeline::{DegradationConfig, DegradationPipeline, DegradationPipelineBuilder, PipelineStats};
