pub mod config;
pub mod constants;
pub mod delay;
pub mod error;
pub mod output;
pub mod processing;
pub mod signal;
pub mod signal_processing;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::DelayConfig;
pub use error::{DelayError, Result};
pub use processing::{DelayMeasurement, DelayProcessor};
pub use signal::SampleSequence;
