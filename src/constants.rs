//! Physical and numeric constants for the delay estimation pipeline.

/// Speed of sound in dry air at 20 °C, in m/s.
pub const SPEED_OF_SOUND_M_S: f64 = 343.0;

/// Gains with magnitude below this are treated as zero when normalizing a kernel.
pub const GAIN_EPSILON: f64 = 1e-12;

/// Error values below this are treated as zero when computing curve confidence.
pub const ERROR_EPSILON: f64 = 1e-300;

/// Microseconds per second.
pub const MICROS_PER_SECOND: f64 = 1e6;

/// Default interpolation support (original samples on each side) for windowed mode.
pub const DEFAULT_WINDOWED_SUPPORT: usize = 3;
