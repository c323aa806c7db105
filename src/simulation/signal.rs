use std::f64::consts::PI;

use crate::error::{DelayError, Result};

/// Zero samples appended after the burst in both channels
pub const TRAILING_ZEROS: usize = 20;

/// Fraction of the burst duration used as the envelope rise time constant
const ENVELOPE_TAU_FRACTION: f64 = 0.1;

/// A short carrier burst with an exponential attack
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    pub sample_rate_hz: f64,
    pub carrier_hz: f64,
    pub cycles: u32,
    pub amplitude: f64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 192_000.0,
            carrier_hz: 40_000.0,
            cycles: 10,
            amplitude: 1.0,
        }
    }
}

impl BurstConfig {
    pub fn duration_s(&self) -> f64 {
        self.cycles as f64 / self.carrier_hz
    }

    /// Number of samples covering the burst itself
    pub fn burst_len(&self) -> usize {
        (self.duration_s() * self.sample_rate_hz).round() as usize
    }

    /// Burst value at continuous time `t`, zero outside `[0, duration)`
    pub fn value_at(&self, t: f64) -> f64 {
        let duration = self.duration_s();
        if !(0.0..duration).contains(&t) {
            return 0.0;
        }
        let tau = ENVELOPE_TAU_FRACTION * duration;
        let envelope = 1.0 - (-t / tau).exp();
        self.amplitude * envelope * (2.0 * PI * self.carrier_hz * t).sin()
    }

    fn validate(&self) -> Result<()> {
        if !(self.sample_rate_hz > 0.0) || !self.sample_rate_hz.is_finite() {
            return Err(DelayError::InvalidInput(format!(
                "burst sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if !(self.carrier_hz > 0.0) || self.carrier_hz >= self.sample_rate_hz / 2.0 {
            return Err(DelayError::InvalidInput(format!(
                "carrier {} Hz must lie below Nyquist ({} Hz)",
                self.carrier_hz,
                self.sample_rate_hz / 2.0
            )));
        }
        if self.cycles == 0 {
            return Err(DelayError::InvalidInput("burst needs at least one cycle".into()));
        }
        Ok(())
    }
}

/// Reference and delayed channel for one simulated measurement
#[derive(Debug, Clone)]
pub struct SignalPair {
    pub reference: Vec<f64>,
    pub candidate: Vec<f64>,
    /// Applied delay in seconds
    pub delay_s: f64,
}

/// Generate a reference burst and a copy delayed by `delay_s`
///
/// The reference holds the burst plus [`TRAILING_ZEROS`]; the candidate is
/// `max_delay_samples` longer so the whole delayed burst is recorded. The
/// delay is applied in continuous time, so it need not be a whole number of
/// samples.
///
/// # Errors
/// Returns `DelayError::InvalidInput` for an invalid burst or a delay outside
/// `[0, max_delay_samples / fs]`.
pub fn generate_signal_pair(
    config: &BurstConfig,
    delay_s: f64,
    max_delay_samples: usize,
) -> Result<SignalPair> {
    config.validate()?;
    let fs = config.sample_rate_hz;
    let max_delay_s = max_delay_samples as f64 / fs;
    if !(delay_s >= 0.0) || delay_s > max_delay_s {
        return Err(DelayError::InvalidInput(format!(
            "delay {:.3e} s outside [0, {:.3e}] s",
            delay_s, max_delay_s
        )));
    }

    let reference_len = config.burst_len() + TRAILING_ZEROS;
    let reference = (0..reference_len)
        .map(|n| config.value_at(n as f64 / fs))
        .collect();
    let candidate = (0..reference_len + max_delay_samples)
        .map(|n| config.value_at(n as f64 / fs - delay_s))
        .collect();

    Ok(SignalPair {
        reference,
        candidate,
        delay_s,
    })
}
