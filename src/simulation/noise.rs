use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{DelayError, Result};

/// Additive white Gaussian noise applied to each channel independently
#[derive(Clone, Copy, Debug, serde::Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Standard deviation, in the same units as the burst amplitude
    pub std_dev: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self { std_dev: 0.2 }
    }
}

impl NoiseConfig {
    pub fn with_std_dev(mut self, std_dev: f64) -> Self {
        self.std_dev = std_dev;
        self
    }

    pub fn apply(&self, signal: &mut [f64], rng: &mut ChaCha8Rng) -> Result<()> {
        add_gaussian_noise(signal, self.std_dev, rng)
    }
}

/// Seeded generator, or one seeded from the OS when `seed` is `None`
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

pub fn signal_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f64>() / signal.len() as f64
}

/// # Errors
/// Returns `DelayError::InvalidInput` if `std_dev` is negative or not finite.
pub fn add_gaussian_noise(signal: &mut [f64], std_dev: f64, rng: &mut ChaCha8Rng) -> Result<()> {
    if std_dev == 0.0 {
        return Ok(());
    }
    let normal = Normal::new(0.0, std_dev).map_err(|e| {
        DelayError::InvalidInput(format!("noise std dev {}: {}", std_dev, e))
    })?;
    for sample in signal.iter_mut() {
        *sample += normal.sample(rng);
    }
    Ok(())
}
