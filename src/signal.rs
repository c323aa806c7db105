use crate::error::{DelayError, Result};

/// A finite run of real-valued samples taken at a fixed rate
///
/// Sample `i` sits at time `i / sample_rate` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSequence {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl SampleSequence {
    /// # Errors
    /// Returns `DelayError::InvalidInput` if `sample_rate` is not a positive finite number.
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<Self> {
        if !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return Err(DelayError::InvalidInput(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of sample `index` in seconds
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate
    }

    /// Time spanned from the first to the last sample, in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len().saturating_sub(1) as f64 / self.sample_rate
    }
}
