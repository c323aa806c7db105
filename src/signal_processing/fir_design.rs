use crate::constants::GAIN_EPSILON;
use crate::error::{DelayError, Result};
use crate::signal_processing::math::{hamming, sinc};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Symmetric, odd-length FIR kernel
///
/// Tap `k` sits at offset `k - half_len()` from the center tap, so applying the
/// kernel in "same" mode introduces no net group delay.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterKernel {
    taps: Vec<f64>,
}

impl FilterKernel {
    /// Design a windowed-sinc bandpass kernel
    ///
    /// The ideal response is the difference of two ideal lowpass responses at
    /// `high_hz` and `low_hz`, tapered by a Hamming window. When
    /// `reference_hz` is given the kernel is rescaled so that the real part of
    /// its frequency response at that frequency is 1.
    ///
    /// # Arguments
    /// * `low_hz` - Lower cutoff frequency in Hz (may be 0)
    /// * `high_hz` - Upper cutoff frequency in Hz (at most Nyquist)
    /// * `sample_rate` - Sample rate the kernel will run at, in Hz
    /// * `num_taps` - Kernel length; even values are bumped to the next odd value
    /// * `reference_hz` - Optional frequency for unit-gain normalization
    ///
    /// # Errors
    /// Returns `DelayError::InvalidFilterSpec` if the cutoffs, sample rate or
    /// tap count are invalid.
    pub fn bandpass(
        low_hz: f64,
        high_hz: f64,
        sample_rate: f64,
        num_taps: usize,
        reference_hz: Option<f64>,
    ) -> Result<Self> {
        validate_spec(low_hz, high_hz, sample_rate, num_taps)?;

        let num_taps = if num_taps.is_multiple_of(2) {
            num_taps + 1
        } else {
            num_taps
        };
        let half = (num_taps - 1) / 2;

        let low_norm = low_hz / sample_rate;
        let high_norm = high_hz / sample_rate;
        let ideal_lowpass = |fc: f64, n: f64| 2.0 * fc * sinc(2.0 * fc * n);

        let taps: Vec<f64> = (0..num_taps)
            .map(|k| {
                let n = k as f64 - half as f64;
                let ideal = ideal_lowpass(high_norm, n) - ideal_lowpass(low_norm, n);
                ideal * hamming(k, num_taps)
            })
            .collect();

        let mut kernel = Self { taps };

        if let Some(reference_hz) = reference_hz {
            kernel.normalize_gain_at(reference_hz, sample_rate);
        }

        Ok(kernel)
    }

    /// Build a kernel from explicit coefficients
    ///
    /// # Errors
    /// Returns `DelayError::InvalidFilterSpec` if `taps` is empty or has even length.
    pub fn from_taps(taps: Vec<f64>) -> Result<Self> {
        if taps.is_empty() || taps.len().is_multiple_of(2) {
            return Err(DelayError::InvalidFilterSpec(format!(
                "kernel length must be odd and non-zero, got {}",
                taps.len()
            )));
        }
        Ok(Self { taps })
    }

    /// Complex frequency response at `freq_hz`, evaluated directly
    pub fn frequency_response(&self, freq_hz: f64, sample_rate: f64) -> Complex64 {
        let half = self.half_len() as f64;
        self.taps
            .iter()
            .enumerate()
            .map(|(k, &h)| {
                let angle = -2.0 * PI * freq_hz * (k as f64 - half) / sample_rate;
                Complex64::from_polar(h, angle)
            })
            .sum()
    }

    /// Rescale so the real frequency response at `freq_hz` is 1
    ///
    /// Leaves the kernel untouched if the gain there is zero or not finite.
    /// Returns the gain that was found.
    pub fn normalize_gain_at(&mut self, freq_hz: f64, sample_rate: f64) -> f64 {
        let gain = self.frequency_response(freq_hz, sample_rate).re;
        log::trace!("Kernel gain at {:.1} Hz: {:.6}", freq_hz, gain);

        if gain.abs() < GAIN_EPSILON || !gain.is_finite() {
            log::warn!(
                "Skipping gain normalization: gain at {:.1} Hz is {}",
                freq_hz,
                gain
            );
            return gain;
        }

        for tap in self.taps.iter_mut() {
            *tap /= gain;
        }
        gain
    }

    /// Get the tap coefficients
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Get the number of taps (filter length)
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Half-length `M`; the center tap sits at index `M`
    pub fn half_len(&self) -> usize {
        (self.taps.len() - 1) / 2
    }
}

fn validate_spec(low_hz: f64, high_hz: f64, sample_rate: f64, num_taps: usize) -> Result<()> {
    if !(sample_rate > 0.0) || !sample_rate.is_finite() {
        return Err(DelayError::InvalidFilterSpec(format!(
            "sample rate must be positive, got {}",
            sample_rate
        )));
    }
    if num_taps == 0 {
        return Err(DelayError::InvalidFilterSpec(
            "number of taps must be at least 1".to_string(),
        ));
    }

    let nyquist = sample_rate / 2.0;
    if !(low_hz >= 0.0) || !(high_hz <= nyquist) {
        return Err(DelayError::InvalidFilterSpec(format!(
            "cutoffs must lie within [0, {}] Hz: low={}, high={}",
            nyquist, low_hz, high_hz
        )));
    }
    if low_hz >= high_hz {
        return Err(DelayError::InvalidFilterSpec(format!(
            "low cutoff must be below high cutoff: low={}, high={}",
            low_hz, high_hz
        )));
    }
    Ok(())
}
