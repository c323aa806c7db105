use crate::config::{DelayConfig, ErrorMetric, InterpolationMode};
use crate::delay::{
    AccuracyPolicy, DelayEstimate, DelayGeometry, SearchResult, estimate_shift_with,
    report_search,
};
use crate::error::Result;
use crate::signal_processing::{FilterKernel, convolve_same, sinc_interpolate};

/// Everything one pipeline run produces
#[derive(Debug, Clone)]
pub struct DelayMeasurement {
    pub estimate: DelayEstimate,
    /// Full search outcome including the error curve
    pub search: SearchResult,
    /// Arrival angle in degrees, when geometry is configured and the delay is plausible
    pub angle_degrees: Option<f64>,
}

/// Two-channel delay estimator
///
/// Each channel is upsampled, then bandpass filtered at the upsampled rate;
/// the candidate channel is then searched for the shift that best matches the
/// reference channel. The filter kernel is designed once at construction.
pub struct DelayProcessor {
    kernel: FilterKernel,
    sample_rate: f64,
    up_factor: usize,
    mode: InterpolationMode,
    metric: ErrorMetric,
    max_shift: usize,
    geometry: Option<DelayGeometry>,
    policy: AccuracyPolicy,
}

impl DelayProcessor {
    /// Build a processor from configuration
    ///
    /// # Errors
    /// Returns `DelayError::Config` for inconsistent settings, or
    /// `DelayError::InvalidFilterSpec` if the filter cannot be designed at the
    /// upsampled rate.
    pub fn new(config: &DelayConfig) -> Result<Self> {
        config.validate()?;
        let kernel = FilterKernel::bandpass(
            config.filter.low_cut_hz,
            config.filter.high_cut_hz,
            config.interpolated_rate(),
            config.filter.num_taps,
            config.normalization_frequency(),
        )?;

        let geometry = config
            .geometry
            .as_ref()
            .map(|g| g.geometry())
            .transpose()?;

        let max_shift = config.max_shift_samples()?;

        log::debug!(
            "Delay processor: fs={} Hz x{} ({:?}), {} taps, max shift {} ({})",
            config.sampling.sample_rate_hz,
            config.interpolation.up_factor,
            config.interpolation.mode,
            kernel.len(),
            max_shift,
            config.max_delay()?
        );

        Ok(Self {
            kernel,
            sample_rate: config.sampling.sample_rate_hz,
            up_factor: config.interpolation.up_factor,
            mode: config.interpolation.mode,
            metric: config.search.metric,
            max_shift,
            geometry,
            policy: AccuracyPolicy::default(),
        })
    }

    /// Replace the zero-truth accuracy policy
    pub fn with_policy(mut self, policy: AccuracyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the maximum search shift (upsampled-grid samples)
    pub fn with_max_shift(mut self, max_shift: usize) -> Self {
        self.max_shift = max_shift;
        self
    }

    /// Upsample and filter one channel
    pub fn prepare(&self, samples: &[f64]) -> Result<Vec<f64>> {
        let upsampled = sinc_interpolate(samples, self.sample_rate, self.up_factor, self.mode)?;
        convolve_same(upsampled.samples(), &self.kernel)
    }

    /// Estimate how far `candidate` lags `reference`
    ///
    /// `ground_truth_s`, when known, adds accuracy figures to the estimate.
    pub fn process(
        &self,
        reference: &[f64],
        candidate: &[f64],
        ground_truth_s: Option<f64>,
    ) -> Result<DelayMeasurement> {
        let reference = self.prepare(reference)?;
        let candidate = self.prepare(candidate)?;
        log::debug!(
            "Prepared channels: reference {} samples, candidate {} samples",
            reference.len(),
            candidate.len()
        );

        let search = estimate_shift_with(&reference, &candidate, self.max_shift, self.metric)?;
        let estimate = report_search(
            &search,
            self.interpolated_rate(),
            self.sample_rate,
            ground_truth_s,
            &self.policy,
        )?;

        let angle_degrees = self.geometry.and_then(|geometry| {
            match geometry.angle_degrees(estimate.delay_seconds) {
                Ok(angle) => Some(angle),
                Err(e) => {
                    log::warn!("No angle for this measurement: {}", e);
                    None
                }
            }
        });

        log::debug!(
            "Estimated delay {:.3} us (shift {}, error {:.3e})",
            estimate.delay_us(),
            estimate.best_shift,
            estimate.min_error
        );

        Ok(DelayMeasurement {
            estimate,
            search,
            angle_degrees,
        })
    }

    pub fn kernel(&self) -> &FilterKernel {
        &self.kernel
    }

    pub fn max_shift(&self) -> usize {
        self.max_shift
    }

    pub fn interpolated_rate(&self) -> f64 {
        self.sample_rate * self.up_factor as f64
    }
}
