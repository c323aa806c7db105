use crate::constants::MICROS_PER_SECOND;
use crate::delay::SearchResult;
use crate::error::{DelayError, Result};
use serde::Serialize;

/// One step of the zero-truth accuracy ladder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyBand {
    /// Errors strictly below this (in μs) earn `score`
    pub max_error_us: f64,
    pub score: f64,
}

/// Scoring policy for estimates whose ground truth is zero
///
/// Relative error is undefined when the true delay is 0, so the score comes
/// from fixed absolute-error bands instead, falling back to
/// `max(0, fallback_ceiling - error_us)` past the last band. The default bands
/// are empirical and are meant to be tuned.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyPolicy {
    bands: Vec<AccuracyBand>,
    fallback_ceiling: f64,
}

impl Default for AccuracyPolicy {
    fn default() -> Self {
        let band = |max_error_us, score| AccuracyBand {
            max_error_us,
            score,
        };
        Self {
            bands: vec![
                band(1.0, 95.0),
                band(2.0, 85.0),
                band(5.0, 75.0),
                band(10.0, 60.0),
            ],
            fallback_ceiling: 50.0,
        }
    }
}

impl AccuracyPolicy {
    /// Build a custom policy
    ///
    /// # Errors
    /// Returns `DelayError::InvalidInput` unless thresholds are positive and
    /// strictly ascending, scores lie in [0, 100] and never increase, and the
    /// fallback starts no higher than the last band's score.
    pub fn with_bands(bands: Vec<AccuracyBand>, fallback_ceiling: f64) -> Result<Self> {
        let invalid = |msg: &str| Err(DelayError::InvalidInput(format!("accuracy policy: {}", msg)));

        let mut prev: Option<AccuracyBand> = None;
        for band in &bands {
            if !(band.max_error_us > 0.0) || !(0.0..=100.0).contains(&band.score) {
                return invalid("band thresholds must be positive and scores within [0, 100]");
            }
            if let Some(p) = prev
                && (band.max_error_us <= p.max_error_us || band.score > p.score)
            {
                return invalid("bands must ascend in error and not increase in score");
            }
            prev = Some(*band);
        }

        let start_of_fallback = fallback_ceiling - prev.map_or(0.0, |b| b.max_error_us);
        let ceiling = prev.map_or(100.0, |b| b.score);
        if !fallback_ceiling.is_finite() || start_of_fallback > ceiling {
            return invalid("fallback must not score above the last band");
        }

        Ok(Self {
            bands,
            fallback_ceiling,
        })
    }

    /// Accuracy (0-100) for an absolute error when the true delay is zero
    pub fn zero_truth_score(&self, error_us: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| error_us < band.max_error_us)
            .map_or_else(|| (self.fallback_ceiling - error_us).max(0.0), |band| band.score)
    }

    /// Compare an estimate against ground truth, both in seconds
    pub fn assess(&self, estimate_s: f64, truth_s: f64) -> Accuracy {
        let abs_error_s = (estimate_s - truth_s).abs();
        let error_us = abs_error_s * MICROS_PER_SECOND;

        let (percent_error, accuracy_percent) = if truth_s == 0.0 {
            (None, self.zero_truth_score(error_us))
        } else {
            let pct = 100.0 * abs_error_s / truth_s.abs();
            (Some(pct), (100.0 - pct).max(0.0))
        };

        Accuracy {
            truth_seconds: truth_s,
            abs_error_seconds: abs_error_s,
            percent_error,
            accuracy_percent,
        }
    }
}

/// Estimate compared against a known true delay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Accuracy {
    pub truth_seconds: f64,
    pub abs_error_seconds: f64,
    /// `None` when the true delay is zero
    pub percent_error: Option<f64>,
    /// Score in [0, 100]
    pub accuracy_percent: f64,
}

impl Accuracy {
    pub fn abs_error_us(&self) -> f64 {
        self.abs_error_seconds * MICROS_PER_SECOND
    }

    pub fn truth_us(&self) -> f64 {
        self.truth_seconds * MICROS_PER_SECOND
    }
}

/// Delay measurement in physical units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayEstimate {
    /// Best shift on the upsampled grid
    pub best_shift: usize,
    /// Delay in original-rate samples (fractional)
    pub delay_samples: f64,
    /// Delay in seconds
    pub delay_seconds: f64,
    /// Error metric at the best shift
    pub min_error: f64,
    /// Curve-shape confidence in [0, 1], when the error curve was available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Present only when ground truth was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<Accuracy>,
}

impl DelayEstimate {
    pub fn delay_us(&self) -> f64 {
        self.delay_seconds * MICROS_PER_SECOND
    }
}

/// Convert an upsampled-grid shift to a physical delay with the default policy
///
/// # Errors
/// Returns `DelayError::InvalidInput` if either sample rate is not positive or
/// the ground truth is not finite.
pub fn report(
    best_shift: usize,
    interpolated_rate: f64,
    original_rate: f64,
    min_error: f64,
    ground_truth_s: Option<f64>,
) -> Result<DelayEstimate> {
    report_with_policy(
        best_shift,
        interpolated_rate,
        original_rate,
        min_error,
        ground_truth_s,
        &AccuracyPolicy::default(),
    )
}

/// Like [`report`], scoring zero-truth cases with `policy`
pub fn report_with_policy(
    best_shift: usize,
    interpolated_rate: f64,
    original_rate: f64,
    min_error: f64,
    ground_truth_s: Option<f64>,
    policy: &AccuracyPolicy,
) -> Result<DelayEstimate> {
    for (name, rate) in [("interpolated", interpolated_rate), ("original", original_rate)] {
        if !(rate > 0.0) || !rate.is_finite() {
            return Err(DelayError::InvalidInput(format!(
                "{} sample rate must be positive, got {}",
                name, rate
            )));
        }
    }
    if let Some(truth) = ground_truth_s
        && !truth.is_finite()
    {
        return Err(DelayError::InvalidInput(format!(
            "ground truth delay must be finite, got {}",
            truth
        )));
    }

    let up_ratio = interpolated_rate / original_rate;
    let delay_samples = best_shift as f64 / up_ratio;
    let delay_seconds = delay_samples / original_rate;

    Ok(DelayEstimate {
        best_shift,
        delay_samples,
        delay_seconds,
        min_error,
        confidence: None,
        accuracy: ground_truth_s.map(|truth| policy.assess(delay_seconds, truth)),
    })
}

/// Report a search result, carrying its curve confidence
pub fn report_search(
    search: &SearchResult,
    interpolated_rate: f64,
    original_rate: f64,
    ground_truth_s: Option<f64>,
    policy: &AccuracyPolicy,
) -> Result<DelayEstimate> {
    let mut estimate = report_with_policy(
        search.best_shift,
        interpolated_rate,
        original_rate,
        search.min_error,
        ground_truth_s,
        policy,
    )?;
    estimate.confidence = Some(search.confidence());
    Ok(estimate)
}
