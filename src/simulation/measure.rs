use rand::RngExt;
use rand_chacha::ChaCha8Rng;
use rolling_stats::Stats;
use serde::Serialize;

use super::{BurstConfig, NoiseConfig, create_rng, generate_signal_pair};
use crate::constants::MICROS_PER_SECOND;
use crate::error::{DelayError, Result};
use crate::processing::DelayProcessor;

/// Monte-Carlo sweep parameters
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    pub burst: BurstConfig,
    pub noise: NoiseConfig,
    /// Delays are drawn uniformly from `[0, max_delay_us]`
    pub max_delay_us: f64,
    pub trials: usize,
    /// Trial `i` is seeded with `seed + i`
    pub seed: u64,
    pub delay_bins: usize,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            burst: BurstConfig::default(),
            noise: NoiseConfig::default(),
            max_delay_us: 145.0,
            trials: 100,
            seed: 0,
            delay_bins: 10,
        }
    }
}

impl TrialConfig {
    /// Extra candidate samples recorded beyond the reference length
    pub fn max_delay_samples(&self) -> usize {
        (self.max_delay_us / MICROS_PER_SECOND * self.burst.sample_rate_hz)
            .round()
            .max(0.0) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialOutcome {
    pub true_delay_us: f64,
    pub estimated_delay_us: f64,
    pub error_us: f64,
    pub accuracy_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }

    fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut stats: Stats<f64> = Stats::new();
        for value in values {
            stats.update(value);
        }
        Self::from_stats(&stats)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorPercentiles {
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Trial counts by absolute error: below 1 μs, 1-5 μs, 5-10 μs, 10 μs and up
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ErrorCategories {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl ErrorCategories {
    fn record(&mut self, error_us: f64) {
        match error_us {
            e if e < 1.0 => self.excellent += 1,
            e if e < 5.0 => self.good += 1,
            e if e < 10.0 => self.fair += 1,
            _ => self.poor += 1,
        }
    }
}

/// Statistics for trials whose true delay falls in `[low_us, high_us)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayBinStats {
    pub low_us: f64,
    pub high_us: f64,
    pub count: usize,
    pub error_us: Option<StatsSummary>,
    pub mean_accuracy_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrialSummary {
    pub trials: usize,
    pub error_us: StatsSummary,
    pub accuracy_percent: StatsSummary,
    pub percentiles: ErrorPercentiles,
    pub categories: ErrorCategories,
    pub bins: Vec<DelayBinStats>,
    #[serde(skip)]
    pub outcomes: Vec<TrialOutcome>,
}

/// Simulate one noisy measurement at a known delay and score it
pub fn run_trial(
    processor: &DelayProcessor,
    config: &TrialConfig,
    delay_s: f64,
    rng: &mut ChaCha8Rng,
) -> Result<TrialOutcome> {
    let mut pair = generate_signal_pair(&config.burst, delay_s, config.max_delay_samples())?;
    config.noise.apply(&mut pair.reference, rng)?;
    config.noise.apply(&mut pair.candidate, rng)?;

    let measurement = processor.process(&pair.reference, &pair.candidate, Some(delay_s))?;
    let estimate = measurement.estimate;
    let accuracy = estimate.accuracy.ok_or_else(|| {
        DelayError::InvalidInput("trial estimate carries no accuracy".into())
    })?;

    Ok(TrialOutcome {
        true_delay_us: delay_s * MICROS_PER_SECOND,
        estimated_delay_us: estimate.delay_us(),
        error_us: accuracy.abs_error_us(),
        accuracy_percent: accuracy.accuracy_percent,
    })
}

/// Run `config.trials` seeded trials with uniformly drawn delays
///
/// # Errors
/// Returns `DelayError::InvalidInput` when no trials or delay bins are
/// requested, and propagates any pipeline failure.
pub fn run_trials(processor: &DelayProcessor, config: &TrialConfig) -> Result<TrialSummary> {
    if config.trials == 0 || config.delay_bins == 0 {
        return Err(DelayError::InvalidInput(
            "at least one trial and one delay bin are required".into(),
        ));
    }
    let max_delay_s = config.max_delay_samples() as f64 / config.burst.sample_rate_hz;
    let max_delay_s = max_delay_s.min(config.max_delay_us / MICROS_PER_SECOND);

    let mut outcomes = Vec::with_capacity(config.trials);
    for i in 0..config.trials {
        let mut rng = create_rng(Some(config.seed.wrapping_add(i as u64)));
        let delay_s = rng.random::<f64>() * max_delay_s;
        let outcome = run_trial(processor, config, delay_s, &mut rng)?;
        log::debug!(
            "Trial {}: true {:.3} us, estimated {:.3} us, error {:.3} us",
            i,
            outcome.true_delay_us,
            outcome.estimated_delay_us,
            outcome.error_us
        );
        if outcome.error_us > 10.0 {
            log::info!(
                "Trial {} missed by {:.3} us (true delay {:.3} us)",
                i,
                outcome.error_us,
                outcome.true_delay_us
            );
        }
        outcomes.push(outcome);
    }

    summarize(outcomes, config.max_delay_us, config.delay_bins)
}

fn summarize(
    outcomes: Vec<TrialOutcome>,
    max_delay_us: f64,
    delay_bins: usize,
) -> Result<TrialSummary> {
    let empty = || DelayError::InvalidInput("no trial outcomes to summarize".into());
    let error_us = StatsSummary::from_values(outcomes.iter().map(|o| o.error_us)).ok_or_else(empty)?;
    let accuracy_percent =
        StatsSummary::from_values(outcomes.iter().map(|o| o.accuracy_percent)).ok_or_else(empty)?;

    let mut sorted: Vec<f64> = outcomes.iter().map(|o| o.error_us).collect();
    sorted.sort_by(f64::total_cmp);
    let percentiles = ErrorPercentiles {
        p25: percentile(&sorted, 25.0),
        median: percentile(&sorted, 50.0),
        p75: percentile(&sorted, 75.0),
        p90: percentile(&sorted, 90.0),
        p95: percentile(&sorted, 95.0),
        p99: percentile(&sorted, 99.0),
    };

    let mut categories = ErrorCategories::default();
    for outcome in &outcomes {
        categories.record(outcome.error_us);
    }

    Ok(TrialSummary {
        trials: outcomes.len(),
        error_us,
        accuracy_percent,
        percentiles,
        categories,
        bins: bin_by_delay(&outcomes, max_delay_us, delay_bins),
        outcomes,
    })
}

/// Linear-interpolated percentile of an ascending slice
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = pct / 100.0 * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn bin_by_delay(outcomes: &[TrialOutcome], max_delay_us: f64, bins: usize) -> Vec<DelayBinStats> {
    let width = max_delay_us / bins as f64;
    (0..bins)
        .map(|b| {
            let members: Vec<&TrialOutcome> = outcomes
                .iter()
                .filter(|o| {
                    let idx = ((o.true_delay_us / width).floor().max(0.0) as usize).min(bins - 1);
                    idx == b
                })
                .collect();
            let accuracy = StatsSummary::from_values(members.iter().map(|o| o.accuracy_percent));
            DelayBinStats {
                low_us: b as f64 * width,
                high_us: (b + 1) as f64 * width,
                count: members.len(),
                error_us: StatsSummary::from_values(members.iter().map(|o| o.error_us)),
                mean_accuracy_percent: accuracy.map(|a| a.mean),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn outcome(true_delay_us: f64, error_us: f64) -> TrialOutcome {
        TrialOutcome {
            true_delay_us,
            estimated_delay_us: true_delay_us + error_us,
            error_us,
            accuracy_percent: 100.0 - error_us,
        }
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_abs_diff_eq!(percentile(&sorted, 50.0), 3.0);
        assert_abs_diff_eq!(percentile(&sorted, 25.0), 2.0);
        assert_abs_diff_eq!(percentile(&sorted, 90.0), 4.6, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&sorted, 100.0), 5.0);
        assert_eq!(percentile(&[7.0], 99.0), 7.0);
    }

    #[test]
    fn test_categories() {
        let mut categories = ErrorCategories::default();
        for e in [0.2, 0.99, 1.0, 4.9, 5.0, 12.0] {
            categories.record(e);
        }
        assert_eq!(
            categories,
            ErrorCategories {
                excellent: 2,
                good: 2,
                fair: 1,
                poor: 1
            }
        );
    }

    #[test]
    fn test_summary_bins() {
        let outcomes = vec![
            outcome(5.0, 0.5),
            outcome(20.0, 1.5),
            outcome(145.0, 2.0),
            outcome(140.0, 4.0),
        ];
        let summary = summarize(outcomes, 145.0, 10).unwrap();
        assert_eq!(summary.trials, 4);
        assert_eq!(summary.bins.len(), 10);
        assert_eq!(summary.bins[0].count, 1);
        assert_eq!(summary.bins[1].count, 1);
        // The top edge lands in the last bin
        assert_eq!(summary.bins[9].count, 2);
        assert_eq!(summary.bins[5].error_us, None);
        assert_abs_diff_eq!(summary.error_us.mean, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.error_us.max, 4.0);
        assert_abs_diff_eq!(summary.bins[9].mean_accuracy_percent.unwrap(), 97.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_trials_rejected() {
        let processor = DelayProcessor::new(&crate::DelayConfig::default()).unwrap();
        let config = TrialConfig {
            trials: 0,
            ..Default::default()
        };
        assert!(run_trials(&processor, &config).is_err());
    }
}
