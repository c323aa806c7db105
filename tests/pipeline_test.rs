mod test_signals;

use approx::assert_abs_diff_eq;
use echodelay::config::{ErrorMetric, GeometryConfig, InterpolationMode};
use echodelay::simulation::{BurstConfig, generate_signal_pair};
use echodelay::{DelayConfig, DelayError, DelayProcessor};

const FS: f64 = 192_000.0;
const UP: usize = 8;

/// One step of the upsampled grid in microseconds
fn grid_step_us() -> f64 {
    1e6 / (FS * UP as f64)
}

#[test]
fn test_fractional_delay_recovered_within_one_grid_step() {
    let processor = DelayProcessor::new(&DelayConfig::default()).unwrap();
    let pair = generate_signal_pair(&BurstConfig::default(), 50e-6, 28).unwrap();

    let measurement = processor
        .process(&pair.reference, &pair.candidate, Some(50e-6))
        .unwrap();
    let estimate = &measurement.estimate;

    assert!(
        (estimate.delay_us() - 50.0).abs() <= grid_step_us(),
        "estimated {:.3} us (shift {}), expected 50 us",
        estimate.delay_us(),
        estimate.best_shift
    );
    let accuracy = estimate.accuracy.unwrap();
    assert!(accuracy.accuracy_percent > 98.0);
    assert!(accuracy.percent_error.is_some());
    assert!(estimate.confidence.unwrap() > 0.0);
}

#[test]
fn test_zero_delay() {
    let processor = DelayProcessor::new(&DelayConfig::default()).unwrap();
    let reference = test_signals::tone_burst(FS, 40_000.0, 10);
    let candidate = test_signals::delayed(&reference, 0, 28);

    let measurement = processor.process(&reference, &candidate, Some(0.0)).unwrap();
    assert_eq!(measurement.estimate.best_shift, 0);
    assert_eq!(measurement.estimate.delay_seconds, 0.0);
    assert_abs_diff_eq!(measurement.estimate.min_error, 0.0, epsilon = 1e-20);

    let accuracy = measurement.estimate.accuracy.unwrap();
    assert_eq!(accuracy.percent_error, None);
    assert_eq!(accuracy.accuracy_percent, 95.0);
}

#[test]
fn test_whole_sample_delay_is_exact() {
    let processor = DelayProcessor::new(&DelayConfig::default()).unwrap();
    let reference = test_signals::tone_burst(FS, 40_000.0, 10);
    let candidate = test_signals::delayed(&reference, 7, 28);

    let measurement = processor.process(&reference, &candidate, Some(7.0 / FS)).unwrap();
    assert_eq!(measurement.estimate.best_shift, 7 * UP);
    assert_abs_diff_eq!(measurement.estimate.delay_samples, 7.0, epsilon = 1e-12);
    assert_abs_diff_eq!(measurement.estimate.min_error, 0.0, epsilon = 1e-20);
    assert_abs_diff_eq!(
        measurement.estimate.accuracy.unwrap().accuracy_percent,
        100.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_curve_covers_whole_search_range() {
    let processor = DelayProcessor::new(&DelayConfig::default()).unwrap();
    let reference = test_signals::tone_burst(FS, 40_000.0, 10);
    let candidate = test_signals::delayed(&reference, 3, 28);

    let measurement = processor.process(&reference, &candidate, None).unwrap();
    let curve = &measurement.search.curve;
    // 145 us rounds up to shift 223, inside the 224 the candidate allows
    assert_eq!(processor.max_shift(), 223);
    assert_eq!(curve.len(), processor.max_shift() + 1);
    assert!(curve.windows(2).all(|w| w[1].shift == w[0].shift + 1));
    assert_eq!(measurement.estimate.accuracy, None);
    assert!(!measurement.search.on_boundary());
}

#[test]
fn test_short_candidate_limits_search() {
    let processor = DelayProcessor::new(&DelayConfig::default()).unwrap();
    let reference = test_signals::tone_burst(FS, 40_000.0, 10);
    let candidate = test_signals::delayed(&reference, 2, 5);

    let measurement = processor.process(&reference, &candidate, None).unwrap();
    assert_eq!(measurement.search.last_shift(), Some(5 * UP));
    assert_eq!(measurement.estimate.best_shift, 2 * UP);
}

#[test]
fn test_windowed_mode_agrees_with_full() {
    let full = DelayProcessor::new(&DelayConfig::default()).unwrap();
    let mut config = DelayConfig::default();
    config.interpolation.mode = InterpolationMode::windowed();
    let windowed = DelayProcessor::new(&config).unwrap();

    let reference = test_signals::tone_burst(FS, 40_000.0, 10);
    let candidate = test_signals::delayed(&reference, 7, 28);
    let full_shift = full.process(&reference, &candidate, None).unwrap();
    let windowed_shift = windowed.process(&reference, &candidate, None).unwrap();
    assert_eq!(full_shift.estimate.best_shift, 7 * UP);
    assert_eq!(windowed_shift.estimate.best_shift, 7 * UP);

    let pair = generate_signal_pair(&BurstConfig::default(), 50e-6, 28).unwrap();
    let full_frac = full.process(&pair.reference, &pair.candidate, None).unwrap();
    let windowed_frac = windowed.process(&pair.reference, &pair.candidate, None).unwrap();
    assert!(
        (windowed_frac.estimate.delay_us() - 50.0).abs() < 1.5,
        "windowed estimate {:.3} us",
        windowed_frac.estimate.delay_us()
    );
    assert!(
        full_frac
            .estimate
            .best_shift
            .abs_diff(windowed_frac.estimate.best_shift)
            <= 1
    );
}

#[test]
fn test_absolute_metric() {
    let mut config = DelayConfig::default();
    config.search.metric = ErrorMetric::Absolute;
    let processor = DelayProcessor::new(&config).unwrap();

    let reference = test_signals::tone_burst(FS, 40_000.0, 10);
    let candidate = test_signals::delayed(&reference, 11, 28);
    let measurement = processor.process(&reference, &candidate, None).unwrap();
    assert_eq!(measurement.estimate.best_shift, 11 * UP);
    assert_abs_diff_eq!(measurement.estimate.min_error, 0.0, epsilon = 1e-12);
}

#[test]
fn test_noisy_measurement_is_close() {
    let processor = DelayProcessor::new(&DelayConfig::default()).unwrap();
    let clean = test_signals::tone_burst(FS, 40_000.0, 10);
    let reference = test_signals::noisy(&clean, 0.05, 1);
    let candidate = test_signals::noisy(&test_signals::delayed(&clean, 9, 28), 0.05, 2);

    let measurement = processor.process(&reference, &candidate, None).unwrap();
    let error_us = (measurement.estimate.delay_us() - 9.0 / FS * 1e6).abs();
    assert!(error_us < 2.0, "error {:.3} us", error_us);
}

#[test]
fn test_geometry_adds_angle() {
    let mut config = DelayConfig::default();
    config.geometry = Some(GeometryConfig {
        sensor_spacing_m: 0.05,
        speed_of_sound_m_s: 343.0,
    });
    let processor = DelayProcessor::new(&config).unwrap();
    assert_eq!(processor.max_shift(), 28 * UP);

    let reference = test_signals::tone_burst(FS, 40_000.0, 10);
    let candidate = test_signals::delayed(&reference, 7, 28);
    let measurement = processor.process(&reference, &candidate, None).unwrap();

    let expected = (7.0 / FS * 343.0 / 0.05_f64).asin().to_degrees();
    assert_abs_diff_eq!(measurement.angle_degrees.unwrap(), expected, epsilon = 1e-9);
}

#[test]
fn test_empty_and_short_inputs() {
    let processor = DelayProcessor::new(&DelayConfig::default()).unwrap();
    let reference = test_signals::tone_burst(FS, 40_000.0, 10);

    assert!(matches!(
        processor.process(&reference, &[], None),
        Err(DelayError::InvalidInput(_))
    ));
    assert!(matches!(
        processor.process(&reference, &reference[..30], None),
        Err(DelayError::SearchRangeExhausted { .. })
    ));
}

#[test]
fn test_end_fire_delay_is_searched() {
    let mut config = DelayConfig::default();
    config.geometry = Some(GeometryConfig {
        sensor_spacing_m: 0.0343,
        speed_of_sound_m_s: 343.0,
    });
    let processor = DelayProcessor::new(&config).unwrap();
    // 100 us is 153.6 upsampled samples
    assert_eq!(processor.max_shift(), 154);

    let pair = generate_signal_pair(&BurstConfig::default(), 100e-6, 20).unwrap();
    let measurement = processor
        .process(&pair.reference, &pair.candidate, Some(100e-6))
        .unwrap();
    assert!(
        (measurement.estimate.delay_us() - 100.0).abs() <= grid_step_us(),
        "estimated {:.3} us (shift {})",
        measurement.estimate.delay_us(),
        measurement.estimate.best_shift
    );
}

#[test]
fn test_silent_channels_have_no_confidence() {
    let processor = DelayProcessor::new(&DelayConfig::default()).unwrap();
    let reference = vec![0.0; 68];
    let candidate = vec![0.0; 96];

    let measurement = processor.process(&reference, &candidate, None).unwrap();
    assert_eq!(measurement.estimate.best_shift, 0);
    assert_eq!(measurement.estimate.confidence, Some(0.0));
    assert!(measurement.search.secondary_minimum().is_some());
}
