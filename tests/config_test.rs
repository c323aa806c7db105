mod test_signals;

use echodelay::config::{ErrorMetric, InterpolationMode};
use echodelay::{DelayConfig, DelayError, DelayProcessor};

const FS: f64 = 192_000.0;

#[test]
fn test_toml_drives_processor() {
    let config = DelayConfig::from_toml_str(
        r#"
        [interpolation]
        up_factor = 4

        [search]
        max_delay = "100us"
        metric = "absolute"
        "#,
    )
    .unwrap();
    assert_eq!(config.search.metric, ErrorMetric::Absolute);

    let processor = DelayProcessor::new(&config).unwrap();
    // 100 us at 768 kHz is 76.8 upsampled samples, rounded up
    assert_eq!(processor.max_shift(), 77);
    assert_eq!(processor.interpolated_rate(), FS * 4.0);

    let reference = test_signals::tone_burst(FS, 40_000.0, 10);
    let candidate = test_signals::delayed(&reference, 7, 28);
    let measurement = processor.process(&reference, &candidate, None).unwrap();
    assert_eq!(measurement.estimate.best_shift, 28);
    assert_eq!(measurement.search.last_shift(), Some(77));
}

#[test]
fn test_windowed_mode_from_toml() {
    let config = DelayConfig::from_toml_str(
        r#"
        [interpolation.mode]
        type = "windowed"
        support = 4
        "#,
    )
    .unwrap();
    assert_eq!(
        config.interpolation.mode,
        InterpolationMode::Windowed { support: 4 }
    );
    assert!(DelayProcessor::new(&config).is_ok());
}

#[test]
fn test_invalid_filter_in_toml() {
    let config = DelayConfig::from_toml_str(
        r#"
        [filter]
        low_cut_hz = 45000.0
        high_cut_hz = 42000.0
        "#,
    )
    .unwrap();
    assert!(matches!(
        DelayProcessor::new(&config),
        Err(DelayError::InvalidFilterSpec(_))
    ));
}

#[test]
fn test_malformed_toml() {
    assert!(matches!(
        DelayConfig::from_toml_str("[search]\nmax_delay = \"lots\""),
        Err(DelayError::Config(_))
    ));
}
