//! Configuration for the echo delay estimator.
//!
//! All sections deserialize from TOML and fall back to the values used by the
//! 40 kHz / 192 kHz reference setup, so a file only needs the fields it changes:
//!
//! ```toml
//! [interpolation]
//! up_factor = 16
//!
//! [search]
//! max_delay = "120us"
//! metric = "absolute"
//! ```

use crate::constants::{DEFAULT_WINDOWED_SUPPORT, MICROS_PER_SECOND, SPEED_OF_SOUND_M_S};
use crate::delay::DelayGeometry;
use crate::error::{DelayError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Upper bound on the delay between the two channels
///
/// Can be given as a time or as a count of original-rate samples.
///
/// # Parsing formats
/// - `145` or `145us` or `145μs` - microseconds
/// - `0.5ms` - milliseconds
/// - `0.000145s` - seconds
/// - `28samples` - original-rate samples
///
/// # Example
/// ```
/// use echodelay::config::MaxDelay;
///
/// let max: MaxDelay = "145us".parse().unwrap();
/// // 145 μs at 1.536 MHz is 222.72 upsampled samples, rounded up
/// assert_eq!(max.to_interpolated_samples(192_000.0, 8).unwrap(), 223);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum MaxDelay {
    /// Delay in seconds
    Seconds(f64),
    /// Delay in original-rate samples
    Samples(usize),
}

impl MaxDelay {
    pub fn from_micros(us: f64) -> Self {
        Self::Seconds(us / MICROS_PER_SECOND)
    }

    /// Convert to a shift count on the upsampled grid
    ///
    /// Time values are converted at the upsampled rate and rounded up, so the
    /// delay itself always lies inside the searched range.
    ///
    /// # Errors
    /// Returns `DelayError::SearchRangeExhausted` for a negative or NaN delay,
    /// and `DelayError::InvalidInput` if the shift does not fit in `usize`.
    pub fn to_interpolated_samples(&self, sample_rate: f64, up_factor: usize) -> Result<usize> {
        let too_large = || {
            DelayError::InvalidInput(format!(
                "max delay {} is too large at {} Hz x{}",
                self, sample_rate, up_factor
            ))
        };

        match *self {
            MaxDelay::Samples(n) => n.checked_mul(up_factor).ok_or_else(too_large),
            MaxDelay::Seconds(s) => {
                let shift = (s * sample_rate * up_factor as f64).ceil();
                if !(shift >= 0.0) || shift.is_nan() {
                    return Err(DelayError::SearchRangeExhausted {
                        reference_len: 0,
                        candidate_len: 0,
                        max_shift: 0,
                    });
                }
                if shift >= usize::MAX as f64 {
                    return Err(too_large());
                }
                Ok(shift as usize)
            }
        }
    }
}

impl Default for MaxDelay {
    fn default() -> Self {
        Self::from_micros(145.0)
    }
}

impl fmt::Display for MaxDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxDelay::Seconds(s) => write!(f, "{:.3}us", s * MICROS_PER_SECOND),
            MaxDelay::Samples(n) => write!(f, "{}samples", n),
        }
    }
}

impl FromStr for MaxDelay {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(num) = s.strip_suffix("samples") {
            let n: usize = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid sample count: {}", s))?;
            return Ok(Self::Samples(n));
        }

        let (num, per_second) =
            if let Some(num) = s.strip_suffix("us").or_else(|| s.strip_suffix("μs")) {
                (num, MICROS_PER_SECOND)
            } else if let Some(num) = s.strip_suffix("ms") {
                (num, 1e3)
            } else if let Some(num) = s.strip_suffix('s') {
                (num, 1.0)
            } else {
                (s, MICROS_PER_SECOND)
            };

        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid delay: {}", s))?;
        if !(value >= 0.0) || !value.is_finite() {
            return Err("delay must be non-negative".to_string());
        }
        Ok(Self::Seconds(value / per_second))
    }
}

impl TryFrom<String> for MaxDelay {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// How the upsampler evaluates the reconstruction sum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Sum over every original sample (reference behaviour)
    #[default]
    Full,
    /// Lanczos-weighted sum over `support` samples on each side
    Windowed { support: usize },
}

impl InterpolationMode {
    pub fn windowed() -> Self {
        Self::Windowed {
            support: DEFAULT_WINDOWED_SUPPORT,
        }
    }
}

/// Score used to compare the reference against each shifted candidate window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMetric {
    /// Mean squared error
    #[default]
    Mse,
    /// Sum of absolute differences (lighter to compute on embedded targets)
    Absolute,
}

/// Complete estimator configuration
///
/// # Example
/// ```
/// use echodelay::config::DelayConfig;
///
/// let mut config = DelayConfig::default();
/// config.interpolation.up_factor = 16;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Acquisition parameters
    pub sampling: SamplingConfig,
    /// Bandpass filter design
    pub filter: FilterConfig,
    /// Upsampling
    pub interpolation: InterpolationConfig,
    /// Shift search
    pub search: SearchConfig,
    /// Receiver geometry, needed only for angle output
    pub geometry: Option<GeometryConfig>,
}

/// Acquisition parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Digitizer sample rate in Hz
    pub sample_rate_hz: f64,
    /// Nominal carrier frequency of the emitted burst in Hz
    pub carrier_hz: f64,
}

/// Bandpass filter design parameters
///
/// The filter runs at the upsampled rate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Lower cutoff in Hz
    pub low_cut_hz: f64,
    /// Upper cutoff in Hz
    pub high_cut_hz: f64,
    /// Number of taps (bumped to odd)
    pub num_taps: usize,
    /// Normalize passband gain at all
    pub normalize_gain: bool,
    /// Frequency for unit gain; the carrier when absent
    pub normalize_at_hz: Option<f64>,
}

/// Upsampling parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Integer upsampling factor
    pub up_factor: usize,
    /// Reconstruction mode
    pub mode: InterpolationMode,
}

/// Shift search parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Largest delay to search for; when absent the geometric maximum is
    /// used if geometry is configured, otherwise 145 μs
    pub max_delay: Option<MaxDelay>,
    /// Window comparison score
    pub metric: ErrorMetric,
}

/// Receiver geometry
#[derive(Debug, Clone, Deserialize)]
pub struct GeometryConfig {
    /// Distance between the two receivers in metres
    pub sensor_spacing_m: f64,
    /// Propagation speed in m/s
    #[serde(default = "default_speed_of_sound")]
    pub speed_of_sound_m_s: f64,
}

fn default_speed_of_sound() -> f64 {
    SPEED_OF_SOUND_M_S
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 192_000.0,
            carrier_hz: 40_000.0,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            low_cut_hz: 38_000.0,
            high_cut_hz: 42_000.0,
            num_taps: 101,
            normalize_gain: true,
            normalize_at_hz: None,
        }
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            up_factor: 8,
            mode: InterpolationMode::Full,
        }
    }
}

impl GeometryConfig {
    pub fn geometry(&self) -> Result<DelayGeometry> {
        DelayGeometry::new(self.sensor_spacing_m, self.speed_of_sound_m_s)
    }
}

impl DelayConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DelayError::Config(e.to_string()))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DelayError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Sample rate after upsampling
    pub fn interpolated_rate(&self) -> f64 {
        self.sampling.sample_rate_hz * self.interpolation.up_factor as f64
    }

    /// Frequency the filter gain is normalized at, if normalization is on
    pub fn normalization_frequency(&self) -> Option<f64> {
        if self.filter.normalize_gain {
            Some(
                self.filter
                    .normalize_at_hz
                    .unwrap_or(self.sampling.carrier_hz),
            )
        } else {
            None
        }
    }

    /// Effective maximum delay
    ///
    /// An explicit `search.max_delay` wins, then the geometric maximum
    /// `spacing / c`, then `MaxDelay::default()`.
    pub fn max_delay(&self) -> Result<MaxDelay> {
        if let Some(max_delay) = self.search.max_delay {
            return Ok(max_delay);
        }
        match &self.geometry {
            Some(geometry) => Ok(MaxDelay::Seconds(geometry.geometry()?.max_delay_s())),
            None => Ok(MaxDelay::default()),
        }
    }

    /// Maximum shift on the upsampled grid
    pub fn max_shift_samples(&self) -> Result<usize> {
        self.max_delay()?
            .to_interpolated_samples(self.sampling.sample_rate_hz, self.interpolation.up_factor)
    }

    /// Check cross-field consistency
    ///
    /// # Errors
    /// Cutoffs that do not fit the interpolated rate are
    /// `DelayError::InvalidFilterSpec`; other inconsistencies are `DelayError::Config`.
    pub fn validate(&self) -> Result<()> {
        let fs = self.sampling.sample_rate_hz;
        if !(fs > 0.0) || !fs.is_finite() {
            return Err(DelayError::Config(format!(
                "sample rate must be positive, got {}",
                fs
            )));
        }
        if self.interpolation.up_factor < 1 {
            return Err(DelayError::Config(
                "interpolation.up_factor must be at least 1".to_string(),
            ));
        }
        let nyquist = self.interpolated_rate() / 2.0;
        if self.filter.high_cut_hz > nyquist {
            return Err(DelayError::InvalidFilterSpec(format!(
                "filter high cut {} Hz exceeds interpolated Nyquist {} Hz",
                self.filter.high_cut_hz, nyquist
            )));
        }
        if self.filter.low_cut_hz >= self.filter.high_cut_hz {
            return Err(DelayError::InvalidFilterSpec(format!(
                "filter low cut {} Hz must be below high cut {} Hz",
                self.filter.low_cut_hz, self.filter.high_cut_hz
            )));
        }
        if let Some(geometry) = &self.geometry {
            geometry.geometry()?;
        }
        self.max_delay()?;
        Ok(())
    }
}
