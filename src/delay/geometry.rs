use crate::error::{DelayError, Result};

/// Rounding slack allowed when the delay sits exactly at the geometric maximum
const RATIO_TOLERANCE: f64 = 1e-9;

/// Two receivers a fixed distance apart in a medium of known sound speed
///
/// A plane wave arriving at angle θ from broadside reaches the far receiver
/// `spacing * sin(θ) / c` seconds after the near one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayGeometry {
    spacing_m: f64,
    speed_m_s: f64,
}

impl DelayGeometry {
    /// # Errors
    /// Returns `DelayError::InvalidInput` unless both values are positive and finite.
    pub fn new(spacing_m: f64, speed_m_s: f64) -> Result<Self> {
        if !(spacing_m > 0.0) || !spacing_m.is_finite() {
            return Err(DelayError::InvalidInput(format!(
                "sensor spacing must be positive, got {} m",
                spacing_m
            )));
        }
        if !(speed_m_s > 0.0) || !speed_m_s.is_finite() {
            return Err(DelayError::InvalidInput(format!(
                "speed of sound must be positive, got {} m/s",
                speed_m_s
            )));
        }
        Ok(Self {
            spacing_m,
            speed_m_s,
        })
    }

    /// Largest delay the geometry allows (wave arriving end-fire)
    pub fn max_delay_s(&self) -> f64 {
        self.spacing_m / self.speed_m_s
    }

    /// Extra path length travelled to the far receiver
    pub fn path_difference_m(&self, delay_s: f64) -> f64 {
        delay_s * self.speed_m_s
    }

    /// Arrival angle from broadside in degrees
    ///
    /// # Errors
    /// Returns `DelayError::InvalidInput` if the delay exceeds what the spacing allows.
    pub fn angle_degrees(&self, delay_s: f64) -> Result<f64> {
        let ratio = self.path_difference_m(delay_s) / self.spacing_m;
        if !ratio.is_finite() || ratio.abs() > 1.0 + RATIO_TOLERANCE {
            return Err(DelayError::InvalidInput(format!(
                "delay {:.3e} s exceeds geometric maximum {:.3e} s",
                delay_s,
                self.max_delay_s()
            )));
        }
        Ok(ratio.clamp(-1.0, 1.0).asin().to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_angles() {
        let geometry = DelayGeometry::new(0.05, 343.0).unwrap();
        assert_abs_diff_eq!(geometry.angle_degrees(0.0).unwrap(), 0.0, epsilon = 1e-12);
        let half = geometry.max_delay_s() / 2.0;
        assert_abs_diff_eq!(geometry.angle_degrees(half).unwrap(), 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(geometry.angle_degrees(-half).unwrap(), -30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            geometry.angle_degrees(geometry.max_delay_s()).unwrap(),
            90.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_delay_beyond_geometry_rejected() {
        let geometry = DelayGeometry::new(0.05, 343.0).unwrap();
        let too_long = geometry.max_delay_s() * 1.01;
        assert!(matches!(
            geometry.angle_degrees(too_long),
            Err(DelayError::InvalidInput(_))
        ));
        assert!(geometry.angle_degrees(f64::NAN).is_err());
    }

    #[test]
    fn test_path_difference() {
        let geometry = DelayGeometry::new(0.1, 343.0).unwrap();
        assert_abs_diff_eq!(geometry.path_difference_m(100e-6), 0.0343, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(DelayGeometry::new(0.0, 343.0).is_err());
        assert!(DelayGeometry::new(0.05, -1.0).is_err());
    }
}
