//! Direct-form linear convolution.

use crate::error::{DelayError, Result};
use crate::signal_processing::FilterKernel;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Full linear convolution, length `signal.len() + kernel.len() - 1`
///
/// Each input sample adds its scaled copy of the kernel into the output.
/// Returns an empty vector if either input is empty.
pub fn convolve_full(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }

    let mut output = vec![0.0; signal.len() + kernel.len() - 1];
    for (n, &x) in signal.iter().enumerate() {
        for (acc, &h) in output[n..n + kernel.len()].iter_mut().zip(kernel) {
            *acc += x * h;
        }
    }
    output
}

/// Convolve and keep the centered window of the input's length
///
/// Drops `kernel.half_len()` samples from each end of the full convolution,
/// so output sample `i` is aligned with input sample `i`.
///
/// # Errors
/// Returns `DelayError::InvalidInput` if `signal` is empty.
pub fn convolve_same(signal: &[f64], kernel: &FilterKernel) -> Result<Vec<f64>> {
    if signal.is_empty() {
        return Err(DelayError::InvalidInput(
            "cannot filter an empty signal".to_string(),
        ));
    }

    let half = kernel.half_len();

    #[cfg(not(feature = "parallel"))]
    let output = {
        let full = convolve_full(signal, kernel.taps());
        full[half..half + signal.len()].to_vec()
    };

    #[cfg(feature = "parallel")]
    let output = (0..signal.len())
        .into_par_iter()
        .map(|i| same_sample(signal, kernel.taps(), i + half))
        .collect();

    Ok(output)
}

/// Output sample `m` of the full convolution, computed on its own
#[cfg(feature = "parallel")]
fn same_sample(signal: &[f64], taps: &[f64], m: usize) -> f64 {
    let first = m.saturating_sub(taps.len() - 1);
    let last = m.min(signal.len() - 1);
    (first..=last).map(|n| signal[n] * taps[m - n]).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_full_convolution_values() {
        let y = convolve_full(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]);
        let expected = [0.0, 1.0, 2.5, 4.0, 1.5];
        assert_eq!(y.len(), expected.len());
        for (a, b) in y.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_full_convolution_empty() {
        assert!(convolve_full(&[], &[1.0]).is_empty());
        assert!(convolve_full(&[1.0], &[]).is_empty());
    }

    #[test]
    fn test_same_length_invariance() {
        let kernel = FilterKernel::bandpass(38_000.0, 42_000.0, 192_000.0, 101, None).unwrap();
        for len in [1, 2, 7, 50, 101, 102, 500] {
            let x: Vec<f64> = (0..len).map(|i| (i as f64 * 0.3).sin()).collect();
            let y = convolve_same(&x, &kernel).unwrap();
            assert_eq!(y.len(), len);
        }
    }

    #[test]
    fn test_identity_kernel() {
        let kernel = FilterKernel::from_taps(vec![0.0, 1.0, 0.0]).unwrap();
        let x = [1.0, -2.0, 3.5, 0.25];
        let y = convolve_same(&x, &kernel).unwrap();
        for (a, b) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_same_is_centered() {
        // Impulse in the middle comes back at the same index, spread by the kernel
        let kernel = FilterKernel::from_taps(vec![0.25, 0.5, 0.25]).unwrap();
        let mut x = vec![0.0; 9];
        x[4] = 1.0;
        let y = convolve_same(&x, &kernel).unwrap();
        assert_abs_diff_eq!(y[3], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(y[4], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(y[5], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(y.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_signal_rejected() {
        let kernel = FilterKernel::from_taps(vec![1.0]).unwrap();
        assert!(matches!(
            convolve_same(&[], &kernel),
            Err(DelayError::InvalidInput(_))
        ));
    }
}
