//! Bandlimited (sinc) upsampling evaluated directly in the time domain.

use crate::config::InterpolationMode;
use crate::error::{DelayError, Result};
use crate::signal::SampleSequence;
use crate::signal_processing::math::sinc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Upsample `signal` by an integer factor using sinc reconstruction
///
/// The output grid holds `(N - 1) * up_factor + 1` samples at
/// `sample_rate * up_factor`, so every original sample instant is also an
/// output instant (output index `i * up_factor` is original index `i`).
///
/// `InterpolationMode::Full` sums over all `N` inputs for every output sample.
/// `InterpolationMode::Windowed` truncates the sum to a Lanczos-weighted
/// neighbourhood and normalizes by the weight sum.
///
/// # Errors
/// Returns `DelayError::InvalidInput` if `signal` is empty, `up_factor` is 0,
/// the sample rate is not positive, or a windowed support of 0 is requested.
pub fn sinc_interpolate(
    signal: &[f64],
    sample_rate: f64,
    up_factor: usize,
    mode: InterpolationMode,
) -> Result<SampleSequence> {
    if signal.is_empty() {
        return Err(DelayError::InvalidInput(
            "cannot interpolate an empty signal".to_string(),
        ));
    }
    if up_factor < 1 {
        return Err(DelayError::InvalidInput(format!(
            "upsampling factor must be at least 1, got {}",
            up_factor
        )));
    }
    if let InterpolationMode::Windowed { support: 0 } = mode {
        return Err(DelayError::InvalidInput(
            "windowed interpolation support must be at least 1".to_string(),
        ));
    }

    let output_len = (signal.len() - 1) * up_factor + 1;
    let up = up_factor as f64;

    let evaluate = |m: usize| {
        // Position of output sample m measured in original sample periods
        let u = m as f64 / up;
        match mode {
            InterpolationMode::Full => full_sum(signal, u),
            InterpolationMode::Windowed { support } => windowed_sum(signal, u, support),
        }
    };

    #[cfg(not(feature = "parallel"))]
    let samples: Vec<f64> = (0..output_len).map(evaluate).collect();

    #[cfg(feature = "parallel")]
    let samples: Vec<f64> = (0..output_len).into_par_iter().map(evaluate).collect();

    log::trace!(
        "Interpolated {} -> {} samples ({:?}, x{})",
        signal.len(),
        output_len,
        mode,
        up_factor
    );

    SampleSequence::new(samples, sample_rate * up)
}

fn full_sum(signal: &[f64], u: f64) -> f64 {
    signal
        .iter()
        .enumerate()
        .map(|(n, &x)| x * sinc(u - n as f64))
        .sum()
}

fn windowed_sum(signal: &[f64], u: f64, support: usize) -> f64 {
    let a = support as f64;
    let center = u.floor() as usize;
    let start = center.saturating_sub(support);
    let end = (center + support).min(signal.len() - 1);

    let mut acc = 0.0;
    let mut weight_sum = 0.0;
    for (i, &x) in signal.iter().enumerate().take(end + 1).skip(start) {
        let t = u - i as f64;
        if t.abs() >= a {
            continue;
        }
        let w = sinc(t) * sinc(t / a);
        acc += x * w;
        weight_sum += w;
    }

    if weight_sum != 0.0 {
        acc / weight_sum
    } else {
        0.0
    }
}
