use std::f64::consts::PI;

/// Carrier burst with a `1 - exp(-t / tau)` attack, followed by 20 zeros
pub fn tone_burst(sample_rate: f64, carrier_hz: f64, cycles: u32) -> Vec<f64> {
    let duration = cycles as f64 / carrier_hz;
    let tau = 0.1 * duration;
    let n = (duration * sample_rate).round() as usize;

    let mut samples: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (1.0 - (-t / tau).exp()) * (2.0 * PI * carrier_hz * t).sin()
        })
        .collect();
    samples.extend(std::iter::repeat_n(0.0, 20));
    samples
}

/// `signal` delayed by whole samples inside a buffer `extra` samples longer
pub fn delayed(signal: &[f64], delay_samples: usize, extra: usize) -> Vec<f64> {
    let mut out = vec![0.0; signal.len() + extra];
    out[delay_samples..delay_samples + signal.len()].copy_from_slice(signal);
    out
}
