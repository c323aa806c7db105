use std::f64::consts::PI;

/// Normalized sinc: `sin(πx) / (πx)`, with the `x = 0` limit returned as exactly 1.
pub fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Hamming window coefficient `k` of a window of length `len`
pub fn hamming(k: usize, len: usize) -> f64 {
    if len <= 1 {
        return 1.0;
    }
    0.54 - 0.46 * (2.0 * PI * k as f64 / (len - 1) as f64).cos()
}

/// Mean squared error between two equal-length slices
///
/// Only the overlapping prefix is compared if lengths differ.
pub fn mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    sum / n as f64
}

/// Sum of absolute differences between two equal-length slices
pub fn absolute_difference(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}
