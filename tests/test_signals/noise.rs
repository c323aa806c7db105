use echodelay::simulation::{add_gaussian_noise, create_rng};

/// Copy of `signal` with seeded Gaussian noise added
pub fn noisy(signal: &[f64], std_dev: f64, seed: u64) -> Vec<f64> {
    let mut out = signal.to_vec();
    add_gaussian_noise(&mut out, std_dev, &mut create_rng(Some(seed)))
        .expect("valid noise level");
    out
}
