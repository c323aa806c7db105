mod measure;
mod noise;
mod signal;

pub use measure::{
    DelayBinStats, ErrorCategories, ErrorPercentiles, StatsSummary, TrialConfig, TrialOutcome,
    TrialSummary, run_trial, run_trials,
};
pub use noise::{NoiseConfig, add_gaussian_noise, create_rng, signal_power};
pub use signal::{BurstConfig, SignalPair, TRAILING_ZEROS, generate_signal_pair};
