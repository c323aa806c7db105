use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use echodelay::DelayProcessor;
use echodelay::config::{DelayConfig, ErrorMetric, InterpolationMode, MaxDelay};
use echodelay::simulation::{TrialConfig, TrialSummary, run_trials};

#[derive(Parser, Debug)]
#[command(name = "delay_trials")]
#[command(about = "Monte-Carlo accuracy sweep of the delay estimator", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Number of trials
    #[arg(short = 't', long, default_value = "100")]
    trials: usize,

    /// Base seed; trial i uses seed + i
    #[arg(short = 's', long, default_value = "0")]
    seed: u64,

    /// Largest simulated delay in microseconds
    #[arg(long, default_value = "145")]
    max_delay_us: f64,

    /// Number of delay bins in the breakdown
    #[arg(short = 'b', long, default_value = "10")]
    bins: usize,

    /// Gaussian noise standard deviation relative to the burst amplitude
    #[arg(short = 'n', long, default_value = "0.2")]
    noise: f64,

    /// Upsampling factor
    #[arg(short = 'u', long)]
    up_factor: Option<usize>,

    /// Window comparison score
    #[arg(short = 'm', long, value_enum)]
    metric: Option<ErrorMetric>,

    /// Use the Lanczos-windowed interpolator with this many samples per side
    #[arg(long)]
    windowed: Option<usize>,

    /// Emit the summary as JSON
    #[arg(long)]
    json: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => DelayConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DelayConfig::default(),
    };
    if let Some(up_factor) = args.up_factor {
        config.interpolation.up_factor = up_factor;
    }
    if let Some(metric) = args.metric {
        config.search.metric = metric;
    }
    if let Some(support) = args.windowed {
        config.interpolation.mode = InterpolationMode::Windowed { support };
    }
    config.search.max_delay = Some(MaxDelay::from_micros(args.max_delay_us));

    let processor = DelayProcessor::new(&config).context("Failed to build delay processor")?;

    let mut trial_config = TrialConfig {
        max_delay_us: args.max_delay_us,
        trials: args.trials,
        seed: args.seed,
        delay_bins: args.bins,
        ..Default::default()
    };
    trial_config.burst.sample_rate_hz = config.sampling.sample_rate_hz;
    trial_config.burst.carrier_hz = config.sampling.carrier_hz;
    trial_config.noise = trial_config.noise.with_std_dev(args.noise);

    let summary = run_trials(&processor, &trial_config).context("Trial run failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn print_summary(summary: &TrialSummary) {
    let pct = |n: usize| 100.0 * n as f64 / summary.trials as f64;
    let e = &summary.error_us;
    let a = &summary.accuracy_percent;
    let p = &summary.percentiles;
    let c = &summary.categories;

    println!("Trials: {}", summary.trials);
    println!("Error: {:.3} ± {:.3} us (min {:.3}, max {:.3})", e.mean, e.std_dev, e.min, e.max);
    println!("Accuracy: {:.1} ± {:.1}%", a.mean, a.std_dev);
    println!(
        "Error percentiles: p25 {:.3}  p50 {:.3}  p75 {:.3}  p90 {:.3}  p95 {:.3}  p99 {:.3} us",
        p.p25, p.median, p.p75, p.p90, p.p95, p.p99
    );
    println!("  Excellent (<1 us): {:>5} ({:.1}%)", c.excellent, pct(c.excellent));
    println!("  Good (1-5 us):     {:>5} ({:.1}%)", c.good, pct(c.good));
    println!("  Fair (5-10 us):    {:>5} ({:.1}%)", c.fair, pct(c.fair));
    println!("  Poor (>=10 us):    {:>5} ({:.1}%)", c.poor, pct(c.poor));

    println!("Delay bins:");
    for bin in &summary.bins {
        match (&bin.error_us, bin.mean_accuracy_percent) {
            (Some(err), Some(acc)) => println!(
                "  {:>7.1}-{:<7.1} us: {:>4} trials, error {:.3} ± {:.3} us, accuracy {:.1}%",
                bin.low_us, bin.high_us, bin.count, err.mean, err.std_dev, acc
            ),
            _ => println!("  {:>7.1}-{:<7.1} us: no trials", bin.low_us, bin.high_us),
        }
    }
}
