use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use echodelay::DelayProcessor;
use echodelay::config::{DelayConfig, ErrorMetric, InterpolationMode, MaxDelay};
use echodelay::constants::MICROS_PER_SECOND;
use echodelay::output::{OutputFormat, create_formatter};
use echodelay::simulation::{BurstConfig, NoiseConfig, create_rng, generate_signal_pair};

#[derive(Parser, Debug)]
#[command(name = "simulate_delay")]
#[command(about = "Simulate one ultrasonic burst pair and estimate its delay", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// True delay in microseconds
    #[arg(short = 'd', long, default_value = "50")]
    delay_us: f64,

    /// Largest delay to record and search (e.g. "145us", "28samples")
    #[arg(long)]
    max_delay: Option<MaxDelay>,

    /// Gaussian noise standard deviation relative to the burst amplitude
    #[arg(short = 'n', long, default_value = "0.2")]
    noise: f64,

    /// Burst length in carrier cycles
    #[arg(long, default_value = "10")]
    cycles: u32,

    /// Random seed (random if omitted)
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Upsampling factor
    #[arg(short = 'u', long)]
    up_factor: Option<usize>,

    /// Window comparison score
    #[arg(short = 'm', long, value_enum)]
    metric: Option<ErrorMetric>,

    /// Use the Lanczos-windowed interpolator with this many samples per side
    #[arg(long)]
    windowed: Option<usize>,

    /// Do not pass the true delay to the estimator
    #[arg(long)]
    blind: bool,

    /// Output format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

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
    if let Some(max_delay) = args.max_delay {
        config.search.max_delay = Some(max_delay);
    }

    let processor = DelayProcessor::new(&config).context("Failed to build delay processor")?;

    let burst = BurstConfig {
        sample_rate_hz: config.sampling.sample_rate_hz,
        carrier_hz: config.sampling.carrier_hz,
        cycles: args.cycles,
        ..Default::default()
    };
    let max_delay_samples = processor
        .max_shift()
        .div_ceil(config.interpolation.up_factor);
    let delay_s = args.delay_us / MICROS_PER_SECOND;

    let mut rng = create_rng(args.seed);
    let mut pair = generate_signal_pair(&burst, delay_s, max_delay_samples)
        .context("Failed to generate signal pair")?;
    let noise = NoiseConfig::default().with_std_dev(args.noise);
    noise.apply(&mut pair.reference, &mut rng)?;
    noise.apply(&mut pair.candidate, &mut rng)?;

    log::info!(
        "Simulated {} cycle burst at {} Hz: reference {} samples, candidate {} samples",
        burst.cycles,
        burst.carrier_hz,
        pair.reference.len(),
        pair.candidate.len()
    );

    let truth = (!args.blind).then_some(delay_s);
    let measurement = processor
        .process(&pair.reference, &pair.candidate, truth)
        .context("Delay estimation failed")?;

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }
    println!("{}", formatter.format(&measurement));

    Ok(())
}
