use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::signal;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use um25c_lib::constants::DEFAULT_BAUD_RATE;
use um25c_lib::{OutputMode, Sampler, SamplerConfig, Shutdown, Template, TimeBase, TokenSet, Um25c, serial};

/// Periodically sample a UM25C USB power meter over its serial link and print
/// one formatted line per reading.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial device the meter is bound to
    #[arg(short, long, default_value = "/dev/rfcomm0")]
    device: String,
    /// Line speed for USB serial adapters; ignored by RFCOMM
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,
    /// Output template; Time, Volt, Amp, Watt, Temp, SumWatt and SumAmp are replaced
    #[arg(short, long, default_value = "Volt, Amp")]
    format: String,
    /// Also substitute TempF, DPlus, DMinus, Ohm and Group in the template
    #[arg(long)]
    extended_tokens: bool,
    /// Seconds between samples
    #[arg(short, long, default_value_t = 1.0)]
    interval: f64,
    /// Stop after this many samples
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    count: Option<u64>,
    /// Print each reading as a JSON object instead of using the template
    #[arg(long)]
    json: bool,
    /// Timestamp readings with Unix time instead of time since start
    #[arg(long)]
    unix_time: bool,
    /// Clear the active group's sums before sampling
    #[arg(long)]
    clear: bool,
    /// Select this data group before sampling
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
    group: Option<u8>,
    /// Optional path to a file to write logs to, in addition to stderr.
    #[arg(short, long)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

impl Cli {
    fn sampler_config(&self) -> Result<SamplerConfig> {
        let mut config = SamplerConfig::new(&self.format, self.interval)
            .with_context(|| format!("Invalid sampling interval: {}", self.interval))?;
        if self.json {
            config.output = OutputMode::Json;
        } else if self.extended_tokens {
            config.output = OutputMode::Text(Template::with_tokens(&self.format, TokenSet::Extended));
        }
        if self.unix_time {
            config.time_base = TimeBase::Unix;
        }
        config.count = self.count;
        config.select_group = self.group;
        config.clear_sums = self.clear;
        Ok(config)
    }
}

fn setup_logging(
    log_file_path: Option<&PathBuf>,
    verbosity: &Verbosity<InfoLevel>,
) -> Result<Option<WorkerGuard>> {
    // stdout carries the samples, so diagnostics go to stderr
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .without_time();

    let (file_layer, guard) = if let Some(path) = log_file_path {
        let log_file = File::create(path)
            .with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file_path {
        info!("Logging to file: {:?}", path);
    }

    Ok(guard)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = match setup_logging(cli.log_file.as_ref(), &cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{:?}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Sampling failed: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = cli.sampler_config()?;

    let port = serial::open(&cli.device, cli.baud)
        .with_context(|| format!("Failed to open serial device {}", cli.device))?;

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C received, shutting down gracefully."),
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
        trigger.request();
    });

    let mut sampler = Sampler::new(Um25c::new(port), config, shutdown);
    let mut stdout = tokio::io::stdout();
    let summary = sampler.run(&mut stdout).await.context("Sampling loop aborted")?;
    debug!(?summary, "Run complete");

    Ok(())
}
