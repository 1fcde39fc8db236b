//! I2C Sniffer - Main Entry Point
//!
//! Replays captured sample words (hex, one or more per line) from a file or
//! stdin through the capture/render pipeline and writes tokens to stdout.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use capture::SampleSource;
use clap::Parser;
use handoff::Shutdown;
use render::{MonotonicClock, RenderMode};
use sniffer::{init_logging, HexLineSource, Pipeline, SnifferConfig};
use tracing::info;

/// I2C bus sniffer
#[derive(Parser)]
#[command(name = "sniffer")]
#[command(about = "Decode captured I2C bus samples into START/DATA/STOP tokens", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sample input file (reads stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Print every field of each sample instead of compact tokens
    #[arg(long)]
    raw: bool,

    /// Omit the microsecond timestamp before START
    #[arg(long)]
    no_timestamps: bool,

    /// Print the final capture/render counters as JSON on stderr
    #[arg(long)]
    stats: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        SnifferConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.raw {
        config.render.mode = RenderMode::Raw;
    }
    if cli.no_timestamps {
        config.render.timestamps = false;
    }

    let level = match cli.verbose {
        0 => config.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    init_logging(&level)?;

    info!("=== I2C Sniffer v{} ===", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    let handler_shutdown = shutdown.clone();
    ctrlc::set_handler(move || handler_shutdown.request())
        .context("Failed to set Ctrl-C handler")?;

    let source: Box<dyn SampleSource + Send> = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            info!("Reading samples from {}", path.display());
            Box::new(HexLineSource::new(BufReader::new(file))?)
        }
        None => {
            info!("Reading samples from stdin");
            Box::new(HexLineSource::new(BufReader::new(io::stdin()))?)
        }
    };

    let handle = Pipeline::new(config)?.spawn(
        source,
        MonotonicClock::new(),
        BufWriter::new(io::stdout()),
        shutdown,
    )?;

    let report = handle.join()?;
    info!(
        "Captured {} samples, rendered {} events, dropped {}",
        report.capture.captured, report.render.events, report.capture.dropped
    );
    if cli.stats {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
