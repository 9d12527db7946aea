//! KNX Bus Logger CLI Application
//!
//! Connects to a knxd daemon and prints one line per group telegram:
//!
//! ```text
//! 2024-03-09 12:05:07 Write FROM 1.1.5 TO 1/1/1 (Kitchen light) VALUE ON
//! ```
//!
//! Group names and datapoint types come from an optional ETS group address
//! export. Diagnostics go to stderr; stdout carries only telegram lines.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use knx_log_decoder::{monitor, BusUrl, Decoder, DecoderError, KnxdConnection, TelegramSource};
use std::io;
use std::path::PathBuf;
use std::process;

mod config;

/// KNX Bus Logger - print telegrams observed on a KNX bus
#[derive(Parser, Debug)]
#[command(name = "knx-log")]
#[command(about = "Log KNX group telegrams received from a knxd server", long_about = None)]
#[command(version)]
struct Args {
    /// knxd URL: ip:<host>[:<port>] or local:<socket path>
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Group address file exported from ETS (CSV)
    #[arg(value_name = "GROUP_FILE")]
    group_file: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many telegrams
    #[arg(long, value_name = "COUNT")]
    max_telegrams: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args) {
        eprintln!("{:#}", e);
        process::exit(1);
    }
}

/// Connect, then log telegrams until the bus connection fails
fn run(args: Args) -> Result<()> {
    log::info!("KNX Bus Logger v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", knx_log_decoder::VERSION);

    let file_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::AppConfig::default(),
    };
    let app_config = file_config.merge(args.url, args.group_file, args.max_telegrams);

    let url = app_config
        .url
        .as_deref()
        .ok_or_else(|| anyhow!("usage: knx-log <URL> [GROUP_FILE]"))?;
    let url = BusUrl::parse(url).context("Open failed")?;

    let connection = KnxdConnection::connect(&url).map_err(|e| match e {
        DecoderError::GroupSocket(_) => anyhow::Error::new(e).context("Connect failed"),
        other => anyhow::Error::new(other).context("Open failed"),
    })?;

    let monitor_config = app_config.monitor_config();
    let decoder = Decoder::from_config(&monitor_config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let count = monitor::run(&decoder, connection.telegrams(), &mut out, &monitor_config)
        .map_err(|e| {
            let context = match e {
                DecoderError::InvalidPacket(_) => "Invalid Packet",
                DecoderError::Directory(_) => "Group lookup failed",
                _ => "Read failed",
            };
            anyhow::Error::new(e).context(context)
        })?;

    log::info!("Logged {} telegram(s)", count);
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
