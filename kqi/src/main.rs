//! KQI Aggregator Main Application
//!
//! Batch job turning raw per-record KQI exports into daily per-tower reports.

mod config;
mod job;

use anyhow::Result;
use clap::Parser;
use common::RecordErrorPolicy;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use config::{KqiConfig, Overrides};

/// Config file read when `--config` is not given
const DEFAULT_CONFIG: &str = "kqi.toml";

/// KQI tower aggregator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder with raw `*.csv.gz` / `*.csv` exports
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Tower reference table
    #[arg(short, long)]
    mapping: Option<PathBuf>,

    /// Output folder for the reports
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// What to do with malformed records (abort, skip)
    #[arg(long)]
    on_record_error: Option<RecordErrorPolicy>,

    /// Keep decompressed input after the run
    #[arg(long)]
    keep_extracted: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config_path, explicit) = match &args.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };
    let mut config = KqiConfig::load(&config_path, explicit)?;
    config.apply(Overrides {
        input: args.input,
        mapping: args.mapping,
        output: args.output,
        log_level: args.log_level,
        on_record_error: args.on_record_error,
        keep_extracted: args.keep_extracted,
    });

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .init();

    info!("Starting KQI aggregator");
    info!("Configuration:");
    info!("  Input folder: {}", config.input.folder.display());
    info!("  Mapping file: {}", config.mapping.file.display());
    info!("  Output folder: {}", config.output.folder.display());
    info!("  On record error: {:?}", config.processing.on_record_error);

    let summary = tokio::select! {
        result = job::run_job(&config) => match result {
            Ok(summary) => summary,
            Err(e) => {
                error!("Processing failed: {:#}", e);
                return Err(e);
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            return Err(anyhow::anyhow!("Interrupted"));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let stats = &summary.stats;
        info!("Processing complete in {:.2}s", summary.elapsed_secs);
        info!("  Input files: {}", summary.input_files);
        info!("  Raw records: {}", summary.raw_records);
        info!("  Skipped records: {}", stats.skipped_records + summary.unreadable_rows);
        info!("  Mapped records: {}", stats.resolved_records);
        info!("  Unmapped records: {}", stats.unresolved_records);
        info!("  Tower rows: {}", stats.resolved_rows);
        info!("  Unmapped eNodeB rows: {}", stats.unresolved_rows);
        match &summary.outputs.resolved {
            Some(path) => info!("  Report: {}", path.display()),
            None => info!("  Report: not written (no mapped rows)"),
        }
        match &summary.outputs.unresolved {
            Some(path) => info!("  Unmapped report: {}", path.display()),
            None => info!("  Unmapped report: not written (no unmapped rows)"),
        }
    }

    Ok(())
}
