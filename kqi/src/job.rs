//! Aggregation Job
//!
//! Drives one batch run: collect and extract input, load both tables, run the
//! engine on a blocking worker, save the reports and clean up.

use crate::config::{delimiter_byte, KqiConfig};
use anyhow::{Context, Result};
use common::OperatorDirectory;
use engine::{KqiPipeline, ProgressEvent, ProgressSink, RunStats};
use interfaces::{
    extract_archives, list_input_files, InterfaceError, RawReader, ReportPaths, ReportWriter,
    ScratchDir, TowerReader,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Steps logged as `[Step n/TOTAL_STEPS]`
pub const TOTAL_STEPS: usize = 10;

/// Engine stages are reported as steps 5 to 9
const ENGINE_STEP_OFFSET: usize = 4;

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub input_files: usize,
    pub raw_records: usize,
    /// Raw rows dropped while reading under the skip policy
    pub unreadable_rows: usize,
    pub tower_mappings: usize,
    pub dropped_tower_rows: usize,
    pub stats: RunStats,
    pub outputs: ReportPaths,
    pub elapsed_secs: f64,
}

/// Progress sink forwarding engine events to an async logger
struct ChannelSink(UnboundedSender<ProgressEvent>);

impl ProgressSink for ChannelSink {
    fn emit(&mut self, event: ProgressEvent) {
        if self.0.send(event).is_err() {
            debug!("Progress logger stopped");
        }
    }
}

fn step(n: usize, what: &str) {
    info!("[Step {}/{}] {}", n, TOTAL_STEPS, what);
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("Worker thread failed")?
}

fn spawn_progress_logger() -> (ChannelSink, JoinHandle<()>) {
    let (tx, mut rx) = unbounded_channel::<ProgressEvent>();
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            info!(
                "[Step {}/{}] {}: {}",
                event.step + ENGINE_STEP_OFFSET,
                TOTAL_STEPS,
                event.stage.label(),
                event.message
            );
        }
    });
    (ChannelSink(tx), handle)
}

/// Run the whole job; the scratch folder is removed on every exit path
pub async fn run_job(config: &KqiConfig) -> Result<JobSummary> {
    let started = Instant::now();
    config.validate()?;

    step(1, "Listing input files");
    let folder = config.input.folder.clone();
    let files = blocking(move || Ok(list_input_files(&folder)?)).await?;
    if files.is_empty() {
        return Err(InterfaceError::NoInputFiles(config.input.folder.clone()).into());
    }

    let mut scratch = ScratchDir::create(config.scratch_folder(), config.output.keep_extracted)?;
    let result = run_steps(config, files, scratch.path().to_path_buf()).await;
    info!("[Cleanup] Removing temporary files");
    scratch.cleanup();

    let mut summary = result?;
    summary.elapsed_secs = started.elapsed().as_secs_f64();
    Ok(summary)
}

async fn run_steps(config: &KqiConfig, files: Vec<PathBuf>, scratch: PathBuf) -> Result<JobSummary> {
    let input_files = files.len();

    step(2, "Extracting archives");
    let csv_files = blocking(move || Ok(extract_archives(&files, &scratch)?)).await?;

    step(3, "Loading raw records");
    let policy = config.processing.on_record_error;
    let raw_reader = RawReader::new(delimiter_byte(config.input.delimiter)?).with_policy(policy);
    let raw = blocking(move || Ok(raw_reader.read_files(&csv_files)?)).await?;

    step(4, "Loading tower mapping");
    let tower_reader = TowerReader::new(delimiter_byte(config.mapping.delimiter)?);
    let mapping_file = config.mapping.file.clone();
    let towers = blocking(move || {
        tower_reader
            .read_file(&mapping_file)
            .with_context(|| format!("Failed to load mapping file {}", mapping_file.display()))
    })
    .await?;

    let raw_records = raw.records.len();
    let tower_mappings = towers.mappings.len();
    let pipeline = KqiPipeline::new(OperatorDirectory::default()).with_policy(policy);
    let (mut sink, logger) = spawn_progress_logger();
    let records = raw.records;
    let mappings = towers.mappings;
    let output = blocking(move || Ok(pipeline.run(&records, &mappings, &mut sink)?)).await;
    // Logger ends once the worker drops the sink
    let _ = logger.await;
    let output = output?;

    step(10, "Saving reports");
    let writer = ReportWriter::new(&config.output.folder).with_prefixes(
        config.output.resolved_prefix.clone(),
        config.output.unresolved_prefix.clone(),
    );
    let (resolved, unresolved) = (output.resolved, output.unresolved);
    let outputs = blocking(move || Ok(writer.write(&resolved, &unresolved)?)).await?;

    Ok(JobSummary {
        input_files,
        raw_records,
        unreadable_rows: raw.skipped,
        tower_mappings,
        dropped_tower_rows: towers.dropped,
        stats: output.stats,
        outputs,
        elapsed_secs: 0.0,
    })
}
