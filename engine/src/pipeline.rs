//! KQI Processing Pipeline
//!
//! Decode, resolve, aggregate and assemble in one synchronous call. The
//! pipeline holds no state between runs.

use crate::aggregation::{aggregate_unresolved, rollup_by_enodeb, rollup_by_tower};
use crate::decoder::IdentifierDecoder;
use crate::progress::{ProgressEvent, ProgressSink, Stage};
use crate::record::DecodedRecord;
use crate::report::{
    assemble_resolved, assemble_unresolved, ResolvedReportRow, UnresolvedReportRow,
};
use crate::resolver::{resolve, TowerIndex};
use crate::EngineError;
use common::{OperatorDirectory, RawRecord, RecordErrorPolicy, TowerMapping};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counts describing one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Raw records handed to the pipeline
    pub input_records: usize,
    /// Records dropped under [`RecordErrorPolicy::Skip`]
    pub skipped_records: usize,
    pub decoded_records: usize,
    pub resolved_records: usize,
    pub unresolved_records: usize,
    /// Distinct (operator, date, eNodeB) groups on the resolved branch
    pub enodeb_groups: usize,
    pub resolved_rows: usize,
    pub unresolved_rows: usize,
    /// Reference rows shadowed by an earlier row for the same eNodeB
    pub duplicate_towers: usize,
}

/// Both report tables and the run counts
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub resolved: Vec<ResolvedReportRow>,
    pub unresolved: Vec<UnresolvedReportRow>,
    pub stats: RunStats,
}

/// The resolution and aggregation pipeline
#[derive(Debug, Clone, Default)]
pub struct KqiPipeline {
    decoder: IdentifierDecoder,
    policy: RecordErrorPolicy,
}

impl KqiPipeline {
    /// Create a pipeline over an operator directory
    pub fn new(directory: OperatorDirectory) -> Self {
        Self {
            decoder: IdentifierDecoder::new(directory),
            policy: RecordErrorPolicy::default(),
        }
    }

    /// Set what happens to records that fail to decode
    pub fn with_policy(mut self, policy: RecordErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RecordErrorPolicy {
        self.policy
    }

    /// Run every stage over a batch of raw records
    pub fn run(
        &self,
        records: &[RawRecord],
        towers: &[TowerMapping],
        sink: &mut dyn ProgressSink,
    ) -> Result<PipelineOutput, EngineError> {
        if records.is_empty() {
            return Err(EngineError::NoRecords);
        }
        info!(
            "Processing {} KQI records against {} tower mappings",
            records.len(),
            towers.len()
        );
        let mut stats = RunStats {
            input_records: records.len(),
            ..RunStats::default()
        };

        let decoded = self.decode_all(records, &mut stats)?;
        stats.decoded_records = decoded.len();
        sink.emit(ProgressEvent::completed(
            Stage::Decode,
            format!("{} decoded, {} skipped", decoded.len(), stats.skipped_records),
        ));

        let index = TowerIndex::build(towers);
        stats.duplicate_towers = index.duplicates();
        let resolution = resolve(decoded, &index);
        stats.resolved_records = resolution.resolved.len();
        stats.unresolved_records = resolution.unresolved.len();
        info!(
            "Mapped records: {}, unmapped records: {}",
            stats.resolved_records, stats.unresolved_records
        );
        sink.emit(ProgressEvent::completed(
            Stage::Resolve,
            format!(
                "{} resolved, {} unresolved",
                stats.resolved_records, stats.unresolved_records
            ),
        ));

        let enodebs = rollup_by_enodeb(&resolution.resolved);
        stats.enodeb_groups = enodebs.len();
        let towers_rows = rollup_by_tower(&enodebs);
        debug!(
            "Resolved branch: {} eNodeB groups -> {} tower rows",
            enodebs.len(),
            towers_rows.len()
        );
        sink.emit(ProgressEvent::completed(
            Stage::AggregateResolved,
            format!("{} tower rows", towers_rows.len()),
        ));

        let unresolved_rows = aggregate_unresolved(&resolution.unresolved);
        sink.emit(ProgressEvent::completed(
            Stage::AggregateUnresolved,
            format!("{} eNodeB rows", unresolved_rows.len()),
        ));

        let output = PipelineOutput {
            resolved: assemble_resolved(&towers_rows),
            unresolved: assemble_unresolved(&unresolved_rows),
            stats: RunStats {
                resolved_rows: towers_rows.len(),
                unresolved_rows: unresolved_rows.len(),
                ..stats
            },
        };
        sink.emit(ProgressEvent::completed(
            Stage::Assemble,
            format!(
                "{} resolved rows, {} unresolved rows",
                output.stats.resolved_rows, output.stats.unresolved_rows
            ),
        ));

        info!(
            "Produced {} tower rows and {} unresolved rows",
            output.stats.resolved_rows, output.stats.unresolved_rows
        );
        Ok(output)
    }

    fn decode_all(
        &self,
        records: &[RawRecord],
        stats: &mut RunStats,
    ) -> Result<Vec<DecodedRecord>, EngineError> {
        let mut decoded = Vec::with_capacity(records.len());
        for raw in records {
            match DecodedRecord::decode(raw, &self.decoder) {
                Ok(record) => decoded.push(record),
                Err(err) => match self.policy {
                    RecordErrorPolicy::Abort => return Err(err),
                    RecordErrorPolicy::Skip => {
                        debug!("Skipping record: {}", err);
                        stats.skipped_records += 1;
                    }
                },
            }
        }
        if stats.skipped_records > 0 {
            warn!(
                "Skipped {} records that failed to decode",
                stats.skipped_records
            );
        }
        Ok(decoded)
    }
}
