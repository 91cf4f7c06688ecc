//! KQI Resolution and Aggregation Engine
//!
//! This crate turns raw per-record KQI measurements into daily per-tower and
//! per-unresolved-eNodeB quality summaries. It performs no I/O.

pub mod aggregation;
pub mod decoder;
pub mod kpi;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod report;
pub mod resolver;
pub mod temporal;

use common::RecordOrigin;
use thiserror::Error;

pub use decoder::{IdentifierDecoder, NetworkIdentifier};
pub use pipeline::{KqiPipeline, PipelineOutput, RunStats};
pub use progress::{NullSink, ProgressEvent, ProgressSink, Stage};
pub use record::DecodedRecord;
pub use report::{ResolvedReportRow, UnresolvedReportRow, RESOLVED_COLUMNS, UNRESOLVED_COLUMNS};
pub use temporal::Timestamp;

/// Errors raised by the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid cell identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("Invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("No KQI records to process")]
    NoRecords,

    #[error("Record {origin}: {source}")]
    Record {
        origin: RecordOrigin,
        source: Box<EngineError>,
    },
}

impl EngineError {
    pub(crate) fn identifier(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn timestamp(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the origin of the record that failed
    pub fn at(self, origin: &RecordOrigin) -> Self {
        Self::Record {
            origin: origin.clone(),
            source: Box::new(self),
        }
    }
}
