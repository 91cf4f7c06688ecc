//! KQI File Interfaces
//!
//! Input collection, archive extraction, raw and reference table readers,
//! and the CSV report writer. All file I/O of the workspace lives here.

pub mod archive;
pub mod raw_reader;
pub mod report_writer;
pub mod scratch;
pub mod tower_reader;

use std::path::PathBuf;
use thiserror::Error;

pub use archive::{extract_archives, list_input_files};
pub use raw_reader::{RawReader, RawReadOutcome};
pub use report_writer::{ReportPaths, ReportWriter};
pub use scratch::ScratchDir;
pub use tower_reader::{TowerReadOutcome, TowerReader};

/// Interface errors
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required columns {missing:?}; found {available:?}")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Invalid row at {file}:{line}: {reason}")]
    InvalidRow {
        file: String,
        line: u64,
        reason: String,
    },

    #[error("No input files found in {0}")]
    NoInputFiles(PathBuf),

    #[error("Input folder does not exist: {0}")]
    InputFolderMissing(PathBuf),
}

impl InterfaceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
