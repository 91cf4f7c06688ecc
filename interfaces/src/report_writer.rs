//! Report Writer
//!
//! Serializes the resolved and unresolved tables to timestamped CSV files.

use crate::InterfaceError;
use chrono::Local;
use engine::{ResolvedReportRow, UnresolvedReportRow};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_RESOLVED_PREFIX: &str = "KQI_";
pub const DEFAULT_UNRESOLVED_PREFIX: &str = "kqi_unmapped_";

/// File name timestamp
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Files written by one run; `None` when the table was empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportPaths {
    pub resolved: Option<PathBuf>,
    pub unresolved: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    folder: PathBuf,
    resolved_prefix: String,
    unresolved_prefix: String,
}

impl ReportWriter {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            resolved_prefix: DEFAULT_RESOLVED_PREFIX.to_string(),
            unresolved_prefix: DEFAULT_UNRESOLVED_PREFIX.to_string(),
        }
    }

    pub fn with_prefixes(mut self, resolved: impl Into<String>, unresolved: impl Into<String>) -> Self {
        self.resolved_prefix = resolved.into();
        self.unresolved_prefix = unresolved.into();
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Write both tables stamped with the current local time
    pub fn write(
        &self,
        resolved: &[ResolvedReportRow],
        unresolved: &[UnresolvedReportRow],
    ) -> Result<ReportPaths, InterfaceError> {
        let stamp = Local::now().format(STAMP_FORMAT).to_string();
        self.write_stamped(resolved, unresolved, &stamp)
    }

    pub fn write_stamped(
        &self,
        resolved: &[ResolvedReportRow],
        unresolved: &[UnresolvedReportRow],
        stamp: &str,
    ) -> Result<ReportPaths, InterfaceError> {
        fs::create_dir_all(&self.folder).map_err(|e| InterfaceError::io(&self.folder, e))?;
        Ok(ReportPaths {
            resolved: self.write_table(&self.resolved_prefix, stamp, resolved)?,
            unresolved: self.write_table(&self.unresolved_prefix, stamp, unresolved)?,
        })
    }

    fn write_table<T: Serialize>(
        &self,
        prefix: &str,
        stamp: &str,
        rows: &[T],
    ) -> Result<Option<PathBuf>, InterfaceError> {
        let path = self.folder.join(format!("{}{}.csv", prefix, stamp));
        if rows.is_empty() {
            info!("No rows for {}; file not written", path.display());
            return Ok(None);
        }
        let mut writer = csv::Writer::from_path(&path).map_err(|e| InterfaceError::csv(&path, e))?;
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| InterfaceError::csv(&path, e))?;
        }
        writer.flush().map_err(|e| InterfaceError::io(&path, e))?;
        info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(Some(path))
    }
}
