//! Raw Record Reader
//!
//! Reads headerless delimited KQI exports. Positions map to fields through
//! [`RawColumn`]; missing trailing cells read as empty.

use crate::InterfaceError;
use common::{
    parse_counter, parse_optional_f64, Counters, ProbeMetrics, RawColumn, RawRecord,
    RecordErrorPolicy, RecordOrigin,
};
use csv::{ReaderBuilder, StringRecord};
use num_traits::FromPrimitive;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Default field separator of the raw export
pub const DEFAULT_RAW_DELIMITER: u8 = b'|';

/// Records read from one or more files
#[derive(Debug, Default)]
pub struct RawReadOutcome {
    pub records: Vec<RawRecord>,
    /// Rows dropped under [`RecordErrorPolicy::Skip`]
    pub skipped: usize,
}

impl RawReadOutcome {
    fn absorb(&mut self, other: RawReadOutcome) {
        self.records.extend(other.records);
        self.skipped += other.skipped;
    }
}

/// Reader for the raw KQI layout
#[derive(Debug, Clone, Copy)]
pub struct RawReader {
    delimiter: u8,
    policy: RecordErrorPolicy,
}

impl Default for RawReader {
    fn default() -> Self {
        Self::new(DEFAULT_RAW_DELIMITER)
    }
}

impl RawReader {
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            policy: RecordErrorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RecordErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Read and concatenate every file in order
    pub fn read_files(&self, paths: &[PathBuf]) -> Result<RawReadOutcome, InterfaceError> {
        let mut outcome = RawReadOutcome::default();
        for path in paths {
            outcome.absorb(self.read_file(path)?);
        }
        if outcome.skipped > 0 {
            warn!("Skipped {} malformed raw rows", outcome.skipped);
        }
        info!(
            "Loaded {} raw records from {} files",
            outcome.records.len(),
            paths.len()
        );
        Ok(outcome)
    }

    pub fn read_file(&self, path: &Path) -> Result<RawReadOutcome, InterfaceError> {
        let file = std::fs::File::open(path).map_err(|e| InterfaceError::io(path, e))?;
        let label: Arc<str> = Arc::from(path.display().to_string());
        let outcome = self.read_from(file, label)?;
        debug!("Read {} rows from {}", outcome.records.len(), path.display());
        Ok(outcome)
    }

    /// Read rows from any source; `file` labels record origins
    pub fn read_from<R: Read>(&self, source: R, file: Arc<str>) -> Result<RawReadOutcome, InterfaceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(source);

        let mut outcome = RawReadOutcome::default();
        let mut wide_rows = 0usize;
        let mut row = StringRecord::new();
        loop {
            let more = reader
                .read_record(&mut row)
                .map_err(|e| InterfaceError::csv(&*file, e))?;
            if !more {
                break;
            }
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            let origin = RecordOrigin::new(Arc::clone(&file), line);

            if RawColumn::from_usize(row.len().saturating_sub(1)).is_none() {
                wide_rows += 1;
            }
            match parse_row(&row, origin) {
                Ok(record) => outcome.records.push(record),
                Err(reason) => match self.policy {
                    RecordErrorPolicy::Abort => {
                        return Err(InterfaceError::InvalidRow {
                            file: file.to_string(),
                            line,
                            reason,
                        })
                    }
                    RecordErrorPolicy::Skip => {
                        debug!("Skipping {}:{}: {}", file, line, reason);
                        outcome.skipped += 1;
                    }
                },
            }
        }
        if wide_rows > 0 {
            debug!(
                "{} rows in {} carry more than {} columns; extra cells ignored",
                wide_rows,
                file,
                RawColumn::COUNT
            );
        }
        Ok(outcome)
    }
}

fn cell(row: &StringRecord, column: RawColumn) -> &str {
    row.get(column.index()).unwrap_or("").trim()
}

fn counter(row: &StringRecord, column: RawColumn) -> Result<f64, String> {
    parse_counter(cell(row, column)).map_err(|e| format!("{}: {}", column.name(), e))
}

/// Carried probe values never fail a row
fn probe(row: &StringRecord, column: RawColumn) -> Option<f64> {
    match parse_optional_f64(cell(row, column)) {
        Ok(value) => value,
        Err(e) => {
            trace!("Ignoring {}: {}", column.name(), e);
            None
        }
    }
}

fn parse_row(row: &StringRecord, origin: RecordOrigin) -> Result<RawRecord, String> {
    if row.len() <= RawColumn::Cgisai.index() {
        return Err(format!(
            "expected at least {} fields, found {}",
            RawColumn::Cgisai.index() + 1,
            row.len()
        ));
    }
    let batch_no = cell(row, RawColumn::BatchNo);

    let counters = Counters {
        tcp_rtt: counter(row, RawColumn::TcpRtt)?,
        tcp_rtt_good_count: counter(row, RawColumn::TcpRttGoodCount)?,
        tcp_rtt_step1: counter(row, RawColumn::TcpRttStep1)?,
        tcp_rtt_step1_good_count: counter(row, RawColumn::TcpRttStep1GoodCount)?,
        server_ul_lost_pkt: counter(row, RawColumn::ServerProbeUlLostPkt)?,
        server_dl_lost_pkt: counter(row, RawColumn::ServerProbeDwLostPkt)?,
        client_ul_lost_pkt: counter(row, RawColumn::UserProbeUlLostPkt)?,
        client_dl_lost_pkt: counter(row, RawColumn::UserProbeDwLostPkt)?,
        tcp_ul_packets_with_payload: counter(row, RawColumn::TcpUlPackagesWithPl)?,
        tcp_dl_packets_with_payload: counter(row, RawColumn::TcpDlPackagesWithPl)?,
    };

    let probes = ProbeMetrics {
        e2e_delay_per_record: probe(row, RawColumn::E2eDelayPerRecord),
        streaming_download_throughput: probe(row, RawColumn::StreamingDownloadThroughput),
        streaming_datatrans_duration: probe(row, RawColumn::StreamingDatatransDuration),
        streaming_dw_packets_size: probe(row, RawColumn::StreamingDwPacketsSize),
        server_probe_dl_lost_rate: probe(row, RawColumn::ServerProbeDlLostRatePer),
        server_probe_ul_lost_rate: probe(row, RawColumn::ServerProbeUlLostRatePer),
        user_probe_dl_lost_rate: probe(row, RawColumn::UserProbeDlLostRatePer),
        user_probe_ul_lost_rate: probe(row, RawColumn::UserProbeUlLostRatePer),
        user_num: probe(row, RawColumn::UserNum),
        syn_synack_delay_per_record: probe(row, RawColumn::SynSynackDelayPerRecord),
    };

    Ok(RawRecord {
        origin,
        time_column: cell(row, RawColumn::TimeColumn).to_string(),
        batch_no: (!batch_no.is_empty()).then(|| batch_no.to_string()),
        cgisai: cell(row, RawColumn::Cgisai).to_string(),
        counters,
        probes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Full-width row with distinct counter values
    const FULL_ROW: &str =
        "202510011230|7|510101234501|12.5|100|10|1.0|2.0|3.0|0.1|0.2|0.3|0.4|1|2|3|4|500|800|9|4.5|60|6";

    fn read(body: &str, policy: RecordErrorPolicy) -> Result<RawReadOutcome, InterfaceError> {
        RawReader::default()
            .with_policy(policy)
            .read_from(body.as_bytes(), Arc::from("test.csv"))
    }

    #[test]
    fn test_full_row() {
        let outcome = read(FULL_ROW, RecordErrorPolicy::Abort).unwrap();
        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.time_column, "202510011230");
        assert_eq!(record.batch_no.as_deref(), Some("7"));
        assert_eq!(record.cgisai, "510101234501");
        assert_eq!(record.origin.line, 1);

        let c = record.counters;
        assert_eq!(c.tcp_rtt, 100.0);
        assert_eq!(c.tcp_rtt_good_count, 10.0);
        assert_eq!(c.server_ul_lost_pkt, 1.0);
        assert_eq!(c.server_dl_lost_pkt, 2.0);
        assert_eq!(c.client_dl_lost_pkt, 3.0);
        assert_eq!(c.client_ul_lost_pkt, 4.0);
        assert_eq!(c.tcp_ul_packets_with_payload, 500.0);
        assert_eq!(c.tcp_dl_packets_with_payload, 800.0);
        assert_eq!(c.tcp_rtt_step1, 60.0);
        assert_eq!(c.tcp_rtt_step1_good_count, 6.0);

        assert_eq!(record.probes.e2e_delay_per_record, Some(12.5));
        assert_eq!(record.probes.user_num, Some(9.0));
    }

    #[test]
    fn test_short_row_reads_missing_cells_as_empty() {
        let outcome = read("202510011230||510101234501|1|5", RecordErrorPolicy::Abort).unwrap();
        let record = &outcome.records[0];
        assert_eq!(record.batch_no, None);
        assert_eq!(record.counters.tcp_rtt, 5.0);
        assert_eq!(record.counters.tcp_dl_packets_with_payload, 0.0);
        assert_eq!(record.probes.e2e_delay_per_record, Some(1.0));
    }

    #[test]
    fn test_fractional_counters_are_kept() {
        let outcome = read(
            "202510011230|7|510101234501||100.5|10|||||||||||0.25",
            RecordErrorPolicy::Abort,
        )
        .unwrap();
        let c = outcome.records[0].counters;
        assert_eq!(c.tcp_rtt, 100.5);
        assert_eq!(c.tcp_rtt_good_count, 10.0);
        assert_eq!(c.client_ul_lost_pkt, 0.25);
    }

    #[test]
    fn test_bad_counter_aborts_with_location() {
        let body = format!("{}\n202510011230|7|510101234501||abc", FULL_ROW);
        let err = read(&body, RecordErrorPolicy::Abort).unwrap_err();
        match err {
            InterfaceError::InvalidRow { file, line, reason } => {
                assert_eq!(file, "test.csv");
                assert_eq!(line, 2);
                assert!(reason.contains("tcp_rtt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_skip_policy_counts_rows() {
        let body = format!("{}\n202510011230|7|510101234501||-4\n202510011230", FULL_ROW);
        let outcome = read(&body, RecordErrorPolicy::Skip).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn test_read_files_concatenates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "202510011230|1|510101234501\n").unwrap();
        std::fs::write(&b, "202510021230|2|510101234502\n202510021231|3|510101234503\n").unwrap();

        let outcome = RawReader::default().read_files(&[a, b]).unwrap();
        let ids: Vec<&str> = outcome.records.iter().map(|r| r.cgisai.as_str()).collect();
        assert_eq!(ids, vec!["510101234501", "510101234502", "510101234503"]);
        assert_eq!(outcome.records[2].origin.line, 2);
    }
}
