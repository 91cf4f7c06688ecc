//! Common Types for KQI Aggregation
//!
//! Defines the record, counter and reference types shared by the engine and
//! the file interfaces

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::sync::Arc;

/// eNodeB identifier (20-bit, decoded from 5 hex digits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnodebId(pub u32);

impl EnodebId {
    /// Largest value representable by the 5-hex-digit field
    pub const MAX: u32 = 0xF_FFFF;

    /// Create a new eNodeB ID
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the eNodeB ID value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EnodebId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cell identity within an eNodeB (2 hex digits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(pub u8);

/// Operator label used when a PLMN is not in the directory
pub const UNKNOWN_OPERATOR: &str = "Unknown";

/// Where a raw record came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOrigin {
    /// Source file name
    pub file: Arc<str>,
    /// 1-based line number within the file
    pub line: u64,
}

impl RecordOrigin {
    /// Create an origin for a record
    pub fn new(file: Arc<str>, line: u64) -> Self {
        Self { file, line }
    }
}

impl fmt::Display for RecordOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// The ten counters summed during aggregation
///
/// Sums are kept as `f64`: exports sometimes carry fractional values and
/// very large sums must not overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Counters {
    /// TCP connect round-trip delay sum (ms)
    pub tcp_rtt: f64,
    /// Number of good round-trip samples
    pub tcp_rtt_good_count: f64,
    /// SYN to SYN-ACK delay sum (ms)
    pub tcp_rtt_step1: f64,
    /// Number of good step-1 samples
    pub tcp_rtt_step1_good_count: f64,
    /// Uplink packets lost, seen by the server probe
    pub server_ul_lost_pkt: f64,
    /// Downlink packets lost, seen by the server probe
    pub server_dl_lost_pkt: f64,
    /// Uplink packets lost, seen by the client probe
    pub client_ul_lost_pkt: f64,
    /// Downlink packets lost, seen by the client probe
    pub client_dl_lost_pkt: f64,
    /// Uplink TCP packets carrying payload
    pub tcp_ul_packets_with_payload: f64,
    /// Downlink TCP packets carrying payload
    pub tcp_dl_packets_with_payload: f64,
}

impl AddAssign for Counters {
    fn add_assign(&mut self, rhs: Self) {
        self.tcp_rtt += rhs.tcp_rtt;
        self.tcp_rtt_good_count += rhs.tcp_rtt_good_count;
        self.tcp_rtt_step1 += rhs.tcp_rtt_step1;
        self.tcp_rtt_step1_good_count += rhs.tcp_rtt_step1_good_count;
        self.server_ul_lost_pkt += rhs.server_ul_lost_pkt;
        self.server_dl_lost_pkt += rhs.server_dl_lost_pkt;
        self.client_ul_lost_pkt += rhs.client_ul_lost_pkt;
        self.client_dl_lost_pkt += rhs.client_dl_lost_pkt;
        self.tcp_ul_packets_with_payload += rhs.tcp_ul_packets_with_payload;
        self.tcp_dl_packets_with_payload += rhs.tcp_dl_packets_with_payload;
    }
}

impl Add for Counters {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl std::iter::Sum for Counters {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Per-record probe values that are carried but never summed
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeMetrics {
    pub e2e_delay_per_record: Option<f64>,
    pub streaming_download_throughput: Option<f64>,
    pub streaming_datatrans_duration: Option<f64>,
    pub streaming_dw_packets_size: Option<f64>,
    pub server_probe_dl_lost_rate: Option<f64>,
    pub server_probe_ul_lost_rate: Option<f64>,
    pub user_probe_dl_lost_rate: Option<f64>,
    pub user_probe_ul_lost_rate: Option<f64>,
    pub user_num: Option<f64>,
    pub syn_synack_delay_per_record: Option<f64>,
}

/// One raw measurement row
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Source file and line
    pub origin: RecordOrigin,
    /// Packed `YYYYMMDDHHMM` timestamp, possibly in float notation
    pub time_column: String,
    /// Collection batch number
    pub batch_no: Option<String>,
    /// Packed 12-digit cell identifier (CGI/SAI)
    pub cgisai: String,
    /// Summed counters
    pub counters: Counters,
    /// Carried probe values
    pub probes: ProbeMetrics,
}

/// Tower reference entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TowerMapping {
    /// Tower identifier (reported as SWE_L6)
    pub tower_id: String,
    /// Site label (reported as SWE_L5)
    pub swe_l5: String,
    /// eNodeB hosted by the tower
    pub enodeb_id: EnodebId,
}

/// What to do with a record that fails to decode or parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordErrorPolicy {
    /// Fail the whole run on the first bad record
    #[default]
    Abort,
    /// Drop the record and count it
    Skip,
}

impl std::str::FromStr for RecordErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("Invalid record error policy: {} (expected abort or skip)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(tcp_rtt: f64, good: f64) -> Counters {
        Counters {
            tcp_rtt,
            tcp_rtt_good_count: good,
            ..Counters::default()
        }
    }

    #[test]
    fn test_counters_add_assign() {
        let mut total = counters(100.0, 10.0);
        total += counters(150.0, 15.0);
        assert_eq!(total.tcp_rtt, 250.0);
        assert_eq!(total.tcp_rtt_good_count, 25.0);
        assert_eq!(total.server_ul_lost_pkt, 0.0);
    }

    #[test]
    fn test_counters_sum_every_field() {
        let one = Counters {
            tcp_rtt: 1.0,
            tcp_rtt_good_count: 2.0,
            tcp_rtt_step1: 3.0,
            tcp_rtt_step1_good_count: 4.0,
            server_ul_lost_pkt: 5.0,
            server_dl_lost_pkt: 6.0,
            client_ul_lost_pkt: 7.0,
            client_dl_lost_pkt: 8.0,
            tcp_ul_packets_with_payload: 9.0,
            tcp_dl_packets_with_payload: 10.0,
        };
        let total: Counters = std::iter::repeat(one).take(3).sum();
        assert_eq!(total.tcp_rtt, 3.0);
        assert_eq!(total.client_dl_lost_pkt, 24.0);
        assert_eq!(total.tcp_dl_packets_with_payload, 30.0);
    }

    #[test]
    fn test_fractional_and_large_sums() {
        let mut total = counters(100.5, 1.0);
        total += counters(149.5, 1.0);
        assert_eq!(total.tcp_rtt, 250.0);

        let big = counters(9_007_199_254_740_992.0, 1.0);
        let total: Counters = std::iter::repeat(big).take(2100).sum();
        assert!(total.tcp_rtt.is_finite());
        assert!(total.tcp_rtt > 1.8e19);
        assert_eq!(total.tcp_rtt_good_count, 2100.0);
    }

    #[test]
    fn test_empty_sum_is_zero() {
        let total: Counters = Vec::new().into_iter().sum();
        assert_eq!(total, Counters::default());
    }

    #[test]
    fn test_record_error_policy_from_str() {
        assert_eq!("abort".parse::<RecordErrorPolicy>().unwrap(), RecordErrorPolicy::Abort);
        assert_eq!(" Skip ".parse::<RecordErrorPolicy>().unwrap(), RecordErrorPolicy::Skip);
        assert!("ignore".parse::<RecordErrorPolicy>().is_err());
    }

    #[test]
    fn test_origin_display() {
        let origin = RecordOrigin::new(Arc::from("a.csv"), 7);
        assert_eq!(origin.to_string(), "a.csv:7");
    }
}
