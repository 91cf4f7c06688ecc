//! Raw Measurement Column Layout
//!
//! The raw KQI export has no header; each position carries a fixed field.

use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Column positions of the headerless raw export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive, Serialize, Deserialize)]
pub enum RawColumn {
    TimeColumn = 0,
    BatchNo = 1,
    Cgisai = 2,
    E2eDelayPerRecord = 3,
    TcpRtt = 4,
    TcpRttGoodCount = 5,
    StreamingDownloadThroughput = 6,
    StreamingDatatransDuration = 7,
    StreamingDwPacketsSize = 8,
    ServerProbeDlLostRatePer = 9,
    ServerProbeUlLostRatePer = 10,
    UserProbeDlLostRatePer = 11,
    UserProbeUlLostRatePer = 12,
    ServerProbeUlLostPkt = 13,
    ServerProbeDwLostPkt = 14,
    UserProbeDwLostPkt = 15,
    UserProbeUlLostPkt = 16,
    TcpUlPackagesWithPl = 17,
    TcpDlPackagesWithPl = 18,
    UserNum = 19,
    SynSynackDelayPerRecord = 20,
    TcpRttStep1 = 21,
    TcpRttStep1GoodCount = 22,
}

impl RawColumn {
    /// Number of columns in the layout
    pub const COUNT: usize = 23;

    /// Position of the column in a raw row
    pub fn index(self) -> usize {
        self as usize
    }

    /// Field name used in logs and error messages
    pub fn name(self) -> &'static str {
        match self {
            RawColumn::TimeColumn => "timecolumn",
            RawColumn::BatchNo => "batchno",
            RawColumn::Cgisai => "cgisai",
            RawColumn::E2eDelayPerRecord => "e2e_delay_per_record",
            RawColumn::TcpRtt => "tcp_rtt",
            RawColumn::TcpRttGoodCount => "tcp_rtt_good_count",
            RawColumn::StreamingDownloadThroughput => "streaming_download_throughput",
            RawColumn::StreamingDatatransDuration => "streaming_datatrans_duration",
            RawColumn::StreamingDwPacketsSize => "streaming_dw_packets_size",
            RawColumn::ServerProbeDlLostRatePer => "server_probe_dl_lost_rate_per",
            RawColumn::ServerProbeUlLostRatePer => "server_probe_ul_lost_rate_per",
            RawColumn::UserProbeDlLostRatePer => "user_probe_dl_lost_rate_per",
            RawColumn::UserProbeUlLostRatePer => "user_probe_ul_lost_rate_per",
            RawColumn::ServerProbeUlLostPkt => "server_probe_ul_lost_pkt",
            RawColumn::ServerProbeDwLostPkt => "server_probe_dw_lost_pkt",
            RawColumn::UserProbeDwLostPkt => "user_probe_dw_lost_pkt",
            RawColumn::UserProbeUlLostPkt => "user_probe_ul_lost_pkt",
            RawColumn::TcpUlPackagesWithPl => "tcp_ul_packages_withpl",
            RawColumn::TcpDlPackagesWithPl => "tcp_dl_packages_withpl",
            RawColumn::UserNum => "user_num",
            RawColumn::SynSynackDelayPerRecord => "syn_synack_delay_per_record",
            RawColumn::TcpRttStep1 => "tcp_rtt_step1",
            RawColumn::TcpRttStep1GoodCount => "tcp_rtt_step1_good_count",
        }
    }

    /// Whether the column is one of the ten summed counters
    pub fn is_summed(self) -> bool {
        matches!(
            self,
            RawColumn::TcpRtt
                | RawColumn::TcpRttGoodCount
                | RawColumn::ServerProbeUlLostPkt
                | RawColumn::ServerProbeDwLostPkt
                | RawColumn::UserProbeDwLostPkt
                | RawColumn::UserProbeUlLostPkt
                | RawColumn::TcpUlPackagesWithPl
                | RawColumn::TcpDlPackagesWithPl
                | RawColumn::TcpRttStep1
                | RawColumn::TcpRttStep1GoodCount
        )
    }
}
