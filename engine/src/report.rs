//! Report Assembly
//!
//! Output rows for the resolved (per tower) and unresolved (per eNodeB)
//! tables. Field order and serde names are the column contract.

use crate::aggregation::{AggregatedRow, TowerKey, UnresolvedKey};
use crate::kpi::{national_label, Kpis};
use crate::temporal::format_date;
use common::{Counters, MAX_EXACT_F64};
use serde::{Serialize, Serializer};

/// Header of the resolved table
pub const RESOLVED_COLUMNS: [&str; 22] = [
    "Opr",
    "Date",
    "NATIONAL",
    "SWE_L5",
    "SWE_L6",
    "E2E Delay(ms)",
    "TCP Connect Delay(ms)",
    "TCP Connect RTT Count(times)",
    "SYN-SYN ACK Delay(ms)",
    "TCP Connect Step1 Delay(ms)",
    "TCP Connect RTT Step1 Count(times)",
    "SYN ACK-ACK Delay(ms)",
    "Server Side Uplink TCP Packet Loss Rate(%)",
    "Server Side Uplink TCP Packet Losses(Packets)",
    "TCP Uplink Packets (with Payload)(Packets)",
    "Server Side Downlink TCP Packet Loss Rate(%)",
    "Server Side Downlink TCP Packet Losses",
    "TCP Downlink Packets (with Payload)(Packets)",
    "Client Side Uplink TCP Packet Loss Rate(%)",
    "Client Side Uplink TCP Packet Losses(Packets)",
    "Client Side Downlink TCP Packet Loss Rate(%)",
    "Client Side Downlink TCP Packet Losses(Packets)",
];

/// Header of the unresolved table
pub const UNRESOLVED_COLUMNS: [&str; 22] = [
    "Opr",
    "Date",
    "NATIONAL",
    "PLMN",
    "eNodeBID",
    "E2E Delay(ms)",
    "TCP Connect Delay(ms)",
    "TCP Connect RTT Count(times)",
    "SYN-SYN ACK Delay(ms)",
    "TCP Connect Step1 Delay(ms)",
    "TCP Connect RTT Step1 Count(times)",
    "SYN ACK-ACK Delay(ms)",
    "Server Side Uplink TCP Packet Loss Rate(%)",
    "Server Side Uplink TCP Packet Losses(Packets)",
    "TCP Uplink Packets (with Payload)(Packets)",
    "Server Side Downlink TCP Packet Loss Rate(%)",
    "Server Side Downlink TCP Packet Losses",
    "TCP Downlink Packets (with Payload)(Packets)",
    "Client Side Uplink TCP Packet Loss Rate(%)",
    "Client Side Uplink TCP Packet Losses(Packets)",
    "Client Side Downlink TCP Packet Loss Rate(%)",
    "Client Side Downlink TCP Packet Losses(Packets)",
];

/// One daily row per operator and tower
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedReportRow {
    #[serde(rename = "Opr")]
    pub operator: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "NATIONAL")]
    pub national: String,
    #[serde(rename = "SWE_L5")]
    pub swe_l5: String,
    #[serde(rename = "SWE_L6")]
    pub tower_id: String,
    #[serde(rename = "E2E Delay(ms)")]
    pub e2e_delay_ms: i64,
    #[serde(rename = "TCP Connect Delay(ms)", serialize_with = "serialize_sum")]
    pub tcp_connect_delay_ms: f64,
    #[serde(rename = "TCP Connect RTT Count(times)", serialize_with = "serialize_sum")]
    pub tcp_connect_rtt_count: f64,
    #[serde(rename = "SYN-SYN ACK Delay(ms)")]
    pub syn_synack_delay_ms: i64,
    #[serde(rename = "TCP Connect Step1 Delay(ms)", serialize_with = "serialize_sum")]
    pub tcp_connect_step1_delay_ms: f64,
    #[serde(rename = "TCP Connect RTT Step1 Count(times)", serialize_with = "serialize_sum")]
    pub tcp_connect_rtt_step1_count: f64,
    #[serde(rename = "SYN ACK-ACK Delay(ms)")]
    pub synack_ack_delay_ms: i64,
    #[serde(rename = "Server Side Uplink TCP Packet Loss Rate(%)")]
    pub server_ul_loss_rate: f64,
    #[serde(rename = "Server Side Uplink TCP Packet Losses(Packets)", serialize_with = "serialize_sum")]
    pub server_ul_losses: f64,
    #[serde(rename = "TCP Uplink Packets (with Payload)(Packets)", serialize_with = "serialize_sum")]
    pub tcp_ul_packets: f64,
    #[serde(rename = "Server Side Downlink TCP Packet Loss Rate(%)")]
    pub server_dl_loss_rate: f64,
    #[serde(rename = "Server Side Downlink TCP Packet Losses", serialize_with = "serialize_sum")]
    pub server_dl_losses: f64,
    #[serde(rename = "TCP Downlink Packets (with Payload)(Packets)", serialize_with = "serialize_sum")]
    pub tcp_dl_packets: f64,
    #[serde(rename = "Client Side Uplink TCP Packet Loss Rate(%)")]
    pub client_ul_loss_rate: f64,
    #[serde(rename = "Client Side Uplink TCP Packet Losses(Packets)", serialize_with = "serialize_sum")]
    pub client_ul_losses: f64,
    #[serde(rename = "Client Side Downlink TCP Packet Loss Rate(%)")]
    pub client_dl_loss_rate: f64,
    #[serde(rename = "Client Side Downlink TCP Packet Losses(Packets)", serialize_with = "serialize_sum")]
    pub client_dl_losses: f64,
}

/// One daily row per operator, eNodeB and PLMN without a tower
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedReportRow {
    #[serde(rename = "Opr")]
    pub operator: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "NATIONAL")]
    pub national: String,
    #[serde(rename = "PLMN")]
    pub plmn: String,
    #[serde(rename = "eNodeBID")]
    pub enodeb_id: u32,
    #[serde(rename = "E2E Delay(ms)")]
    pub e2e_delay_ms: i64,
    #[serde(rename = "TCP Connect Delay(ms)", serialize_with = "serialize_sum")]
    pub tcp_connect_delay_ms: f64,
    #[serde(rename = "TCP Connect RTT Count(times)", serialize_with = "serialize_sum")]
    pub tcp_connect_rtt_count: f64,
    #[serde(rename = "SYN-SYN ACK Delay(ms)")]
    pub syn_synack_delay_ms: i64,
    #[serde(rename = "TCP Connect Step1 Delay(ms)", serialize_with = "serialize_sum")]
    pub tcp_connect_step1_delay_ms: f64,
    #[serde(rename = "TCP Connect RTT Step1 Count(times)", serialize_with = "serialize_sum")]
    pub tcp_connect_rtt_step1_count: f64,
    #[serde(rename = "SYN ACK-ACK Delay(ms)")]
    pub synack_ack_delay_ms: i64,
    #[serde(rename = "Server Side Uplink TCP Packet Loss Rate(%)")]
    pub server_ul_loss_rate: f64,
    #[serde(rename = "Server Side Uplink TCP Packet Losses(Packets)", serialize_with = "serialize_sum")]
    pub server_ul_losses: f64,
    #[serde(rename = "TCP Uplink Packets (with Payload)(Packets)", serialize_with = "serialize_sum")]
    pub tcp_ul_packets: f64,
    #[serde(rename = "Server Side Downlink TCP Packet Loss Rate(%)")]
    pub server_dl_loss_rate: f64,
    #[serde(rename = "Server Side Downlink TCP Packet Losses", serialize_with = "serialize_sum")]
    pub server_dl_losses: f64,
    #[serde(rename = "TCP Downlink Packets (with Payload)(Packets)", serialize_with = "serialize_sum")]
    pub tcp_dl_packets: f64,
    #[serde(rename = "Client Side Uplink TCP Packet Loss Rate(%)")]
    pub client_ul_loss_rate: f64,
    #[serde(rename = "Client Side Uplink TCP Packet Losses(Packets)", serialize_with = "serialize_sum")]
    pub client_ul_losses: f64,
    #[serde(rename = "Client Side Downlink TCP Packet Loss Rate(%)")]
    pub client_dl_loss_rate: f64,
    #[serde(rename = "Client Side Downlink TCP Packet Losses(Packets)", serialize_with = "serialize_sum")]
    pub client_dl_losses: f64,
}

impl ResolvedReportRow {
    /// Build the report row of an aggregated tower group
    pub fn from_aggregate(row: &AggregatedRow<TowerKey>) -> Self {
        let c: &Counters = &row.counters;
        let k = Kpis::from_counters(c);
        Self {
            operator: row.key.operator.clone(),
            date: format_date(row.key.date),
            national: national_label(&row.key.operator),
            swe_l5: row.key.swe_l5.clone(),
            tower_id: row.key.tower_id.clone(),
            e2e_delay_ms: k.e2e_delay_ms,
            tcp_connect_delay_ms: c.tcp_rtt,
            tcp_connect_rtt_count: c.tcp_rtt_good_count,
            syn_synack_delay_ms: k.syn_synack_delay_ms,
            tcp_connect_step1_delay_ms: c.tcp_rtt_step1,
            tcp_connect_rtt_step1_count: c.tcp_rtt_step1_good_count,
            synack_ack_delay_ms: k.synack_ack_delay_ms,
            server_ul_loss_rate: k.server_ul_loss_rate,
            server_ul_losses: c.server_ul_lost_pkt,
            tcp_ul_packets: c.tcp_ul_packets_with_payload,
            server_dl_loss_rate: k.server_dl_loss_rate,
            server_dl_losses: c.server_dl_lost_pkt,
            tcp_dl_packets: c.tcp_dl_packets_with_payload,
            client_ul_loss_rate: k.client_ul_loss_rate,
            client_ul_losses: c.client_ul_lost_pkt,
            client_dl_loss_rate: k.client_dl_loss_rate,
            client_dl_losses: c.client_dl_lost_pkt,
        }
    }
}

impl UnresolvedReportRow {
    /// Build the report row of an aggregated unresolved group
    pub fn from_aggregate(row: &AggregatedRow<UnresolvedKey>) -> Self {
        let c: &Counters = &row.counters;
        let k = Kpis::from_counters(c);
        Self {
            operator: row.key.operator.clone(),
            date: format_date(row.key.date),
            national: national_label(&row.key.operator),
            plmn: row.key.plmn.clone(),
            enodeb_id: row.key.enodeb_id.value(),
            e2e_delay_ms: k.e2e_delay_ms,
            tcp_connect_delay_ms: c.tcp_rtt,
            tcp_connect_rtt_count: c.tcp_rtt_good_count,
            syn_synack_delay_ms: k.syn_synack_delay_ms,
            tcp_connect_step1_delay_ms: c.tcp_rtt_step1,
            tcp_connect_rtt_step1_count: c.tcp_rtt_step1_good_count,
            synack_ack_delay_ms: k.synack_ack_delay_ms,
            server_ul_loss_rate: k.server_ul_loss_rate,
            server_ul_losses: c.server_ul_lost_pkt,
            tcp_ul_packets: c.tcp_ul_packets_with_payload,
            server_dl_loss_rate: k.server_dl_loss_rate,
            server_dl_losses: c.server_dl_lost_pkt,
            tcp_dl_packets: c.tcp_dl_packets_with_payload,
            client_ul_loss_rate: k.client_ul_loss_rate,
            client_ul_losses: c.client_ul_lost_pkt,
            client_dl_loss_rate: k.client_dl_loss_rate,
            client_dl_losses: c.client_dl_lost_pkt,
        }
    }
}

/// Whole sums are written without a fractional part
fn serialize_sum<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && (0.0..=MAX_EXACT_F64).contains(value) {
        serializer.serialize_u64(*value as u64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Assemble the resolved table
pub fn assemble_resolved(rows: &[AggregatedRow<TowerKey>]) -> Vec<ResolvedReportRow> {
    rows.iter().map(ResolvedReportRow::from_aggregate).collect()
}

/// Assemble the unresolved table
pub fn assemble_unresolved(rows: &[AggregatedRow<UnresolvedKey>]) -> Vec<UnresolvedReportRow> {
    rows.iter().map(UnresolvedReportRow::from_aggregate).collect()
}
