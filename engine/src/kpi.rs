//! KQI Derivation
//!
//! Delay and packet-loss indicators computed from summed counters. A zero
//! denominator yields 0. Delays round half to even to whole milliseconds,
//! loss rates round half to even to two decimals.

use common::{round_half_even, round_half_even_to, Counters, UNKNOWN_OPERATOR};
use serde::Serialize;

/// Decimal places kept on loss-rate percentages
pub const LOSS_RATE_PLACES: i32 = 2;

/// Country prefix of the national label
pub const NATIONAL_PREFIX: &str = "Indonesia-";

/// Derived indicators for one output row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    /// Mean TCP connect round-trip delay (ms)
    pub e2e_delay_ms: i64,
    /// Mean SYN to SYN-ACK delay (ms)
    pub syn_synack_delay_ms: i64,
    /// SYN-ACK to ACK delay (ms); may be negative
    pub synack_ack_delay_ms: i64,
    pub server_ul_loss_rate: f64,
    pub server_dl_loss_rate: f64,
    pub client_ul_loss_rate: f64,
    pub client_dl_loss_rate: f64,
}

impl Kpis {
    /// Compute the indicators of a group's summed counters
    pub fn from_counters(c: &Counters) -> Self {
        let e2e = ratio(c.tcp_rtt, c.tcp_rtt_good_count);
        let syn_synack = ratio(c.tcp_rtt_step1, c.tcp_rtt_step1_good_count);
        // Difference of the unrounded means, rounded once
        let synack_ack = e2e - syn_synack;

        Self {
            e2e_delay_ms: round_delay(e2e),
            syn_synack_delay_ms: round_delay(syn_synack),
            synack_ack_delay_ms: round_delay(synack_ack),
            server_ul_loss_rate: loss_rate(c.server_ul_lost_pkt, c.tcp_ul_packets_with_payload),
            server_dl_loss_rate: loss_rate(c.server_dl_lost_pkt, c.tcp_dl_packets_with_payload),
            client_ul_loss_rate: loss_rate(c.client_ul_lost_pkt, c.tcp_ul_packets_with_payload),
            client_dl_loss_rate: loss_rate(c.client_dl_lost_pkt, c.tcp_dl_packets_with_payload),
        }
    }
}

/// `Indonesia-<operator>`, or "Unknown" for unknown operators
pub fn national_label(operator: &str) -> String {
    if operator == UNKNOWN_OPERATOR {
        UNKNOWN_OPERATOR.to_string()
    } else {
        format!("{}{}", NATIONAL_PREFIX, operator)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn loss_rate(lost: f64, total: f64) -> f64 {
    if total > 0.0 {
        round_half_even_to(lost / total * 100.0, LOSS_RATE_PLACES)
    } else {
        0.0
    }
}

fn round_delay(value: f64) -> i64 {
    round_half_even(value) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_e2e_delay() {
        let counters = Counters {
            tcp_rtt: 250.0,
            tcp_rtt_good_count: 25.0,
            ..Counters::default()
        };
        let kpis = Kpis::from_counters(&counters);
        assert_eq!(kpis.e2e_delay_ms, 10);
        assert_eq!(kpis.syn_synack_delay_ms, 0);
        assert_eq!(kpis.synack_ack_delay_ms, 10);
    }

    #[test]
    fn test_fractional_sums() {
        let counters = Counters {
            tcp_rtt: 100.5 + 149.5,
            tcp_rtt_good_count: 25.0,
            server_ul_lost_pkt: 0.5,
            tcp_ul_packets_with_payload: 4.0,
            ..Counters::default()
        };
        let kpis = Kpis::from_counters(&counters);
        assert_eq!(kpis.e2e_delay_ms, 10);
        assert_eq!(kpis.server_ul_loss_rate, 12.5);
    }

    #[test]
    fn test_zero_denominators_give_zero() {
        let counters = Counters {
            tcp_rtt: 500.0,
            tcp_rtt_step1: 300.0,
            server_ul_lost_pkt: 4.0,
            server_dl_lost_pkt: 4.0,
            client_ul_lost_pkt: 4.0,
            client_dl_lost_pkt: 4.0,
            ..Counters::default()
        };
        let kpis = Kpis::from_counters(&counters);
        assert_eq!(kpis.e2e_delay_ms, 0);
        assert_eq!(kpis.syn_synack_delay_ms, 0);
        assert_eq!(kpis.synack_ack_delay_ms, 0);
        for rate in [
            kpis.server_ul_loss_rate,
            kpis.server_dl_loss_rate,
            kpis.client_ul_loss_rate,
            kpis.client_dl_loss_rate,
        ] {
            assert_eq!(rate, 0.0);
            assert!(rate.is_finite());
        }
    }

    #[test]
    fn test_synack_ack_can_be_negative() {
        let counters = Counters {
            tcp_rtt: 100.0,
            tcp_rtt_good_count: 10.0,
            tcp_rtt_step1: 300.0,
            tcp_rtt_step1_good_count: 10.0,
            ..Counters::default()
        };
        let kpis = Kpis::from_counters(&counters);
        assert_eq!(kpis.e2e_delay_ms, 10);
        assert_eq!(kpis.syn_synack_delay_ms, 30);
        assert_eq!(kpis.synack_ack_delay_ms, -20);
    }

    #[test]
    fn test_delay_ties_round_to_even() {
        // 25 / 10 = 2.5 -> 2, 35 / 10 = 3.5 -> 4
        let counters = Counters {
            tcp_rtt: 25.0,
            tcp_rtt_good_count: 10.0,
            tcp_rtt_step1: 35.0,
            tcp_rtt_step1_good_count: 10.0,
            ..Counters::default()
        };
        let kpis = Kpis::from_counters(&counters);
        assert_eq!(kpis.e2e_delay_ms, 2);
        assert_eq!(kpis.syn_synack_delay_ms, 4);
        // 2.5 - 3.5 = -1.0, computed before rounding
        assert_eq!(kpis.synack_ack_delay_ms, -1);
    }

    #[test]
    fn test_synack_ack_uses_unrounded_means() {
        // 2.4 - 1.4 = 1.0 although the rounded means are 2 and 1
        let counters = Counters {
            tcp_rtt: 24.0,
            tcp_rtt_good_count: 10.0,
            tcp_rtt_step1: 14.0,
            tcp_rtt_step1_good_count: 10.0,
            ..Counters::default()
        };
        let kpis = Kpis::from_counters(&counters);
        assert_eq!(kpis.e2e_delay_ms, 2);
        assert_eq!(kpis.syn_synack_delay_ms, 1);
        assert_eq!(kpis.synack_ack_delay_ms, 1);

        let counters = Counters {
            tcp_rtt: 15.0,
            tcp_rtt_good_count: 10.0,
            tcp_rtt_step1: 10.0,
            tcp_rtt_step1_good_count: 10.0,
            ..Counters::default()
        };
        let kpis = Kpis::from_counters(&counters);
        assert_eq!(kpis.e2e_delay_ms, 2);
        assert_eq!(kpis.syn_synack_delay_ms, 1);
        // 1.5 - 1.0 = 0.5 -> 0
        assert_eq!(kpis.synack_ack_delay_ms, 0);
    }

    #[test]
    fn test_loss_rates() {
        let counters = Counters {
            server_ul_lost_pkt: 1.0,
            client_ul_lost_pkt: 2.0,
            tcp_ul_packets_with_payload: 3.0,
            server_dl_lost_pkt: 1.0,
            client_dl_lost_pkt: 5.0,
            tcp_dl_packets_with_payload: 800.0,
            ..Counters::default()
        };
        let kpis = Kpis::from_counters(&counters);
        assert_eq!(kpis.server_ul_loss_rate, 33.33);
        assert_eq!(kpis.client_ul_loss_rate, 66.67);
        // 1 / 800 * 100 = 0.125 -> 0.12 (tie to even)
        assert_eq!(kpis.server_dl_loss_rate, 0.12);
        // 5 / 800 * 100 = 0.625 -> 0.62 (tie to even)
        assert_eq!(kpis.client_dl_loss_rate, 0.62);
    }

    #[test]
    fn test_national_label() {
        assert_eq!(national_label("Telkomsel"), "Indonesia-Telkomsel");
        assert_eq!(national_label("XL"), "Indonesia-XL");
        assert_eq!(national_label("Unknown"), "Unknown");
    }
}
