//! Decoded KQI Records

use crate::decoder::{IdentifierDecoder, NetworkIdentifier};
use crate::temporal::Timestamp;
use crate::EngineError;
use common::{Counters, RawRecord};

/// A raw record with its identifier and timestamp decoded
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub network: NetworkIdentifier,
    pub timestamp: Timestamp,
    pub counters: Counters,
}

impl DecodedRecord {
    /// Decode a raw record; errors carry the record's origin
    pub fn decode(raw: &RawRecord, decoder: &IdentifierDecoder) -> Result<Self, EngineError> {
        let network = decoder.decode(&raw.cgisai).map_err(|e| e.at(&raw.origin))?;
        let timestamp = Timestamp::parse(&raw.time_column).map_err(|e| e.at(&raw.origin))?;
        Ok(Self {
            network,
            timestamp,
            counters: raw.counters,
        })
    }
}
