//! Packed Cell Identifier Decoder
//!
//! Splits the 12-character CGI/SAI field into PLMN (5 decimal digits),
//! eNodeB ID (5 hex digits) and cell ID (2 hex digits).

use crate::EngineError;
use common::{zero_pad, CellId, EnodebId, OperatorDirectory};
use tracing::trace;

/// Width of the packed identifier after left zero padding
pub const PACKED_ID_LEN: usize = 12;

const PLMN_LEN: usize = 5;
const MCC_LEN: usize = 3;
const ENODEB_END: usize = 10;

/// Decoded network coordinates of one record
///
/// Only [`IdentifierDecoder::decode`] constructs these, so `plmn` is always
/// `mcc` followed by `mnc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkIdentifier {
    mcc: String,
    mnc: String,
    plmn: String,
    enodeb_id: EnodebId,
    cell_id: CellId,
    operator: String,
}

impl NetworkIdentifier {
    /// Mobile Country Code
    pub fn mcc(&self) -> &str {
        &self.mcc
    }

    /// Mobile Network Code
    pub fn mnc(&self) -> &str {
        &self.mnc
    }

    /// PLMN code (MCC + MNC)
    pub fn plmn(&self) -> &str {
        &self.plmn
    }

    pub fn enodeb_id(&self) -> EnodebId {
        self.enodeb_id
    }

    pub fn cell_id(&self) -> CellId {
        self.cell_id
    }

    /// Operator name, "Unknown" when the PLMN is not in the directory
    pub fn operator(&self) -> &str {
        &self.operator
    }
}

/// Decoder owning the operator directory
#[derive(Debug, Clone, Default)]
pub struct IdentifierDecoder {
    directory: OperatorDirectory,
}

impl IdentifierDecoder {
    /// Create a decoder over an operator directory
    pub fn new(directory: OperatorDirectory) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &OperatorDirectory {
        &self.directory
    }

    /// Decode a packed identifier, left-padding it with zeros to 12 characters
    pub fn decode(&self, packed: &str) -> Result<NetworkIdentifier, EngineError> {
        let trimmed = packed.trim();
        if trimmed.is_empty() {
            return Err(EngineError::identifier(packed, "empty identifier"));
        }
        if !trimmed.is_ascii() {
            return Err(EngineError::identifier(packed, "non-ASCII characters"));
        }
        if trimmed.len() > PACKED_ID_LEN {
            return Err(EngineError::identifier(
                packed,
                format!("longer than {} characters", PACKED_ID_LEN),
            ));
        }

        let padded = zero_pad(trimmed, PACKED_ID_LEN);
        let plmn = &padded[..PLMN_LEN];
        let enodeb = parse_hex_field(packed, &padded[PLMN_LEN..ENODEB_END], "eNodeB")?;
        let cell = parse_hex_field(packed, &padded[ENODEB_END..], "cell")?;

        let id = NetworkIdentifier {
            mcc: plmn[..MCC_LEN].to_string(),
            mnc: plmn[MCC_LEN..].to_string(),
            plmn: plmn.to_string(),
            enodeb_id: EnodebId::new(enodeb),
            // Two hex digits always fit
            cell_id: CellId(cell as u8),
            operator: self.directory.lookup(plmn).to_string(),
        };
        trace!(
            "Decoded {} -> plmn={} enodeb={} cell={} operator={}",
            padded,
            id.plmn,
            id.enodeb_id,
            id.cell_id.0,
            id.operator
        );
        Ok(id)
    }
}

fn parse_hex_field(packed: &str, field: &str, name: &str) -> Result<u32, EngineError> {
    if !field.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EngineError::identifier(
            packed,
            format!("{} field {:?} is not hexadecimal", name, field),
        ));
    }
    u32::from_str_radix(field, 16).map_err(|e| {
        EngineError::identifier(packed, format!("{} field {:?}: {}", name, field, e))
    })
}
