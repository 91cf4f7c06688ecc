//! Tower Reference Table Reader

use crate::InterfaceError;
use common::{parse_integral, EnodebId, TowerMapping};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

pub const TOWER_ID_COLUMN: &str = "TOWER ID";
pub const SITE_COLUMN: &str = "SWE_L5";
pub const ENODEB_COLUMN: &str = "eNodeBId";

/// Default field separator of the reference table
pub const DEFAULT_MAPPING_DELIMITER: u8 = b',';

const BOM: char = '\u{feff}';

/// Mappings read from the reference table
#[derive(Debug, Default)]
pub struct TowerReadOutcome {
    pub mappings: Vec<TowerMapping>,
    /// Rows whose eNodeB ID did not parse
    pub dropped: usize,
}

/// Reader for the tower reference table
#[derive(Debug, Clone, Copy)]
pub struct TowerReader {
    delimiter: u8,
}

impl Default for TowerReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAPPING_DELIMITER)
    }
}

impl TowerReader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn read_file(&self, path: &Path) -> Result<TowerReadOutcome, InterfaceError> {
        let file = std::fs::File::open(path).map_err(|e| InterfaceError::io(path, e))?;
        let outcome = self.read_from(file, path)?;
        info!(
            "Loaded {} tower mappings from {}",
            outcome.mappings.len(),
            path.display()
        );
        Ok(outcome)
    }

    /// Read the table from any source; `path` labels errors
    pub fn read_from<R: Read>(&self, source: R, path: &Path) -> Result<TowerReadOutcome, InterfaceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(source);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| InterfaceError::csv(path, e))?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches(BOM) } else { h };
                h.trim().to_string()
            })
            .collect();

        let position = |name: &str| headers.iter().position(|h| h == name);
        let (tower_idx, site_idx, enodeb_idx) =
            match (position(TOWER_ID_COLUMN), position(SITE_COLUMN), position(ENODEB_COLUMN)) {
                (Some(t), Some(s), Some(e)) => (t, s, e),
                (t, s, e) => {
                    let missing = [(TOWER_ID_COLUMN, t), (SITE_COLUMN, s), (ENODEB_COLUMN, e)]
                        .into_iter()
                        .filter(|(_, found)| found.is_none())
                        .map(|(name, _)| name.to_string())
                        .collect();
                    return Err(InterfaceError::MissingColumns {
                        missing,
                        available: headers,
                    });
                }
            };

        let mut outcome = TowerReadOutcome::default();
        for row in reader.records() {
            let row = row.map_err(|e| InterfaceError::csv(path, e))?;
            let value = |idx: usize| row.get(idx).unwrap_or("").trim();

            let raw_id = value(enodeb_idx);
            // Fractional ids keep their integral part
            let enodeb_id = match parse_integral(raw_id).ok().and_then(|v| u32::try_from(v).ok()) {
                Some(id) => EnodebId::new(id),
                None => {
                    debug!("Dropping tower row with eNodeBId {:?}", raw_id);
                    outcome.dropped += 1;
                    continue;
                }
            };
            outcome.mappings.push(TowerMapping {
                tower_id: value(tower_idx).to_string(),
                swe_l5: value(site_idx).to_string(),
                enodeb_id,
            });
        }

        if outcome.dropped > 0 {
            warn!(
                "Dropped {} tower rows with an invalid eNodeBId",
                outcome.dropped
            );
        }
        Ok(outcome)
    }
}
