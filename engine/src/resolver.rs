//! Tower Resolution
//!
//! Left-joins decoded records against the tower reference table on eNodeB ID
//! and splits them into resolved and unresolved branches.

use crate::record::DecodedRecord;
use common::{EnodebId, TowerMapping};
use std::collections::HashMap;
use tracing::debug;

/// Lookup from eNodeB ID to the first tower entry listing it
#[derive(Debug, Default)]
pub struct TowerIndex<'a> {
    by_enodeb: HashMap<EnodebId, &'a TowerMapping>,
    duplicates: usize,
}

impl<'a> TowerIndex<'a> {
    /// Index a reference table; later duplicates of an eNodeB ID are ignored
    pub fn build(towers: &'a [TowerMapping]) -> Self {
        let mut by_enodeb = HashMap::with_capacity(towers.len());
        let mut duplicates = 0;
        for tower in towers {
            if by_enodeb.contains_key(&tower.enodeb_id) {
                duplicates += 1;
                continue;
            }
            by_enodeb.insert(tower.enodeb_id, tower);
        }
        if duplicates > 0 {
            debug!(
                "Tower table lists {} duplicate eNodeB IDs; keeping first occurrences",
                duplicates
            );
        }
        Self { by_enodeb, duplicates }
    }

    pub fn lookup(&self, enodeb_id: EnodebId) -> Option<&'a TowerMapping> {
        self.by_enodeb.get(&enodeb_id).copied()
    }

    /// Number of distinct eNodeB IDs indexed
    pub fn len(&self) -> usize {
        self.by_enodeb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_enodeb.is_empty()
    }

    /// Number of reference rows shadowed by an earlier row for the same eNodeB
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// A record whose eNodeB matched a tower
#[derive(Debug, Clone)]
pub struct ResolvedRecord<'a> {
    pub record: DecodedRecord,
    pub tower: &'a TowerMapping,
}

/// Records split by whether they found a tower
#[derive(Debug, Default)]
pub struct Resolution<'a> {
    pub resolved: Vec<ResolvedRecord<'a>>,
    pub unresolved: Vec<DecodedRecord>,
}

/// Route every record to exactly one branch, preserving input order
pub fn resolve<'a>(records: Vec<DecodedRecord>, index: &TowerIndex<'a>) -> Resolution<'a> {
    let mut resolution = Resolution::default();
    for record in records {
        match index.lookup(record.network.enodeb_id()) {
            Some(tower) => resolution.resolved.push(ResolvedRecord { record, tower }),
            None => resolution.unresolved.push(record),
        }
    }
    debug!(
        "Resolved {} records, {} without tower",
        resolution.resolved.len(),
        resolution.unresolved.len()
    );
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::IdentifierDecoder;
    use crate::record::fixtures::raw;

    fn tower(tower_id: &str, swe_l5: &str, enodeb: u32) -> TowerMapping {
        TowerMapping {
            tower_id: tower_id.to_string(),
            swe_l5: swe_l5.to_string(),
            enodeb_id: EnodebId(enodeb),
        }
    }

    fn decoded(cgisai: &str) -> DecodedRecord {
        DecodedRecord::decode(&raw(cgisai, "202510011230", 1, 1), &IdentifierDecoder::default()).unwrap()
    }

    #[test]
    fn test_first_duplicate_wins() {
        let towers = vec![tower("T1", "S1", 100), tower("T2", "S2", 100), tower("T3", "S3", 200)];
        let index = TowerIndex::build(&towers);
        assert_eq!(index.len(), 2);
        assert_eq!(index.duplicates(), 1);
        assert_eq!(index.lookup(EnodebId(100)).unwrap().tower_id, "T1");
        assert!(index.lookup(EnodebId(300)).is_none());
    }

    #[test]
    fn test_split_covers_every_record() {
        let towers = vec![tower("T1", "S1", 100)];
        let index = TowerIndex::build(&towers);
        // eNodeB 0x64 = 100 resolves, 0xC8 = 200 does not
        let records = vec![decoded("510100006401"), decoded("51010000C801"), decoded("510100006402")];
        let resolution = resolve(records, &index);
        assert_eq!(resolution.resolved.len(), 2);
        assert_eq!(resolution.unresolved.len(), 1);
        assert_eq!(resolution.resolved[0].tower.swe_l5, "S1");
        assert_eq!(resolution.unresolved[0].network.enodeb_id(), EnodebId(200));
    }

    #[test]
    fn test_empty_reference_table() {
        let index = TowerIndex::build(&[]);
        assert!(index.is_empty());
        let resolution = resolve(vec![decoded("510100006401")], &index);
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.unresolved.len(), 1);
    }
}
