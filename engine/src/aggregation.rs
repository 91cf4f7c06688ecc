//! Grouped Counter Aggregation
//!
//! Resolved records roll up in two stages: first per (operator, date,
//! eNodeB), then per (operator, date, tower, site). Several eNodeBs can sit on
//! one tower, so the second stage merges them into a single daily row.
//! Unresolved records have no tower to roll up to and are grouped once per
//! (operator, date, eNodeB, PLMN).
//!
//! Groups live in ordered maps, so output rows come out sorted by key and
//! are reproducible for a given input order. Empty tower or site labels are
//! ordinary key values and form their own groups.

use crate::record::DecodedRecord;
use crate::resolver::ResolvedRecord;
use chrono::NaiveDate;
use common::{Counters, EnodebId, TowerMapping};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

/// Grouping key of a resolved output row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TowerKey {
    pub operator: String,
    pub date: NaiveDate,
    pub tower_id: String,
    pub swe_l5: String,
}

/// Grouping key of an unresolved output row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnresolvedKey {
    pub operator: String,
    pub date: NaiveDate,
    pub enodeb_id: EnodebId,
    pub plmn: String,
}

/// Grouping key of the first resolved stage
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnodebKey {
    pub operator: String,
    pub date: NaiveDate,
    pub enodeb_id: EnodebId,
}

/// One group and its summed counters
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow<K> {
    pub key: K,
    pub counters: Counters,
}

/// Stage-1 output: an eNodeB's daily sums with the first tower seen for it
#[derive(Debug, Clone, PartialEq)]
pub struct EnodebRollup<'a> {
    pub key: EnodebKey,
    pub tower: &'a TowerMapping,
    pub counters: Counters,
}

/// Stage 1: sum resolved records per (operator, date, eNodeB)
///
/// The tower carried by each group is the one attached to the first record
/// of that group in input order.
pub fn rollup_by_enodeb<'a>(records: &[ResolvedRecord<'a>]) -> Vec<EnodebRollup<'a>> {
    let mut groups: BTreeMap<EnodebKey, (&'a TowerMapping, Counters)> = BTreeMap::new();

    for resolved in records {
        let record = &resolved.record;
        let key = EnodebKey {
            operator: record.network.operator().to_string(),
            date: record.timestamp.date(),
            enodeb_id: record.network.enodeb_id(),
        };
        match groups.entry(key) {
            Entry::Occupied(mut slot) => slot.get_mut().1 += record.counters,
            Entry::Vacant(slot) => {
                slot.insert((resolved.tower, record.counters));
            }
        }
    }

    groups
        .into_iter()
        .map(|(key, (tower, counters))| EnodebRollup { key, tower, counters })
        .collect()
}

/// Stage 2: sum eNodeB rollups per (operator, date, tower, site)
pub fn rollup_by_tower(rollups: &[EnodebRollup<'_>]) -> Vec<AggregatedRow<TowerKey>> {
    let mut groups: BTreeMap<TowerKey, Counters> = BTreeMap::new();

    for rollup in rollups {
        let key = TowerKey {
            operator: rollup.key.operator.clone(),
            date: rollup.key.date,
            tower_id: rollup.tower.tower_id.clone(),
            swe_l5: rollup.tower.swe_l5.clone(),
        };
        *groups.entry(key).or_default() += rollup.counters;
    }

    into_rows(groups)
}

/// Both resolved stages
#[cfg(test)]
pub(crate) fn aggregate_resolved(records: &[ResolvedRecord<'_>]) -> Vec<AggregatedRow<TowerKey>> {
    rollup_by_tower(&rollup_by_enodeb(records))
}

/// Single stage: sum unresolved records per (operator, date, eNodeB, PLMN)
pub fn aggregate_unresolved(records: &[DecodedRecord]) -> Vec<AggregatedRow<UnresolvedKey>> {
    let mut groups: BTreeMap<UnresolvedKey, Counters> = BTreeMap::new();

    for record in records {
        let key = UnresolvedKey {
            operator: record.network.operator().to_string(),
            date: record.timestamp.date(),
            enodeb_id: record.network.enodeb_id(),
            plmn: record.network.plmn().to_string(),
        };
        *groups.entry(key).or_default() += record.counters;
    }

    debug!(
        "Aggregated {} unresolved records into {} rows",
        records.len(),
        groups.len()
    );
    into_rows(groups)
}

fn into_rows<K>(groups: BTreeMap<K, Counters>) -> Vec<AggregatedRow<K>> {
    groups
        .into_iter()
        .map(|(key, counters)| AggregatedRow { key, counters })
        .collect()
}
