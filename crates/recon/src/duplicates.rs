use std::collections::HashSet;

use serde::Serialize;

use crate::matcher::KeyBuckets;
use crate::model::{ComparisonResult, KeyTuple, Side};

/// A key tuple carried by more than one row on one side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateKey {
    pub key: KeyTuple,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SideDuplicates {
    pub keys: Vec<DuplicateKey>,
    /// Total rows under duplicated keys.
    pub rows: usize,
}

impl SideDuplicates {
    pub fn has_duplicates(&self) -> bool {
        !self.keys.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub source: SideDuplicates,
    pub target: SideDuplicates,
}

impl DuplicateReport {
    pub fn side(&self, side: Side) -> &SideDuplicates {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }
}

/// Rebuild each side's key buckets from the result and report the multi-row ones.
///
/// Every input row is reachable from the result, either as a matched-pair
/// member or as an unmatched row, so no access to the datasets is needed.
pub fn detect_duplicates(result: &ComparisonResult) -> DuplicateReport {
    DuplicateReport {
        source: side_duplicates(result, Side::Source),
        target: side_duplicates(result, Side::Target),
    }
}

fn side_duplicates(result: &ComparisonResult, side: Side) -> SideDuplicates {
    let ignore_spaces = result.tolerance.ignore_spaces;
    let mut buckets = KeyBuckets::default();
    let mut seen = HashSet::new();

    let matched = result.matched_rows.iter().map(|r| {
        let index = match side {
            Side::Source => r.source_index,
            Side::Target => r.target_index,
        };
        (&r.key, index)
    });
    let unmatched = result.unmatched_rows(side).iter().map(|r| (&r.key, r.index));

    for (key, index) in matched.chain(unmatched) {
        if seen.insert(index) {
            buckets.insert(key.clone(), index, ignore_spaces);
        }
    }

    let keys: Vec<DuplicateKey> = buckets
        .buckets()
        .iter()
        .filter(|b| b.rows.len() > 1)
        .map(|b| DuplicateKey {
            key: b.key.clone(),
            rows: b.rows.len(),
        })
        .collect();
    let rows = keys.iter().map(|k| k.rows).sum();

    SideDuplicates { keys, rows }
}
