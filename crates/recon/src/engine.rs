use std::collections::HashSet;

use tracing::debug;

use crate::config::{JoinKey, ToleranceSpec};
use crate::dataset::Dataset;
use crate::equality::values_equal;
use crate::error::ReconError;
use crate::matcher::{join_buckets, KeyBuckets};
use crate::model::{CellPair, ComparisonResult, KeyTuple, MatchedRow, Side, UnmatchedRow};
use crate::stats::column_stats;

/// Compare `source` against `target` on `join_key`.
///
/// Only an invalid join key is an error. Type mismatches, nulls and empty
/// datasets all end up in the result.
pub fn compare(
    source: &Dataset,
    target: &Dataset,
    join_key: &JoinKey,
    tolerance: &ToleranceSpec,
) -> Result<ComparisonResult, ReconError> {
    let source_key = resolve_key(source, join_key, Side::Source)?;
    let target_key = resolve_key(target, join_key, Side::Target)?;

    let schema = reconcile_schema(source, target, join_key);

    let ignore_spaces = tolerance.ignore_spaces;
    let source_buckets = KeyBuckets::build(source, &source_key, ignore_spaces);
    let target_buckets = KeyBuckets::build(target, &target_key, ignore_spaces);
    let joined = join_buckets(&source_buckets, &target_buckets, ignore_spaces);

    let matched_rows: Vec<MatchedRow> = joined
        .matched
        .into_iter()
        .map(|pair| {
            let s_row = &source.rows()[pair.source];
            let t_row = &target.rows()[pair.target];
            let cells = schema
                .compare_positions
                .iter()
                .map(|&(si, ti)| {
                    let (s, t) = (&s_row[si], &t_row[ti]);
                    CellPair {
                        source: s.clone(),
                        target: t.clone(),
                        equal: values_equal(s, t, tolerance),
                    }
                })
                .collect();
            MatchedRow {
                key: pair.key,
                source_index: pair.source,
                target_index: pair.target,
                cells,
            }
        })
        .collect();

    let source_only_rows = unmatched(source, joined.source_only);
    let target_only_rows = unmatched(target, joined.target_only);

    let column_stats = column_stats(&schema.compare_columns, &matched_rows, source, target);

    debug!(
        key = %join_key,
        source_rows = source.row_count(),
        target_rows = target.row_count(),
        source_keys = source_buckets.buckets().len(),
        target_keys = target_buckets.buckets().len(),
        matched = matched_rows.len(),
        source_only = source_only_rows.len(),
        target_only = target_only_rows.len(),
        "comparison complete"
    );

    Ok(ComparisonResult {
        join_key: join_key.clone(),
        tolerance: *tolerance,
        source_columns: source.columns().to_vec(),
        target_columns: target.columns().to_vec(),
        common_columns: schema.common_columns,
        source_only_columns: schema.source_only_columns,
        target_only_columns: schema.target_only_columns,
        compare_columns: schema.compare_columns,
        source_rows: source.row_count(),
        target_rows: target.row_count(),
        matched_rows,
        source_only_rows,
        target_only_rows,
        column_stats,
    })
}

/// Validate the join key against one dataset and return its column positions.
fn resolve_key(dataset: &Dataset, join_key: &JoinKey, side: Side) -> Result<Vec<usize>, ReconError> {
    if join_key.is_empty() {
        return Err(ReconError::EmptyJoinKey);
    }
    let mut seen = HashSet::new();
    join_key
        .columns()
        .iter()
        .map(|col| {
            if !seen.insert(col.as_str()) {
                return Err(ReconError::DuplicateKeyColumn(col.clone()));
            }
            dataset.column_index(col).ok_or_else(|| ReconError::MissingKeyColumn {
                side,
                column: col.clone(),
            })
        })
        .collect()
}

struct Schema {
    common_columns: Vec<String>,
    source_only_columns: Vec<String>,
    target_only_columns: Vec<String>,
    compare_columns: Vec<String>,
    /// (source index, target index) per compare column.
    compare_positions: Vec<(usize, usize)>,
}

fn reconcile_schema(source: &Dataset, target: &Dataset, join_key: &JoinKey) -> Schema {
    let mut common_columns = Vec::new();
    let mut source_only_columns = Vec::new();
    let mut compare_columns = Vec::new();
    let mut compare_positions = Vec::new();

    for (si, col) in source.columns().iter().enumerate() {
        match target.column_index(col) {
            Some(ti) => {
                common_columns.push(col.clone());
                if !join_key.contains(col) {
                    compare_columns.push(col.clone());
                    compare_positions.push((si, ti));
                }
            }
            None => source_only_columns.push(col.clone()),
        }
    }

    let target_only_columns = target
        .columns()
        .iter()
        .filter(|c| !source.has_column(c))
        .cloned()
        .collect();

    Schema {
        common_columns,
        source_only_columns,
        target_only_columns,
        compare_columns,
        compare_positions,
    }
}

fn unmatched(dataset: &Dataset, rows: Vec<(KeyTuple, usize)>) -> Vec<UnmatchedRow> {
    rows.into_iter()
        .map(|(key, index)| UnmatchedRow {
            key,
            index,
            values: dataset.rows()[index].clone(),
        })
        .collect()
}
