use std::fmt;

use serde::Serialize;

use crate::config::{JoinKey, ToleranceSpec};
use crate::value::{Value, ValueKind};

// ---------------------------------------------------------------------------
// Sides + keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// The join key values of one row, in join key column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyTuple(pub Vec<Value>);

impl fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join("|"))
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Source and target value of one compare column within a matched pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellPair {
    pub source: Value,
    pub target: Value,
    pub equal: bool,
}

/// A (source row, target row) pair sharing a key tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRow {
    pub key: KeyTuple,
    pub source_index: usize,
    pub target_index: usize,
    /// One entry per compare column, in `ComparisonResult::compare_columns` order.
    pub cells: Vec<CellPair>,
}

impl MatchedRow {
    pub fn is_mismatch(&self) -> bool {
        self.cells.iter().any(|c| !c.equal)
    }

    pub fn unequal_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.equal).count()
    }
}

/// A row whose key tuple exists on one side only. `values` follows that side's schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedRow {
    pub key: KeyTuple,
    pub index: usize,
    pub values: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Column statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStat {
    pub column: String,
    pub matched: usize,
    pub equal: usize,
    pub unequal: usize,
    pub all_match: bool,
    /// Largest absolute difference over number/number pairs.
    pub max_diff: Option<f64>,
    /// Pairs where exactly one side is null.
    pub null_diff: usize,
    pub source_kind: ValueKind,
    pub target_kind: ValueKind,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Output of one `compare` run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub join_key: JoinKey,
    pub tolerance: ToleranceSpec,
    pub source_columns: Vec<String>,
    pub target_columns: Vec<String>,
    /// Columns in both schemas, source order, key columns included.
    pub common_columns: Vec<String>,
    pub source_only_columns: Vec<String>,
    pub target_only_columns: Vec<String>,
    /// `common_columns` without the join key.
    pub compare_columns: Vec<String>,
    pub source_rows: usize,
    pub target_rows: usize,
    pub matched_rows: Vec<MatchedRow>,
    pub source_only_rows: Vec<UnmatchedRow>,
    pub target_only_rows: Vec<UnmatchedRow>,
    pub column_stats: Vec<ColumnStat>,
}

impl ComparisonResult {
    pub fn mismatched_rows(&self) -> impl Iterator<Item = &MatchedRow> {
        self.matched_rows.iter().filter(|r| r.is_mismatch())
    }

    pub fn mismatched_count(&self) -> usize {
        self.mismatched_rows().count()
    }

    pub fn column_stat(&self, column: &str) -> Option<&ColumnStat> {
        self.column_stats.iter().find(|s| s.column == column)
    }

    pub fn unmatched_rows(&self, side: Side) -> &[UnmatchedRow] {
        match side {
            Side::Source => &self.source_only_rows,
            Side::Target => &self.target_only_rows,
        }
    }

    pub fn columns(&self, side: Side) -> &[String] {
        match side {
            Side::Source => &self.source_columns,
            Side::Target => &self.target_columns,
        }
    }
}
