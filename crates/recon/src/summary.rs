use serde::Serialize;

use crate::duplicates::{detect_duplicates, DuplicateReport};
use crate::model::ComparisonResult;

/// Counts shown at the top of every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub source_rows: usize,
    pub source_columns: usize,
    pub target_rows: usize,
    pub target_columns: usize,

    pub common_rows: usize,
    pub source_only_rows: usize,
    pub target_only_rows: usize,
    pub rows_without_mismatch: usize,
    pub rows_with_mismatch: usize,

    pub common_columns: usize,
    pub source_only_columns: usize,
    pub target_only_columns: usize,
    pub columns_all_match: usize,
    pub columns_with_mismatch: usize,

    pub source_has_duplicates: bool,
    pub target_has_duplicates: bool,
}

impl ReconSummary {
    pub fn from_result(result: &ComparisonResult) -> Self {
        Self::with_duplicates(result, &detect_duplicates(result))
    }

    pub fn with_duplicates(result: &ComparisonResult, duplicates: &DuplicateReport) -> Self {
        let rows_with_mismatch = result.mismatched_count();
        let columns_all_match = result.column_stats.iter().filter(|s| s.all_match).count();

        Self {
            source_rows: result.source_rows,
            source_columns: result.source_columns.len(),
            target_rows: result.target_rows,
            target_columns: result.target_columns.len(),

            common_rows: result.matched_rows.len(),
            source_only_rows: result.source_only_rows.len(),
            target_only_rows: result.target_only_rows.len(),
            rows_without_mismatch: result.matched_rows.len() - rows_with_mismatch,
            rows_with_mismatch,

            common_columns: result.common_columns.len(),
            source_only_columns: result.source_only_columns.len(),
            target_only_columns: result.target_only_columns.len(),
            columns_all_match,
            columns_with_mismatch: result.column_stats.len() - columns_all_match,

            source_has_duplicates: duplicates.source.has_duplicates(),
            target_has_duplicates: duplicates.target.has_duplicates(),
        }
    }

    /// Nothing unmatched and nothing mismatched.
    pub fn is_clean(&self) -> bool {
        self.source_only_rows == 0 && self.target_only_rows == 0 && self.rows_with_mismatch == 0
    }
}
