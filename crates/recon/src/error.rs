use thiserror::Error;

use crate::model::Side;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconError {
    /// No join key columns were given.
    #[error("join key is empty")]
    EmptyJoinKey,
    /// The same column appears twice in the join key.
    #[error("join key column '{0}' is listed more than once")]
    DuplicateKeyColumn(String),
    /// A join key column is absent from one of the datasets.
    #[error("join key column '{column}' not found in {side} dataset")]
    MissingKeyColumn { side: Side, column: String },
    /// A mapping sheet is missing its `source`/`target` columns or has non-text cells.
    #[error("invalid mapping sheet: {0}")]
    InvalidMappingSheet(String),
    /// Two columns of one dataset share a name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    /// A row does not have one value per column.
    #[error("row {row}: expected {expected} values, found {found}")]
    RowWidth { row: usize, expected: usize, found: usize },
}

impl ReconError {
    /// Errors caused by the run configuration rather than by dataset construction.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::EmptyJoinKey
                | Self::DuplicateKeyColumn(_)
                | Self::MissingKeyColumn { .. }
                | Self::InvalidMappingSheet(_)
        )
    }
}
