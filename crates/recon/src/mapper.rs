//! Source-to-target column renaming applied before comparison.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::dataset::Dataset;
use crate::error::ReconError;
use crate::value::Value;

/// Ordered `(source column, target column)` renames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    entries: Vec<(String, String)>,
}

impl ColumnMapping {
    pub fn new<I, A, B>(entries: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(a, b)| (a.into(), b.into())).collect(),
        }
    }

    /// Read a mapping sheet with `source` and `target` columns.
    ///
    /// Rows where either cell is null are ignored; non-text cells are rendered
    /// with their display form.
    pub fn from_dataset(sheet: &Dataset) -> Result<Self, ReconError> {
        let (Some(s), Some(t)) = (sheet.column_index("source"), sheet.column_index("target")) else {
            return Err(ReconError::InvalidMappingSheet(format!(
                "expected 'source' and 'target' columns, found [{}]",
                sheet.columns().join(", ")
            )));
        };
        let entries = sheet
            .rows()
            .iter()
            .filter(|row| !row[s].is_null() && !row[t].is_null())
            .map(|row| (cell_text(&row[s]), cell_text(&row[t])))
            .collect();
        Ok(Self { entries })
    }

    /// Add entries after the existing ones.
    pub fn extend(&mut self, other: ColumnMapping) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cell_text(v: &Value) -> String {
    v.to_string().trim().to_string()
}

/// Why a mapping entry was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MappingWarning {
    MissingSourceColumn { source: String, target: String },
    MissingTargetColumn { source: String, target: String },
    Collision { source: String, target: String },
}

impl fmt::Display for MappingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSourceColumn { source, target } => {
                write!(f, "mapping '{source}' -> '{target}' skipped: '{source}' not in source dataset")
            }
            Self::MissingTargetColumn { source, target } => {
                write!(f, "mapping '{source}' -> '{target}' skipped: '{target}' not in target dataset")
            }
            Self::Collision { source, target } => {
                write!(f, "mapping '{source}' -> '{target}' skipped: source already has a column named '{target}'")
            }
        }
    }
}

/// Rename `source` columns per `mapping`, entry by entry.
///
/// An entry is skipped (and reported) when its source column is absent, its
/// target column is not in `target_columns`, or the new name is already taken.
/// Skipped entries never leave the dataset half-renamed.
pub fn apply_mapping(
    source: &Dataset,
    mapping: &ColumnMapping,
    target_columns: &[String],
) -> (Dataset, Vec<MappingWarning>) {
    let mut out = source.clone();
    let mut warnings = Vec::new();

    for (from, to) in mapping.entries() {
        let (s, t) = (from.clone(), to.clone());
        let warning = if !out.has_column(from) {
            Some(MappingWarning::MissingSourceColumn { source: s, target: t })
        } else if !target_columns.iter().any(|c| c == to) {
            Some(MappingWarning::MissingTargetColumn { source: s, target: t })
        } else {
            match out.rename_column(from, to) {
                Ok(_) => None,
                Err(_) => Some(MappingWarning::Collision { source: s, target: t }),
            }
        };

        if let Some(w) = warning {
            warn!("{w}");
            warnings.push(w);
        }
    }

    (out, warnings)
}
