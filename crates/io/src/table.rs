// Shared header cleanup + row assembly for every text-like loader.

use std::collections::HashSet;
use std::path::Path;

use tabrecon_recon::{Dataset, Value};

use crate::error::AcquisitionError;

/// Make header names usable as dataset columns.
///
/// Blank names become `Unnamed: <i>`; repeats get `.1`, `.2`, ... suffixes.
pub(crate) fn clean_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim();
            let base = if name.is_empty() {
                format!("Unnamed: {i}")
            } else {
                name.to_string()
            };
            let mut candidate = base.clone();
            let mut n = 1;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{base}.{n}");
                n += 1;
            }
            candidate
        })
        .collect()
}

/// Build a dataset from a header and rows. Short rows are padded with nulls;
/// rows longer than the header are a parse error.
pub(crate) fn build(
    path: &Path,
    headers: Vec<String>,
    rows: impl IntoIterator<Item = Vec<Value>>,
) -> Result<Dataset, AcquisitionError> {
    let mut dataset = Dataset::new(clean_headers(headers)).map_err(|e| AcquisitionError::Dataset {
        origin: path.display().to_string(),
        source: e,
    })?;
    let width = dataset.column_count();

    for (i, mut row) in rows.into_iter().enumerate() {
        if row.len() > width {
            return Err(AcquisitionError::parse(
                path,
                format!("row {}: {} fields, header has {width}", i + 1, row.len()),
            ));
        }
        row.resize(width, Value::Null);
        dataset.push_row(row).map_err(|e| AcquisitionError::Dataset {
            origin: path.display().to_string(),
            source: e,
        })?;
    }

    Ok(dataset)
}
