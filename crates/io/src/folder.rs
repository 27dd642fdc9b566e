// Folder import: stack every non-empty file with a given extension.

use std::path::Path;

use tabrecon_recon::Dataset;
use tracing::{debug, warn};

use crate::descriptor::FileSource;
use crate::error::AcquisitionError;

/// Files are found recursively and read in sorted path order; zero-byte files are skipped.
/// Columns are the union across files, missing cells are null.
pub fn import(dir: &Path, extension: &str) -> Result<Dataset, AcquisitionError> {
    if !dir.is_dir() {
        return Err(AcquisitionError::NotFound(dir.to_path_buf()));
    }

    let pattern = format!(
        "{}/**/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        extension.trim_start_matches('.')
    );
    let entries = glob::glob(&pattern).map_err(|e| AcquisitionError::parse(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| AcquisitionError::io(e.path().to_path_buf(), e.error()))?;
        let len = std::fs::metadata(&path)
            .map_err(|e| AcquisitionError::io(&path, e))?
            .len();
        if len == 0 {
            warn!(file = %path.display(), "skipping empty file");
            continue;
        }
        files.push(path);
    }
    files.sort();

    let mut combined: Option<Dataset> = None;
    for path in files {
        let part = crate::load_file(&FileSource::new(&path))?;
        debug!(file = %path.display(), rows = part.row_count(), "folder part loaded");
        match combined.as_mut() {
            Some(ds) => ds.append(part),
            None => combined = Some(part),
        }
    }

    combined.ok_or_else(|| AcquisitionError::EmptyFolder {
        path: dir.to_path_buf(),
        extension: extension.to_string(),
    })
}
