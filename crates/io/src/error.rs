use std::path::PathBuf;

use tabrecon_recon::ReconError;
use thiserror::Error;

use crate::descriptor::DatabaseKind;

/// A collaborator could not produce a dataset. The pair using it cannot be compared.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("query file not found: {}", .0.display())]
    QueryFileNotFound(PathBuf),

    #[error("cannot read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("no non-empty *.{extension} files under {}", path.display())]
    EmptyFolder { path: PathBuf, extension: String },

    #[error("no connector registered for database kind '{0}'")]
    UnsupportedBackend(DatabaseKind),

    #[error("credential environment variable '{0}' is not set")]
    MissingCredential(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("invalid table from {origin}: {source}")]
    Dataset { origin: String, source: ReconError },
}

impl AcquisitionError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
