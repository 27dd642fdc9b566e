// Dataset acquisition: files, folders and databases

pub mod csv;
pub mod database;
pub mod descriptor;
pub mod error;
pub mod fixed_width;
pub mod folder;
pub mod json;
mod table;
pub mod xlsx;
pub mod xml;

use std::path::{Path, PathBuf};

use tabrecon_recon::Dataset;
use tracing::{info, warn};

pub use database::{Connector, ConnectionParams, ConnectorRegistry, Secret, SqliteConnector};
#[cfg(feature = "mysql")]
pub use database::MysqlConnector;
#[cfg(feature = "postgres")]
pub use database::PostgresConnector;
pub use descriptor::{
    DatabaseKind, DatabaseSource, FileFormat, FileSource, FolderSource, SourceDescriptor,
};
pub use error::AcquisitionError;

/// Resolves descriptors relative to `base_dir` and loads them.
#[derive(Debug, Clone)]
pub struct Acquisition {
    base_dir: PathBuf,
    registry: ConnectorRegistry,
}

impl Acquisition {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_registry(base_dir, ConnectorRegistry::default())
    }

    pub fn with_registry(base_dir: impl Into<PathBuf>, registry: ConnectorRegistry) -> Self {
        Self {
            base_dir: base_dir.into(),
            registry,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn fetch(&self, descriptor: &SourceDescriptor) -> Result<Dataset, AcquisitionError> {
        let dataset = match descriptor {
            SourceDescriptor::File(file) => {
                let mut file = file.clone();
                file.path = self.resolve(&file.path);
                load_file(&file)?
            }
            SourceDescriptor::Folder(folder) => {
                folder::import(&self.resolve(&folder.path), &folder.extension)?
            }
            SourceDescriptor::Database(db) => {
                let mut db = db.clone();
                if db.kind == DatabaseKind::Sqlite {
                    db.database = self.resolve(Path::new(&db.database)).to_string_lossy().into_owned();
                }
                let query_file = self.resolve(&db.query_file);
                database::fetch(&db, &query_file, &self.registry)?
            }
        };
        info!(
            source = %descriptor,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}

/// Load one file, its path already resolved.
pub fn load_file(source: &FileSource) -> Result<Dataset, AcquisitionError> {
    let path = source.path.as_path();
    if !path.is_file() {
        return Err(AcquisitionError::NotFound(path.to_path_buf()));
    }

    let format = match source.format.or_else(|| FileFormat::from_path(path)) {
        Some(format) => format,
        None => {
            warn!(file = %path.display(), "unrecognized file extension, reading as CSV");
            FileFormat::Csv
        }
    };
    let delimiter = match source.delimiter {
        Some(c) if c.is_ascii() => Some(c as u8),
        Some(c) => {
            return Err(AcquisitionError::parse(
                path,
                format!("delimiter '{c}' is not a single-byte character"),
            ))
        }
        None => None,
    };

    match format {
        FileFormat::Csv => csv::import(path, delimiter),
        FileFormat::Delimited => csv::import(path, Some(delimiter.unwrap_or(b','))),
        FileFormat::Excel => xlsx::import(path, source.sheet.as_deref()),
        FileFormat::Json => json::import(path),
        FileFormat::Xml => xml::import(path),
        FileFormat::FixedWidth => fixed_width::import(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tabrecon_recon::Value;
    use tempfile::tempdir;

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "id\n1\n").unwrap();

        let acq = Acquisition::new(dir.path());
        let ds = acq
            .fetch(&SourceDescriptor::File(FileSource::new("a.csv")))
            .unwrap();
        assert_eq!(ds.row(0).unwrap(), &[Value::Number(1.0)]);
    }

    #[test]
    fn unknown_extension_reads_as_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.dat");
        fs::write(&path, "id;name\n1;x\n").unwrap();

        let ds = load_file(&FileSource::new(&path)).unwrap();
        assert_eq!(ds.columns(), &["id", "name"]);
    }

    #[test]
    fn txt_defaults_to_comma() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        fs::write(&path, "a;b,c\n1;2,3\n").unwrap();

        let ds = load_file(&FileSource::new(&path)).unwrap();
        assert_eq!(ds.columns(), &["a;b", "c"]);

        let mut piped = FileSource::new(&path);
        piped.delimiter = Some(';');
        let ds = load_file(&piped).unwrap();
        assert_eq!(ds.columns(), &["a", "b,c"]);
    }

    #[test]
    fn missing_file() {
        let dir = tempdir().unwrap();
        let err = load_file(&FileSource::new(dir.path().join("nope.csv"))).unwrap_err();
        assert!(matches!(err, AcquisitionError::NotFound(_)));
    }
}
