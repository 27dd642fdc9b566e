use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Where a dataset comes from. Deserialized from the `type` tag of a driver config entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDescriptor {
    File(FileSource),
    Folder(FolderSource),
    Database(DatabaseSource),
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(s) => write!(f, "file {}", s.path.display()),
            Self::Folder(s) => write!(f, "folder {} (*.{})", s.path.display(), s.extension),
            Self::Database(s) => write!(f, "{} database {}", s.kind, s.database),
        }
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileSource {
    pub path: PathBuf,
    /// Overrides detection from the extension.
    #[serde(default)]
    pub format: Option<FileFormat>,
    /// Worksheet name for Excel files; first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
    /// Field delimiter for CSV / delimited text; sniffed for `.csv` when absent.
    #[serde(default)]
    pub delimiter: Option<char>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            sheet: None,
            delimiter: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Csv,
    /// Plain delimited text, comma unless a delimiter is given.
    Delimited,
    Excel,
    Json,
    Xml,
    FixedWidth,
}

impl FileFormat {
    /// `None` for unrecognized extensions; callers fall back to CSV.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "txt" => Some(Self::Delimited),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "fwf" => Some(Self::FixedWidth),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

/// Every non-empty `*.<extension>` file under `path`, read and stacked.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FolderSource {
    pub path: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "csv".into()
}

// ---------------------------------------------------------------------------
// Databases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseSource {
    pub kind: DatabaseKind,
    /// Database / service name, or the file path for SQLite.
    pub database: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    /// Name of the environment variable holding the password. Never the password itself.
    #[serde(default)]
    pub password_env: Option<String>,
    pub query_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    Sqlite,
    Postgresql,
    Mysql,
    Mssql,
    Oracle,
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Postgresql => write!(f, "postgresql"),
            Self::Mysql => write!(f, "mysql"),
            Self::Mssql => write!(f, "mssql"),
            Self::Oracle => write!(f, "oracle"),
        }
    }
}
