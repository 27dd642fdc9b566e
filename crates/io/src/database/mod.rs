// Database acquisition
//
// A query file is run against a backend chosen by `DatabaseKind`. Backends
// implement `Connector`; the registry maps kinds to connectors. SQLite is
// always registered; PostgreSQL and MySQL come with the `postgres` and
// `mysql` cargo features.

#[cfg(feature = "mysql")]
mod mysql;
#[cfg(feature = "postgres")]
mod postgres;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tabrecon_recon::{Dataset, Value};
use tracing::debug;

use crate::descriptor::{DatabaseKind, DatabaseSource};
use crate::error::AcquisitionError;
use crate::table::clean_headers;

#[cfg(feature = "mysql")]
pub use self::mysql::MysqlConnector;
#[cfg(feature = "postgres")]
pub use self::postgres::PostgresConnector;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A password read from the environment. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Everything a connector needs to open a session.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub kind: DatabaseKind,
    pub database: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<Secret>,
}

impl ConnectionParams {
    /// Resolve `password_env` from the process environment.
    pub fn from_source(source: &DatabaseSource) -> Result<Self, AcquisitionError> {
        Self::resolve(source, |name| std::env::var(name).ok())
    }

    fn resolve(
        source: &DatabaseSource,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AcquisitionError> {
        let password = match &source.password_env {
            Some(var) => Some(Secret::new(
                lookup(var).ok_or_else(|| AcquisitionError::MissingCredential(var.clone()))?,
            )),
            None => None,
        };
        Ok(Self {
            kind: source.kind,
            database: source.database.clone(),
            host: source.host.clone(),
            port: source.port,
            user: source.user.clone(),
            password,
        })
    }
}

// ---------------------------------------------------------------------------
// Connectors
// ---------------------------------------------------------------------------

/// Runs one query and returns the full result set.
pub trait Connector: Send + Sync {
    fn query(&self, params: &ConnectionParams, sql: &str) -> Result<Dataset, AcquisitionError>;
}

#[derive(Clone)]
pub struct ConnectorRegistry {
    connectors: HashMap<DatabaseKind, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    /// No connectors at all.
    pub fn empty() -> Self {
        Self {
            connectors: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: DatabaseKind, connector: Arc<dyn Connector>) {
        self.connectors.insert(kind, connector);
    }

    pub fn get(&self, kind: DatabaseKind) -> Option<&Arc<dyn Connector>> {
        self.connectors.get(&kind)
    }

    pub fn supports(&self, kind: DatabaseKind) -> bool {
        self.connectors.contains_key(&kind)
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(DatabaseKind::Sqlite, Arc::new(SqliteConnector));
        #[cfg(feature = "postgres")]
        registry.register(DatabaseKind::Postgresql, Arc::new(PostgresConnector));
        #[cfg(feature = "mysql")]
        registry.register(DatabaseKind::Mysql, Arc::new(MysqlConnector));
        registry
    }
}

impl fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<String> = self.connectors.keys().map(ToString::to_string).collect();
        kinds.sort();
        f.debug_struct("ConnectorRegistry").field("kinds", &kinds).finish()
    }
}

/// Read the query file, resolve credentials, dispatch to the registered connector.
pub fn fetch(
    source: &DatabaseSource,
    query_file: &Path,
    registry: &ConnectorRegistry,
) -> Result<Dataset, AcquisitionError> {
    if !query_file.is_file() {
        return Err(AcquisitionError::QueryFileNotFound(query_file.to_path_buf()));
    }
    let sql = std::fs::read_to_string(query_file).map_err(|e| AcquisitionError::io(query_file, e))?;

    let connector = registry
        .get(source.kind)
        .ok_or(AcquisitionError::UnsupportedBackend(source.kind))?;
    let params = ConnectionParams::from_source(source)?;

    debug!(kind = %source.kind, database = %source.database, "running query");
    connector.query(&params, &sql)
}

/// Empty dataset for a result set. Repeated names from joins get `.1`, `.2`
/// suffixes, blank names become `Unnamed: <i>`.
pub(crate) fn result_dataset(origin: &str, columns: Vec<String>) -> Result<Dataset, AcquisitionError> {
    Dataset::new(clean_headers(columns)).map_err(|e| AcquisitionError::Dataset {
        origin: origin.to_string(),
        source: e,
    })
}

pub(crate) fn push_result_row(
    dataset: &mut Dataset,
    origin: &str,
    values: Vec<Value>,
) -> Result<(), AcquisitionError> {
    dataset.push_row(values).map_err(|e| AcquisitionError::Dataset {
        origin: origin.to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// `database` is the path of the SQLite file, opened read-only.
pub struct SqliteConnector;

impl Connector for SqliteConnector {
    fn query(&self, params: &ConnectionParams, sql: &str) -> Result<Dataset, AcquisitionError> {
        let path = Path::new(&params.database);
        if !path.is_file() {
            return Err(AcquisitionError::NotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(db_error)?;

        let mut stmt = conn.prepare(sql).map_err(db_error)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut dataset = result_dataset(&params.database, columns)?;

        let mut rows = stmt.query([]).map_err(db_error)?;
        while let Some(row) = rows.next().map_err(db_error)? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(sqlite_value(row.get_ref(i).map_err(db_error)?));
            }
            push_result_row(&mut dataset, &params.database, values)?;
        }
        Ok(dataset)
    }
}

fn sqlite_value(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Number(n as f64),
        ValueRef::Real(f) => Value::Number(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

fn db_error(e: rusqlite::Error) -> AcquisitionError {
    AcquisitionError::Database(e.to_string())
}
