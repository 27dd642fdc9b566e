//! Driver config: which pairs to reconcile and how.
//!
//! ```toml
//! output_dir = "recon_reports"
//!
//! [[pairs]]
//! keys = ["id"]
//! column_map = { cust_name = "name" }
//! [pairs.tolerance]
//! absolute = 0.01
//! [pairs.source]
//! name = "crm"
//! type = "file"
//! path = "crm.csv"
//! [pairs.target]
//! name = "warehouse"
//! type = "database"
//! kind = "sqlite"
//! database = "wh.db"
//! query_file = "customers.sql"
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tabrecon_io::SourceDescriptor;
use tabrecon_recon::{JoinKey, ToleranceSpec};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    /// Report directory, relative to the config file. Defaults to `recon_reports`.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
}

impl DriverConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: DriverConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pairs.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[pairs]] entry is required".into(),
            ));
        }

        let mut labels = HashSet::new();
        for (i, pair) in self.pairs.iter().enumerate() {
            let label = pair.label();
            pair.validate()
                .map_err(|msg| ConfigError::Validation(format!("pair {} ({label}): {msg}", i + 1)))?;
            if !labels.insert(label.clone()) {
                return Err(ConfigError::Validation(format!(
                    "pair {} ({label}): duplicate pair name; set a distinct `name`",
                    i + 1
                )));
            }
        }
        Ok(())
    }

    /// Report directory, with `--output-dir` taking precedence.
    pub fn resolve_output_dir(&self, base_dir: &Path, cli_override: Option<&Path>) -> PathBuf {
        match cli_override {
            Some(dir) => dir.to_path_buf(),
            None => {
                let dir = self
                    .output_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("recon_reports"));
                if dir.is_absolute() {
                    dir
                } else {
                    base_dir.join(dir)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pairs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PairConfig {
    /// Label used in logs and the run summary. Defaults to `<source>_vs_<target>`.
    #[serde(default)]
    pub name: Option<String>,
    pub keys: Vec<String>,
    /// Inline `source column = target column` renames, applied after
    /// `mapping_file`, in the order written.
    #[serde(default, deserialize_with = "entries_in_order")]
    pub column_map: Vec<(String, String)>,
    /// Sheet (CSV or Excel) with `source` and `target` columns.
    #[serde(default)]
    pub mapping_file: Option<PathBuf>,
    #[serde(default)]
    pub tolerance: ToleranceSpec,
    pub source: SideConfig,
    pub target: SideConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SideConfig {
    pub name: String,
    #[serde(flatten)]
    pub descriptor: SourceDescriptor,
}

impl PairConfig {
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}_vs_{}", self.source.name, self.target.name),
        }
    }

    pub fn join_key(&self) -> JoinKey {
        JoinKey::new(self.keys.iter().map(|k| k.trim()))
    }

    fn validate(&self) -> Result<(), String> {
        let key = self.join_key();
        if key.is_empty() || key.columns().iter().any(String::is_empty) {
            return Err("`keys` must list at least one non-empty column name".into());
        }
        let mut seen = HashSet::new();
        for k in key.columns() {
            if !seen.insert(k) {
                return Err(format!("key column '{k}' listed twice"));
            }
        }
        if let Some(reason) = self.tolerance.invalid_reason() {
            return Err(reason);
        }
        for side in [&self.source, &self.target] {
            if side.name.trim().is_empty() {
                return Err("source and target need a non-empty `name`".into());
            }
        }
        for (from, to) in &self.column_map {
            if from.trim().is_empty() || to.trim().is_empty() {
                return Err("`column_map` entries must name both columns".into());
            }
        }
        Ok(())
    }
}

fn entries_in_order<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<(String, String)>, D::Error> {
    struct Entries;

    impl<'de> Visitor<'de> for Entries {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a table of `source column = \"target column\"` entries")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, String>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(Entries)
}
