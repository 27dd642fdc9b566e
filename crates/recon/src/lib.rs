//! `tabrecon-recon` — key-join reconciliation engine for tabular datasets.
//!
//! Pure engine crate: receives two materialized datasets, returns a
//! `ComparisonResult`. No IO, no CLI, no report rendering.

pub mod config;
pub mod dataset;
pub mod duplicates;
pub mod engine;
pub mod equality;
pub mod error;
pub mod mapper;
mod matcher;
pub mod model;
pub mod stats;
pub mod summary;
pub mod value;

pub use config::{JoinKey, ToleranceSpec};
pub use dataset::Dataset;
pub use duplicates::{detect_duplicates, DuplicateReport};
pub use engine::compare;
pub use error::ReconError;
pub use mapper::{apply_mapping, ColumnMapping, MappingWarning};
pub use model::{CellPair, ColumnStat, ComparisonResult, KeyTuple, MatchedRow, Side, UnmatchedRow};
pub use summary::ReconSummary;
pub use value::{Value, ValueKind};
