//! Pair-by-pair execution of a driver config.
//!
//! Each pair is acquired, mapped, compared and reported on its own. A failure
//! in one pair is recorded in its outcome and never stops the others unless
//! `fail_fast` is set.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, Utc};
use serde::Serialize;
use tabrecon_io::{Acquisition, FileSource};
use tabrecon_recon::{apply_mapping, compare, ColumnMapping, Dataset, MappingWarning};
use tabrecon_report::{write_reports, ReportContext, ReportPaths};
use tracing::{error, info, info_span, warn};

use crate::config::{DriverConfig, PairConfig};
use crate::exit_codes::{EXIT_DISCREPANCIES, EXIT_PAIR_FAILED, EXIT_SUCCESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairStatus {
    Clean,
    Discrepancies,
    Failed,
}

impl PairStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PairStatus::Clean => "clean",
            PairStatus::Discrepancies => "discrepancies",
            PairStatus::Failed => "failed",
        }
    }
}

/// Counts for one compared pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairCounts {
    pub source_rows: usize,
    pub target_rows: usize,
    pub matched_rows: usize,
    pub mismatched_rows: usize,
    pub source_only_rows: usize,
    pub target_only_rows: usize,
    pub source_has_duplicates: bool,
    pub target_has_duplicates: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairOutcome {
    pub name: String,
    pub source: String,
    pub target: String,
    pub status: PairStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<PairCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<ReportPaths>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mapping_warnings: Vec<MappingWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub engine_version: String,
    pub run_at: String,
    pub output_dir: PathBuf,
    pub pairs: Vec<PairOutcome>,
}

impl RunSummary {
    pub fn count(&self, status: PairStatus) -> usize {
        self.pairs.iter().filter(|p| p.status == status).count()
    }

    /// Failures outrank discrepancies; clean only when every pair is clean.
    pub fn exit_code(&self) -> u8 {
        if self.count(PairStatus::Failed) > 0 {
            EXIT_PAIR_FAILED
        } else if self.count(PairStatus::Discrepancies) > 0 {
            EXIT_DISCREPANCIES
        } else {
            EXIT_SUCCESS
        }
    }
}

/// Options that come from the command line rather than the driver config.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub output_dir: Option<PathBuf>,
    pub fail_fast: bool,
}

/// Run every pair in order. `base_dir` anchors relative paths in the config.
pub fn run(config: &DriverConfig, base_dir: &Path, options: &RunOptions) -> RunSummary {
    let output_dir = config.resolve_output_dir(base_dir, options.output_dir.as_deref());
    let acquisition = Acquisition::new(base_dir);
    let mut outcomes = Vec::with_capacity(config.pairs.len());

    for pair in &config.pairs {
        let outcome = run_pair(pair, &acquisition, &output_dir);
        let stop = options.fail_fast && outcome.status == PairStatus::Failed;
        outcomes.push(outcome);
        if stop {
            warn!(pair = %pair.label(), "fail-fast: skipping remaining pairs");
            break;
        }
    }

    RunSummary {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: Utc::now().to_rfc3339(),
        output_dir,
        pairs: outcomes,
    }
}

/// Acquire, map, compare and report one pair. Never panics on bad input;
/// every error becomes a `Failed` outcome.
pub fn run_pair(pair: &PairConfig, acquisition: &Acquisition, output_dir: &Path) -> PairOutcome {
    let name = pair.label();
    let span = info_span!("pair", name = %name);
    let _guard = span.enter();

    let start = Instant::now();
    let mut outcome = PairOutcome {
        name: name.clone(),
        source: pair.source.name.clone(),
        target: pair.target.name.clone(),
        status: PairStatus::Failed,
        counts: None,
        reports: None,
        mapping_warnings: Vec::new(),
        error: None,
        duration_ms: 0,
    };

    match execute(pair, acquisition, output_dir, &mut outcome) {
        Ok(status) => outcome.status = status,
        Err(message) => {
            error!(error = %message, "pair failed");
            outcome.error = Some(message);
        }
    }
    outcome.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        status = outcome.status.as_str(),
        elapsed_ms = outcome.duration_ms,
        "pair finished"
    );
    outcome
}

fn execute(
    pair: &PairConfig,
    acquisition: &Acquisition,
    output_dir: &Path,
    outcome: &mut PairOutcome,
) -> Result<PairStatus, String> {
    let source = acquisition
        .fetch(&pair.source.descriptor)
        .map_err(|e| format!("source '{}': {e}", pair.source.name))?;
    let target = acquisition
        .fetch(&pair.target.descriptor)
        .map_err(|e| format!("target '{}': {e}", pair.target.name))?;

    let mapping = load_mapping(pair, acquisition)?;
    let source = if mapping.is_empty() {
        source
    } else {
        let (mapped, warnings) = apply_mapping(&source, &mapping, target.columns());
        outcome.mapping_warnings = warnings;
        mapped
    };

    let result = compare(&source, &target, &pair.join_key(), &pair.tolerance).map_err(|e| e.to_string())?;

    let ctx = ReportContext::new(
        &pair.source.name,
        &pair.target.name,
        &result,
        Local::now().naive_local(),
    );
    outcome.counts = Some(PairCounts {
        source_rows: ctx.summary.source_rows,
        target_rows: ctx.summary.target_rows,
        matched_rows: ctx.summary.common_rows,
        mismatched_rows: ctx.summary.rows_with_mismatch,
        source_only_rows: ctx.summary.source_only_rows,
        target_only_rows: ctx.summary.target_only_rows,
        source_has_duplicates: ctx.summary.source_has_duplicates,
        target_has_duplicates: ctx.summary.target_has_duplicates,
    });

    let paths = write_reports(&ctx, output_dir).map_err(|e| format!("report: {e}"))?;
    outcome.reports = Some(paths);

    Ok(if ctx.summary.is_clean() {
        PairStatus::Clean
    } else {
        PairStatus::Discrepancies
    })
}

/// `mapping_file` entries first, then inline `column_map`.
fn load_mapping(pair: &PairConfig, acquisition: &Acquisition) -> Result<ColumnMapping, String> {
    let mut mapping = ColumnMapping::default();
    if let Some(file) = &pair.mapping_file {
        let path = acquisition.resolve(file);
        let sheet: Dataset = tabrecon_io::load_file(&FileSource::new(&path))
            .map_err(|e| format!("mapping file: {e}"))?;
        let from_file = ColumnMapping::from_dataset(&sheet).map_err(|e| format!("mapping file {}: {e}", path.display()))?;
        mapping.extend(from_file);
    }
    mapping.extend(ColumnMapping::new(pair.column_map.clone()));
    Ok(mapping)
}
