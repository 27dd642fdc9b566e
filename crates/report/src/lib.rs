// Report rendering for reconciliation results
//
// One run produces two files sharing a stem: an HTML overview with capped
// row previews, and a spreadsheet with every unmatched and mismatched row.

pub mod html;
pub mod naming;
pub mod xlsx;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tabrecon_recon::{detect_duplicates, ComparisonResult, DuplicateReport, ReconSummary};
use thiserror::Error;
use tracing::info;

pub use html::PREVIEW_ROW_LIMIT;
pub use naming::{report_stem, sanitize};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

/// Everything a report shows about one compared pair.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub source_name: String,
    pub target_name: String,
    pub result: &'a ComparisonResult,
    pub summary: ReconSummary,
    pub duplicates: DuplicateReport,
    pub generated_at: NaiveDateTime,
}

impl<'a> ReportContext<'a> {
    /// Derives duplicates and summary from the result.
    pub fn new(
        source_name: impl Into<String>,
        target_name: impl Into<String>,
        result: &'a ComparisonResult,
        generated_at: NaiveDateTime,
    ) -> Self {
        let duplicates = detect_duplicates(result);
        let summary = ReconSummary::with_duplicates(result, &duplicates);
        Self {
            source_name: source_name.into(),
            target_name: target_name.into(),
            result,
            summary,
            duplicates,
            generated_at,
        }
    }

    pub fn stem(&self) -> String {
        report_stem(&self.source_name, &self.target_name, self.generated_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPaths {
    pub html: PathBuf,
    pub xlsx: PathBuf,
}

/// Write `<stem>.html` and `<stem>.xlsx` into `out_dir`, creating it if needed.
pub fn write_reports(ctx: &ReportContext<'_>, out_dir: &Path) -> Result<ReportPaths, ReportError> {
    std::fs::create_dir_all(out_dir).map_err(|source| ReportError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let stem = ctx.stem();
    let paths = ReportPaths {
        html: out_dir.join(format!("{stem}.html")),
        xlsx: out_dir.join(format!("{stem}.xlsx")),
    };

    let page = html::render(ctx)?;
    std::fs::write(&paths.html, page).map_err(|source| ReportError::Io {
        path: paths.html.clone(),
        source,
    })?;
    xlsx::write(ctx, &paths.xlsx)?;

    info!(html = %paths.html.display(), xlsx = %paths.xlsx.display(), "reports written");
    Ok(paths)
}
