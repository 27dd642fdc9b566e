// HTML report, rendered from an embedded minijinja template

use minijinja::Environment;
use serde::Serialize;
use tabrecon_recon::{ComparisonResult, ReconSummary, Side, Value};

use crate::{ReportContext, ReportError};

/// Row tables in the HTML report stop here; the spreadsheet has everything.
pub const PREVIEW_ROW_LIMIT: usize = 500;

const TEMPLATE_NAME: &str = "report.html";
const TEMPLATE: &str = include_str!("templates/report.html");

#[derive(Debug, Serialize)]
struct Page<'a> {
    source_name: &'a str,
    target_name: &'a str,
    generated_at: String,
    join_key: &'a [String],
    absolute: f64,
    relative: f64,
    ignore_spaces: bool,
    summary: &'a ReconSummary,
    source_duplicates: &'static str,
    target_duplicates: &'static str,
    column_stats: Vec<StatRow<'a>>,
    mismatched: Table,
    source_only: Table,
    target_only: Table,
}

#[derive(Debug, Serialize)]
struct StatRow<'a> {
    column: &'a str,
    matched: usize,
    equal: usize,
    unequal: usize,
    all_match: bool,
    max_diff: String,
    null_diff: usize,
    source_kind: String,
    target_kind: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub total: usize,
    pub limit: usize,
    pub truncated: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct Cell {
    pub text: String,
    pub highlight: bool,
}

impl Cell {
    fn plain(value: &Value) -> Self {
        Self {
            text: value.to_string(),
            highlight: false,
        }
    }
}

pub fn render(ctx: &ReportContext<'_>) -> Result<String, ReportError> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    let template = env.get_template(TEMPLATE_NAME)?;

    let result = ctx.result;
    let page = Page {
        source_name: &ctx.source_name,
        target_name: &ctx.target_name,
        generated_at: ctx.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        join_key: result.join_key.columns(),
        absolute: result.tolerance.absolute,
        relative: result.tolerance.relative,
        ignore_spaces: result.tolerance.ignore_spaces,
        summary: &ctx.summary,
        source_duplicates: yes_no(ctx.summary.source_has_duplicates),
        target_duplicates: yes_no(ctx.summary.target_has_duplicates),
        column_stats: result
            .column_stats
            .iter()
            .map(|s| StatRow {
                column: &s.column,
                matched: s.matched,
                equal: s.equal,
                unequal: s.unequal,
                all_match: s.all_match,
                max_diff: s.max_diff.map(|d| d.to_string()).unwrap_or_default(),
                null_diff: s.null_diff,
                source_kind: s.source_kind.to_string(),
                target_kind: s.target_kind.to_string(),
            })
            .collect(),
        mismatched: mismatched_table(result, PREVIEW_ROW_LIMIT),
        source_only: unmatched_table(result, Side::Source, PREVIEW_ROW_LIMIT),
        target_only: unmatched_table(result, Side::Target, PREVIEW_ROW_LIMIT),
    };

    Ok(template.render(&page)?)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Key columns, then a source/target column pair per compared column.
pub(crate) fn mismatched_headers(result: &ComparisonResult) -> Vec<String> {
    let mut headers: Vec<String> = result.join_key.columns().to_vec();
    for col in &result.compare_columns {
        headers.push(format!("{col} (source)"));
        headers.push(format!("{col} (target)"));
    }
    headers
}

pub(crate) fn mismatched_table(result: &ComparisonResult, limit: usize) -> Table {
    let total = result.mismatched_count();
    let rows = result
        .mismatched_rows()
        .take(limit)
        .map(|row| {
            let mut cells: Vec<Cell> = row.key.0.iter().map(Cell::plain).collect();
            for pair in &row.cells {
                for value in [&pair.source, &pair.target] {
                    cells.push(Cell {
                        text: value.to_string(),
                        highlight: !pair.equal,
                    });
                }
            }
            cells
        })
        .collect();
    Table {
        headers: mismatched_headers(result),
        rows,
        total,
        limit,
        truncated: total > limit,
    }
}

pub(crate) fn unmatched_table(result: &ComparisonResult, side: Side, limit: usize) -> Table {
    let unmatched = result.unmatched_rows(side);
    Table {
        headers: result.columns(side).to_vec(),
        rows: unmatched
            .iter()
            .take(limit)
            .map(|row| row.values.iter().map(Cell::plain).collect())
            .collect(),
        total: unmatched.len(),
        limit,
        truncated: unmatched.len() > limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tabrecon_recon::{compare, Dataset, JoinKey, ToleranceSpec};

    fn result(rows: usize) -> ComparisonResult {
        let src = Dataset::from_rows(
            ["id", "v"],
            (0..rows).map(|i| vec![Value::from(i as i64), Value::from("a")]).collect(),
        )
        .unwrap();
        let tgt = Dataset::from_rows(
            ["id", "v"],
            (0..rows).map(|i| vec![Value::from(i as i64), Value::from("<b>")]).collect(),
        )
        .unwrap();
        compare(&src, &tgt, &JoinKey::new(["id"]), &ToleranceSpec::exact()).unwrap()
    }

    #[test]
    fn preview_is_capped() {
        let r = result(PREVIEW_ROW_LIMIT + 3);
        let table = mismatched_table(&r, PREVIEW_ROW_LIMIT);
        assert_eq!(table.total, PREVIEW_ROW_LIMIT + 3);
        assert_eq!(table.rows.len(), PREVIEW_ROW_LIMIT);
        assert!(table.truncated);
        assert_eq!(table.headers, vec!["id", "v (source)", "v (target)"]);

        let small = mismatched_table(&result(2), PREVIEW_ROW_LIMIT);
        assert!(!small.truncated);
        assert!(!small.rows[0][0].highlight);
        assert!(small.rows[0][1].highlight && small.rows[0][2].highlight);
    }

    #[test]
    fn render_escapes_and_flags() {
        let r = result(2);
        let generated_at = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let ctx = ReportContext::new("crm", "wh", &r, generated_at);
        let html = render(&ctx).unwrap();

        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("2024-01-02 03:04:05"));
        assert!(html.contains("class=\"diff\""));
        assert!(!html.contains("Showing the first"));
    }

    #[test]
    fn render_notes_truncation() {
        let r = result(PREVIEW_ROW_LIMIT + 1);
        let ctx = ReportContext::new(
            "a",
            "b",
            &r,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        );
        let html = render(&ctx).unwrap();
        assert!(html.contains("Showing the first 500 of 501 rows"));
    }
}
