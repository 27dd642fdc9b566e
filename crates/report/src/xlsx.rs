// Spreadsheet export: full row listings plus a summary sheet

use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};
use tabrecon_recon::{ComparisonResult, Side, Value};

use crate::html::mismatched_headers;
use crate::{ReportContext, ReportError};

pub const MISMATCHED_SHEET: &str = "Mismatched Rows";
pub const SOURCE_ONLY_SHEET: &str = "Source Only Rows";
pub const TARGET_ONLY_SHEET: &str = "Target Only Rows";
pub const SUMMARY_SHEET: &str = "Summary";

struct Formats {
    header: Format,
    diff: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold().set_background_color(Color::RGB(0xF3F3F3)),
            diff: Format::new().set_background_color(Color::RGB(0xFF6347)),
        }
    }
}

/// Row sheets are written only when they have rows; `Summary` always is.
pub fn write(ctx: &ReportContext<'_>, path: &Path) -> Result<(), ReportError> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();
    let result = ctx.result;

    if result.mismatched_count() > 0 {
        let sheet = workbook.add_worksheet();
        sheet.set_name(MISMATCHED_SHEET)?;
        write_mismatched(sheet, result, &formats)?;
    }
    for (side, name) in [(Side::Source, SOURCE_ONLY_SHEET), (Side::Target, TARGET_ONLY_SHEET)] {
        if !result.unmatched_rows(side).is_empty() {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name)?;
            write_unmatched(sheet, result, side, &formats)?;
        }
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(SUMMARY_SHEET)?;
    write_summary(sheet, ctx, &formats)?;

    workbook.save(path)?;
    Ok(())
}

fn write_header(sheet: &mut Worksheet, headers: &[String], formats: &Formats) -> Result<(), XlsxError> {
    for (col, name) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &formats.header)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn write_value(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match (value, format) {
        (Value::Null, Some(f)) => sheet.write_blank(row, col, f).map(|_| ()),
        (Value::Null, None) => Ok(()),
        (Value::Bool(b), Some(f)) => sheet.write_boolean_with_format(row, col, *b, f).map(|_| ()),
        (Value::Bool(b), None) => sheet.write_boolean(row, col, *b).map(|_| ()),
        (Value::Number(n), Some(f)) => sheet.write_number_with_format(row, col, *n, f).map(|_| ()),
        (Value::Number(n), None) => sheet.write_number(row, col, *n).map(|_| ()),
        (Value::String(s), Some(f)) => sheet.write_string_with_format(row, col, s, f).map(|_| ()),
        (Value::String(s), None) => sheet.write_string(row, col, s).map(|_| ()),
    }
}

fn write_mismatched(sheet: &mut Worksheet, result: &ComparisonResult, formats: &Formats) -> Result<(), XlsxError> {
    write_header(sheet, &mismatched_headers(result), formats)?;

    for (i, matched) in result.mismatched_rows().enumerate() {
        let row = i as u32 + 1;
        let mut col: u16 = 0;
        for value in &matched.key.0 {
            write_value(sheet, row, col, value, None)?;
            col += 1;
        }
        for pair in &matched.cells {
            let format = (!pair.equal).then_some(&formats.diff);
            write_value(sheet, row, col, &pair.source, format)?;
            write_value(sheet, row, col + 1, &pair.target, format)?;
            col += 2;
        }
    }
    Ok(())
}

fn write_unmatched(
    sheet: &mut Worksheet,
    result: &ComparisonResult,
    side: Side,
    formats: &Formats,
) -> Result<(), XlsxError> {
    write_header(sheet, result.columns(side), formats)?;

    for (i, unmatched) in result.unmatched_rows(side).iter().enumerate() {
        for (col, value) in unmatched.values.iter().enumerate() {
            write_value(sheet, i as u32 + 1, col as u16, value, None)?;
        }
    }
    Ok(())
}

fn write_summary(sheet: &mut Worksheet, ctx: &ReportContext<'_>, formats: &Formats) -> Result<(), XlsxError> {
    let result = ctx.result;
    let s = &ctx.summary;
    let yes_no = |b: bool| if b { "Yes" } else { "No" };

    let text_rows: [(&str, String); 7] = [
        ("Source", ctx.source_name.clone()),
        ("Target", ctx.target_name.clone()),
        ("Generated at", ctx.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ("Join key", result.join_key.columns().join(", ")),
        ("Spaces ignored", yes_no(result.tolerance.ignore_spaces).to_string()),
        ("Duplicate keys in source", yes_no(s.source_has_duplicates).to_string()),
        ("Duplicate keys in target", yes_no(s.target_has_duplicates).to_string()),
    ];
    let number_rows: [(&str, f64); 17] = [
        ("Absolute tolerance", result.tolerance.absolute),
        ("Relative tolerance", result.tolerance.relative),
        ("Source rows", s.source_rows as f64),
        ("Source columns", s.source_columns as f64),
        ("Target rows", s.target_rows as f64),
        ("Target columns", s.target_columns as f64),
        ("Common rows", s.common_rows as f64),
        ("Rows only in source", s.source_only_rows as f64),
        ("Rows only in target", s.target_only_rows as f64),
        ("Rows without mismatch", s.rows_without_mismatch as f64),
        ("Rows with mismatch", s.rows_with_mismatch as f64),
        ("Common columns", s.common_columns as f64),
        ("Columns only in source", s.source_only_columns as f64),
        ("Columns only in target", s.target_only_columns as f64),
        ("Columns fully matching", s.columns_all_match as f64),
        ("Columns with mismatch", s.columns_with_mismatch as f64),
        ("Compared columns", result.compare_columns.len() as f64),
    ];

    let mut row = 0u32;
    for (label, value) in &text_rows {
        sheet.write_string_with_format(row, 0, *label, &formats.header)?;
        sheet.write_string(row, 1, value)?;
        row += 1;
    }
    for (label, value) in &number_rows {
        sheet.write_string_with_format(row, 0, *label, &formats.header)?;
        sheet.write_number(row, 1, *value)?;
        row += 1;
    }
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 32)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto, Data, Reader};
    use chrono::NaiveDate;
    use tabrecon_recon::{compare, Dataset, JoinKey, ToleranceSpec};
    use tempfile::tempdir;

    fn ctx_time() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn empty_sheets_are_omitted() {
        let src = Dataset::from_rows(["id", "v"], vec![vec![Value::from(1), Value::from(1)]]).unwrap();
        let r = compare(&src, &src.clone(), &JoinKey::new(["id"]), &ToleranceSpec::exact()).unwrap();
        let ctx = ReportContext::new("s", "t", &r, ctx_time());

        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.xlsx");
        write(&ctx, &path).unwrap();

        let wb = open_workbook_auto(&path).unwrap();
        assert_eq!(wb.sheet_names(), vec![SUMMARY_SHEET.to_string()]);
    }

    #[test]
    fn all_sheets_with_rows() {
        let src = Dataset::from_rows(
            ["id", "v"],
            vec![
                vec![Value::from(1), Value::from("a")],
                vec![Value::from(2), Value::from("b")],
            ],
        )
        .unwrap();
        let tgt = Dataset::from_rows(
            ["id", "v"],
            vec![
                vec![Value::from(1), Value::from("A")],
                vec![Value::from(3), Value::from("c")],
            ],
        )
        .unwrap();
        let r = compare(&src, &tgt, &JoinKey::new(["id"]), &ToleranceSpec::exact()).unwrap();
        let ctx = ReportContext::new("s", "t", &r, ctx_time());

        let dir = tempdir().unwrap();
        let path = dir.path().join("full.xlsx");
        write(&ctx, &path).unwrap();

        let mut wb = open_workbook_auto(&path).unwrap();
        assert_eq!(
            wb.sheet_names(),
            vec![
                MISMATCHED_SHEET.to_string(),
                SOURCE_ONLY_SHEET.to_string(),
                TARGET_ONLY_SHEET.to_string(),
                SUMMARY_SHEET.to_string(),
            ]
        );

        let mismatched = wb.worksheet_range(MISMATCHED_SHEET).unwrap();
        assert_eq!(mismatched.get_value((0, 1)), Some(&Data::String("v (source)".into())));
        assert_eq!(mismatched.get_value((1, 0)), Some(&Data::Float(1.0)));
        assert_eq!(mismatched.get_value((1, 2)), Some(&Data::String("A".into())));

        let target_only = wb.worksheet_range(TARGET_ONLY_SHEET).unwrap();
        assert_eq!(target_only.get_value((1, 1)), Some(&Data::String("c".into())));
    }
}
