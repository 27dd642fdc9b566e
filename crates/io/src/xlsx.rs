// Excel import (xlsx, xls, xlsm, xlsb, ods)
//
// One sheet becomes one dataset: first row is the header, cells keep their
// spreadsheet type. Dates become ISO text so they compare against CSV sources.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate};
use tabrecon_recon::{Dataset, Value};

use crate::error::AcquisitionError;
use crate::table;

pub fn import(path: &Path, sheet: Option<&str>) -> Result<Dataset, AcquisitionError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| AcquisitionError::parse(path, format!("failed to open Excel file: {e}")))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| AcquisitionError::parse(path, "Excel file contains no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AcquisitionError::parse(path, format!("failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(header_text).collect(),
        None => return Err(AcquisitionError::parse(path, format!("sheet '{sheet_name}' is empty"))),
    };

    let body: Vec<Vec<Value>> = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    table::build(path, headers, body)
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        Value::Null => String::new(),
        v => v.to_string(),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Float(n) => Value::Number(*n),
        Data::Int(n) => Value::Number(*n as f64),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => serial_to_text(dt.as_f64())
            .map(Value::String)
            .unwrap_or(Value::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => Value::String(format!("#{e:?}")),
    }
}

/// Excel 1900-system serial (days since 1899-12-30) to `YYYY-MM-DD[ HH:MM:SS]`.
fn serial_to_text(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let dt = epoch.checked_add_signed(Duration::milliseconds(millis))?;
    if serial.fract() == 0.0 {
        Some(dt.format("%Y-%m-%d").to_string())
    } else {
        Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    #[test]
    fn serial_dates() {
        assert_eq!(serial_to_text(45292.0).as_deref(), Some("2024-01-01"));
        assert_eq!(serial_to_text(45292.5).as_deref(), Some("2024-01-01 12:00:00"));
    }

    #[test]
    fn import_first_and_named_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        let mut wb = Workbook::new();
        let first = wb.add_worksheet();
        first.set_name("Orders").unwrap();
        first.write_string(0, 0, "id").unwrap();
        first.write_string(0, 1, "amount").unwrap();
        first.write_number(1, 0, 1).unwrap();
        first.write_number(1, 1, 12.5).unwrap();
        first.write_number(2, 0, 2).unwrap();
        first.write_boolean(2, 1, true).unwrap();
        let second = wb.add_worksheet();
        second.set_name("Other").unwrap();
        second.write_string(0, 0, "x").unwrap();
        wb.save(&path).unwrap();

        let ds = import(&path, None).unwrap();
        assert_eq!(ds.columns(), &["id", "amount"]);
        assert_eq!(ds.row(0).unwrap(), &[Value::Number(1.0), Value::Number(12.5)]);
        assert_eq!(ds.row(1).unwrap(), &[Value::Number(2.0), Value::Bool(true)]);

        let other = import(&path, Some("Other")).unwrap();
        assert_eq!(other.columns(), &["x"]);
        assert!(other.is_empty());

        assert!(import(&path, Some("Missing")).is_err());
    }
}
