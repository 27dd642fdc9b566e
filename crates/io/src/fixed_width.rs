// Fixed-width text import
//
// Column boundaries are inferred: a character position that is blank on every
// non-empty line separates fields. The first line supplies the headers.

use std::path::Path;

use tabrecon_recon::{Dataset, Value};

use crate::csv::read_file_as_utf8;
use crate::error::AcquisitionError;
use crate::table;

pub fn import(path: &Path) -> Result<Dataset, AcquisitionError> {
    let content = read_file_as_utf8(path)?;
    let lines: Vec<Vec<char>> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().collect())
        .collect();

    let Some(header) = lines.first() else {
        return Err(AcquisitionError::parse(path, "file has no header row"));
    };
    let spans = infer_spans(&lines);
    if spans.is_empty() {
        return Err(AcquisitionError::parse(path, "no columns found"));
    }

    let headers = spans.iter().map(|&span| slice(header, span)).collect();
    let rows = lines[1..].iter().map(|line| {
        spans
            .iter()
            .map(|&span| Value::from_text(&slice(line, span)))
            .collect::<Vec<_>>()
    });

    table::build(path, headers, rows)
}

/// Half-open character ranges covering each column.
fn infer_spans(lines: &[Vec<char>]) -> Vec<(usize, usize)> {
    let width = lines.iter().map(Vec::len).max().unwrap_or(0);
    let mut occupied = vec![false; width];
    for line in lines {
        for (i, c) in line.iter().enumerate() {
            if !c.is_whitespace() {
                occupied[i] = true;
            }
        }
    }

    let mut spans = Vec::new();
    let mut start = None;
    for (i, &used) in occupied.iter().enumerate() {
        match (used, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, width));
    }
    spans
}

fn slice(line: &[char], (start, end): (usize, usize)) -> String {
    if start >= line.len() {
        return String::new();
    }
    line[start..end.min(line.len())].iter().collect::<String>().trim().to_string()
}
