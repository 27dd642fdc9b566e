// CSV / delimited text import

use std::io::Read;
use std::path::Path;

use tabrecon_recon::{Dataset, Value};

use crate::error::AcquisitionError;
use crate::table;

/// Import a CSV file, sniffing the delimiter unless one is given.
pub fn import(path: &Path, delimiter: Option<u8>) -> Result<Dataset, AcquisitionError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    import_from_string(path, &content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Higher field count breaks ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, AcquisitionError> {
    let mut file = std::fs::File::open(path).map_err(|e| AcquisitionError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| AcquisitionError::io(path, e))?;

    match String::from_utf8(bytes) {
        Ok(s) if s.starts_with('\u{feff}') => Ok(s['\u{feff}'.len_utf8()..].to_string()),
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(path: &Path, content: &str, delimiter: u8) -> Result<Dataset, AcquisitionError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(r) => r
            .map_err(|e| AcquisitionError::parse(path, e))?
            .iter()
            .map(str::to_string)
            .collect(),
        None => return Err(AcquisitionError::parse(path, "file has no header row")),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| AcquisitionError::parse(path, e))?;
        // Fully blank lines carry no row
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(Value::from_text).collect());
    }

    table::build(path, headers, rows)
}
