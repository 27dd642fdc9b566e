// XML import: each child of the root element is a row, each of its child
// elements is a column named by tag.

use std::path::Path;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use tabrecon_recon::{Dataset, Value};

use crate::csv::read_file_as_utf8;
use crate::error::AcquisitionError;

pub fn import(path: &Path) -> Result<Dataset, AcquisitionError> {
    let content = read_file_as_utf8(path)?;

    // Whitespace between elements is skipped by depth; field text is trimmed once complete.
    let mut reader = Reader::from_str(&content);

    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<(usize, String)>> = Vec::new();
    let mut depth = 0usize;
    let mut current_row: Vec<(usize, String)> = Vec::new();
    let mut current_col: Option<usize> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                match depth {
                    2 => current_row.clear(),
                    3 => {
                        let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                        current_col = Some(column_slot(&mut columns, tag));
                        text.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => match depth {
                // <field/>: present, null
                2 => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    column_slot(&mut columns, tag);
                }
                // <row/>: a row with no fields
                1 => rows.push(Vec::new()),
                _ => {}
            },
            Ok(Event::Text(ref e)) if depth == 3 => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(ref e)) if depth == 3 => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(ref e)) if depth == 3 => {
                text.push_str(&reference_text(e));
            }
            Ok(Event::End(_)) => {
                match depth {
                    3 => {
                        if let Some(col) = current_col.take() {
                            current_row.push((col, std::mem::take(&mut text).trim().to_string()));
                        }
                    }
                    2 => rows.push(std::mem::take(&mut current_row)),
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AcquisitionError::parse(
                    path,
                    format!("at byte {}: {e}", reader.buffer_position()),
                ))
            }
            _ => {}
        }
    }

    let mut dataset = Dataset::new(columns.clone()).map_err(|e| AcquisitionError::Dataset {
        origin: path.display().to_string(),
        source: e,
    })?;
    for fields in rows {
        let mut row = vec![Value::Null; columns.len()];
        for (col, raw) in fields {
            row[col] = Value::from_text(&raw);
        }
        dataset.push_row(row).map_err(|e| AcquisitionError::Dataset {
            origin: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(dataset)
}

fn column_slot(columns: &mut Vec<String>, tag: String) -> usize {
    match columns.iter().position(|c| *c == tag) {
        Some(i) => i,
        None => {
            columns.push(tag);
            columns.len() - 1
        }
    }
}

/// Text for `&name;`: character references and the five predefined entities
/// resolve, anything else is kept verbatim.
fn reference_text(r: &BytesRef<'_>) -> String {
    let name = String::from_utf8_lossy(r).into_owned();
    if r.is_char_ref() {
        if let Ok(Some(ch)) = r.resolve_char_ref() {
            return ch.to_string();
        }
    } else if let Some(resolved) = resolve_predefined_entity(&name) {
        return resolved.to_string();
    }
    format!("&{name};")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn rows_and_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.xml");
        fs::write(
            &path,
            r#"<?xml version="1.0"?>
<people>
  <person><id>1</id><name>Alice &amp; Co</name></person>
  <person><id>2</id><city>Oslo</city><name/></person>
</people>"#,
        )
        .unwrap();

        let ds = import(&path).unwrap();
        assert_eq!(ds.columns(), &["id", "name", "city"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.row(0).unwrap(), &[Value::Number(1.0), Value::from("Alice & Co"), Value::Null]);
        assert_eq!(ds.row(1).unwrap(), &[Value::Number(2.0), Value::Null, Value::from("Oslo")]);
    }

    #[test]
    fn entity_and_character_references() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("refs.xml");
        fs::write(
            &path,
            "<rows><row><v>&lt;a&gt; &#65;&#x42; &quot;q&apos; &nbsp;x</v></row></rows>",
        )
        .unwrap();

        let ds = import(&path).unwrap();
        assert_eq!(ds.row(0).unwrap(), &[Value::from("<a> AB \"q' &nbsp;x")]);
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.xml");
        fs::write(&path, "<a><b></a>").unwrap();
        assert!(matches!(import(&path), Err(AcquisitionError::Parse { .. })));
    }
}
