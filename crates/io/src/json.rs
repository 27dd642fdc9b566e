// JSON import: an array of flat objects, one object per row

use std::path::Path;

use serde_json::Value as Json;
use tabrecon_recon::{Dataset, Value};

use crate::csv::read_file_as_utf8;
use crate::error::AcquisitionError;

/// Columns are the union of object keys in first-seen order; absent keys are null.
/// Nested arrays/objects are kept as their JSON text.
pub fn import(path: &Path) -> Result<Dataset, AcquisitionError> {
    let content = read_file_as_utf8(path)?;
    let doc: Json = serde_json::from_str(&content).map_err(|e| AcquisitionError::parse(path, e))?;

    let Json::Array(items) = doc else {
        return Err(AcquisitionError::parse(path, "expected a top-level array of objects"));
    };

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let Json::Object(map) = item else {
            return Err(AcquisitionError::parse(path, format!("element {i} is not an object")));
        };
        for key in map.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
        objects.push(map);
    }

    let mut dataset = Dataset::new(columns.clone()).map_err(|e| AcquisitionError::Dataset {
        origin: path.display().to_string(),
        source: e,
    })?;
    for mut obj in objects {
        let row = columns
            .iter()
            .map(|c| obj.remove(c).map_or(Value::Null, json_value))
            .collect();
        dataset.push_row(row).map_err(|e| AcquisitionError::Dataset {
            origin: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(dataset)
}

fn json_value(v: Json) -> Value {
    match v {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        Json::String(s) => Value::String(s),
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn records_with_ragged_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.json");
        fs::write(
            &path,
            r#"[{"id": 1, "name": "Alice"}, {"name": "Bob", "id": 2, "tags": ["x"]}, {"id": null}]"#,
        )
        .unwrap();

        let ds = import(&path).unwrap();
        assert_eq!(ds.columns(), &["id", "name", "tags"]);
        assert_eq!(ds.row(0).unwrap(), &[Value::Number(1.0), Value::from("Alice"), Value::Null]);
        assert_eq!(ds.row(1).unwrap()[2], Value::from(r#"["x"]"#));
        assert_eq!(ds.row(2).unwrap(), &[Value::Null, Value::Null, Value::Null]);
    }

    #[test]
    fn rejects_non_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("obj.json");
        fs::write(&path, r#"{"id": 1}"#).unwrap();
        assert!(matches!(import(&path), Err(AcquisitionError::Parse { .. })));
    }
}
