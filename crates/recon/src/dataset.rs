use std::collections::HashSet;

use serde::Serialize;

use crate::error::ReconError;
use crate::value::Value;

/// An in-memory table: unique column names and rows in insertion order.
///
/// Every row holds exactly one value per column. Origin (file, database,
/// folder) is forgotten once the dataset is built.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new<I, S>(columns: I) -> Result<Self, ReconError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(ReconError::DuplicateColumn(col.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, ReconError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dataset = Self::new(columns)?;
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ReconError> {
        if row.len() != self.columns.len() {
            return Err(ReconError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All values of one column, top to bottom.
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Rename a column in place. `to` must not already exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<bool, ReconError> {
        if from == to {
            return Ok(self.has_column(from));
        }
        if self.has_column(to) {
            return Err(ReconError::DuplicateColumn(to.to_string()));
        }
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Append another dataset's rows below this one.
    ///
    /// The column set becomes the union in first-seen order; cells a side
    /// doesn't have are null.
    pub fn append(&mut self, other: Dataset) {
        for col in &other.columns {
            if !self.has_column(col) {
                self.columns.push(col.clone());
                for row in &mut self.rows {
                    row.push(Value::Null);
                }
            }
        }

        let positions: Vec<usize> = other
            .columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();

        for row in other.rows {
            let mut out = vec![Value::Null; self.columns.len()];
            for (value, &pos) in row.into_iter().zip(&positions) {
                out[pos] = value;
            }
            self.rows.push(out);
        }
    }
}
