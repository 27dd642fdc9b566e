use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Join key
// ---------------------------------------------------------------------------

/// Ordered column names used to correlate source and target rows.
///
/// Uniqueness of the key *values* is not required; duplicated key tuples are
/// reported, not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinKey(Vec<String>);

impl JoinKey {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(columns.into_iter().map(Into::into).collect())
    }

    /// Parse a comma-separated list, trimming each name and dropping empties.
    pub fn parse_list(input: &str) -> Self {
        Self::new(input.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|c| c == column)
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

/// Per-run comparison policy.
///
/// Two numbers are equal when `|a - b| <= absolute + relative * |b|`, with `b`
/// the target value. `ignore_spaces` trims strings and collapses internal
/// whitespace runs before comparing; it applies to string key parts as well.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ToleranceSpec {
    #[serde(default)]
    pub absolute: f64,
    #[serde(default)]
    pub relative: f64,
    #[serde(default)]
    pub ignore_spaces: bool,
}

impl ToleranceSpec {
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn with_absolute(mut self, absolute: f64) -> Self {
        self.absolute = absolute;
        self
    }

    pub fn with_relative(mut self, relative: f64) -> Self {
        self.relative = relative;
        self
    }

    pub fn with_ignore_spaces(mut self, ignore_spaces: bool) -> Self {
        self.ignore_spaces = ignore_spaces;
        self
    }

    /// Negative or non-finite tolerances make no sense; `None` when valid.
    pub fn invalid_reason(&self) -> Option<String> {
        for (name, v) in [("absolute", self.absolute), ("relative", self.relative)] {
            if !v.is_finite() || v < 0.0 {
                return Some(format!("{name} tolerance must be a non-negative number, got {v}"));
            }
        }
        None
    }
}
