use std::fmt;

use serde::{Deserialize, Serialize};

/// A single dynamically typed cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Value {
    /// Type a raw text cell (CSV, XML, fixed-width).
    ///
    /// Empty text is null, `true`/`false` in any case is a bool, a decimal or
    /// scientific literal is a number. Everything else stays a string, untrimmed.
    pub fn from_text(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        if looks_numeric(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return Value::Number(n);
                }
            }
        }
        Value::String(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
        }
    }
}

/// Only digits, one leading sign, `.` and an exponent. Rejects `inf`, `nan`, hex.
fn looks_numeric(s: &str) -> bool {
    let body = s.strip_prefix(&['-', '+'][..]).unwrap_or(s);
    let starts_ok = body
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_digit() || c == '.');
    starts_ok
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            // Integers without decimals
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Observed type of a value, or of a whole column once merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Mixed,
}

impl ValueKind {
    /// Nulls don't change a column's kind; two different non-null kinds make it mixed.
    pub fn merge(self, other: ValueKind) -> ValueKind {
        match (self, other) {
            (ValueKind::Null, k) | (k, ValueKind::Null) => k,
            (a, b) if a == b => a,
            _ => ValueKind::Mixed,
        }
    }

    pub fn of_column<'a>(values: impl IntoIterator<Item = &'a Value>) -> ValueKind {
        values
            .into_iter()
            .fold(ValueKind::Null, |acc, v| acc.merge(v.kind()))
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool => write!(f, "bool"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_inference() {
        assert_eq!(Value::from_text(""), Value::Null);
        assert_eq!(Value::from_text("   "), Value::Null);
        assert_eq!(Value::from_text("42"), Value::Number(42.0));
        assert_eq!(Value::from_text("-3.5"), Value::Number(-3.5));
        assert_eq!(Value::from_text("1e3"), Value::Number(1000.0));
        assert_eq!(Value::from_text(".5"), Value::Number(0.5));
        assert_eq!(Value::from_text("TRUE"), Value::Bool(true));
        assert_eq!(Value::from_text("false"), Value::Bool(false));
        assert_eq!(Value::from_text("abc"), Value::String("abc".into()));
        assert_eq!(Value::from_text("inf"), Value::String("inf".into()));
        assert_eq!(Value::from_text("NaN"), Value::String("NaN".into()));
        assert_eq!(Value::from_text("1-2"), Value::String("1-2".into()));
        assert_eq!(Value::from_text(" foo "), Value::String(" foo ".into()));
    }

    #[test]
    fn display_formats_integers_without_decimals() {
        assert_eq!(Value::Number(100.0).to_string(), "100");
        assert_eq!(Value::Number(100.5).to_string(), "100.5");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn kind_merge() {
        let col = [Value::Null, Value::Number(1.0), Value::Number(2.0)];
        assert_eq!(ValueKind::of_column(&col), ValueKind::Number);

        let col = [Value::Number(1.0), Value::String("x".into())];
        assert_eq!(ValueKind::of_column(&col), ValueKind::Mixed);

        let col = [Value::Null, Value::Null];
        assert_eq!(ValueKind::of_column(&col), ValueKind::Null);
    }
}
