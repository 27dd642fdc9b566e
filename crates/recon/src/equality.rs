use std::borrow::Cow;

use crate::config::ToleranceSpec;
use crate::value::Value;

/// Tolerance-aware equality for one cell pair. Never fails: incomparable
/// types are simply unequal.
pub fn values_equal(source: &Value, target: &Value, tolerance: &ToleranceSpec) -> bool {
    match (source, target) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(a), Value::Number(b)) => numbers_equal(*a, *b, tolerance),
        (Value::String(a), Value::String(b)) => strings_equal(a, b, tolerance.ignore_spaces),
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}

/// `|a - b| <= absolute + relative * |b|`, where `b` is the target value.
pub fn numbers_equal(a: f64, b: f64, tolerance: &ToleranceSpec) -> bool {
    if a == b {
        return true;
    }
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    (a - b).abs() <= tolerance.absolute + tolerance.relative * b.abs()
}

pub fn strings_equal(a: &str, b: &str, ignore_spaces: bool) -> bool {
    if ignore_spaces {
        normalize_whitespace(a) == normalize_whitespace(b)
    } else {
        a == b
    }
}

/// Trim and collapse every internal whitespace run to a single space.
pub fn normalize_whitespace(s: &str) -> Cow<'_, str> {
    let mut prev_space = true;
    let already_normal = s.chars().all(|c| {
        let ok = !(c.is_whitespace() && (prev_space || c != ' '));
        prev_space = c.is_whitespace();
        ok
    }) && !s.ends_with(char::is_whitespace);

    if already_normal {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}
