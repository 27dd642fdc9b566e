use crate::dataset::Dataset;
use crate::model::{ColumnStat, MatchedRow};
use crate::value::{Value, ValueKind};

/// One `ColumnStat` per compare column, computed over the matched pairs.
///
/// `cells[i]` of every matched row belongs to `columns[i]`.
pub fn column_stats(
    columns: &[String],
    matched: &[MatchedRow],
    source: &Dataset,
    target: &Dataset,
) -> Vec<ColumnStat> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let mut equal = 0;
            let mut unequal = 0;
            let mut null_diff = 0;
            let mut max_diff: Option<f64> = None;

            for row in matched {
                let cell = &row.cells[i];
                if cell.equal {
                    equal += 1;
                } else {
                    unequal += 1;
                }
                match (&cell.source, &cell.target) {
                    (Value::Number(a), Value::Number(b)) if a.is_finite() && b.is_finite() => {
                        let d = (a - b).abs();
                        max_diff = Some(max_diff.map_or(d, |m| m.max(d)));
                    }
                    (Value::Null, Value::Null) => {}
                    (Value::Null, _) | (_, Value::Null) => null_diff += 1,
                    _ => {}
                }
            }

            ColumnStat {
                column: column.clone(),
                matched: matched.len(),
                equal,
                unequal,
                all_match: unequal == 0,
                max_diff,
                null_diff,
                source_kind: column_kind(source, column),
                target_kind: column_kind(target, column),
            }
        })
        .collect()
}

fn column_kind(dataset: &Dataset, column: &str) -> ValueKind {
    dataset
        .column_values(column)
        .map_or(ValueKind::Null, ValueKind::of_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellPair, KeyTuple};

    fn pair(source: Value, target: Value, equal: bool) -> MatchedRow {
        MatchedRow {
            key: KeyTuple(vec![Value::Number(1.0)]),
            source_index: 0,
            target_index: 0,
            cells: vec![CellPair { source, target, equal }],
        }
    }

    #[test]
    fn counts_and_diffs() {
        let src = Dataset::from_rows(["amt"], vec![vec![Value::Number(1.0)]]).unwrap();
        let tgt = Dataset::from_rows(["amt"], vec![vec![Value::from("x")]]).unwrap();
        let matched = vec![
            pair(Value::Number(10.0), Value::Number(10.0), true),
            pair(Value::Number(10.0), Value::Number(12.5), false),
            pair(Value::Null, Value::Number(3.0), false),
            pair(Value::Null, Value::Null, true),
        ];
        let stats = column_stats(&["amt".to_string()], &matched, &src, &tgt);
        let s = &stats[0];
        assert_eq!(s.matched, 4);
        assert_eq!(s.equal, 2);
        assert_eq!(s.unequal, 2);
        assert!(!s.all_match);
        assert_eq!(s.max_diff, Some(2.5));
        assert_eq!(s.null_diff, 1);
        assert_eq!(s.source_kind, ValueKind::Number);
        assert_eq!(s.target_kind, ValueKind::String);
    }

    #[test]
    fn no_matches_is_vacuously_all_match() {
        let ds = Dataset::new(["a"]).unwrap();
        let stats = column_stats(&["a".to_string()], &[], &ds, &ds);
        assert!(stats[0].all_match);
        assert_eq!(stats[0].max_diff, None);
        assert_eq!(stats[0].source_kind, ValueKind::Null);
    }
}
