// Property-based tests for the comparison engine.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use tabrecon_recon::{compare, detect_duplicates, Dataset, JoinKey, ToleranceSpec, Value};

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Mostly numbers, sometimes text, sometimes null.
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => (-1000i64..1000).prop_map(Value::from),
        1 => "[a-z ]{0,8}".prop_map(Value::from),
        1 => Just(Value::Null),
    ]
}

fn arb_rows(keys: std::ops::Range<i64>, max: usize) -> impl Strategy<Value = Vec<Vec<Value>>> {
    prop::collection::vec(
        (keys, arb_value(), arb_value()).prop_map(|(k, a, b)| vec![Value::from(k), a, b]),
        0..max,
    )
}

fn table(rows: Vec<Vec<Value>>) -> Dataset {
    Dataset::from_rows(["k", "a", "b"], rows).unwrap()
}

fn key() -> JoinKey {
    JoinKey::new(["k"])
}

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn disjoint_keys_never_match(
        left in arb_rows(0..50, 30),
        right in arb_rows(100..150, 30),
    ) {
        let (l, r) = (table(left), table(right));
        let result = compare(&l, &r, &key(), &ToleranceSpec::exact()).unwrap();
        prop_assert!(result.matched_rows.is_empty());
        prop_assert_eq!(result.source_only_rows.len(), l.row_count());
        prop_assert_eq!(result.target_only_rows.len(), r.row_count());
    }

    #[test]
    fn identical_unique_datasets_fully_match(rows in arb_rows(0..1000, 40)) {
        // Deduplicate keys so every row pairs with exactly itself
        let mut seen = std::collections::HashSet::new();
        let rows: Vec<_> = rows
            .into_iter()
            .filter(|r| seen.insert(r[0].as_f64().map(|f| f as i64)))
            .collect();
        let ds = table(rows);
        let result = compare(&ds, &ds, &key(), &ToleranceSpec::exact()).unwrap();
        prop_assert_eq!(result.matched_rows.len(), ds.row_count());
        prop_assert_eq!(result.mismatched_count(), 0);
        prop_assert!(result.column_stats.iter().all(|s| s.all_match));
    }

    #[test]
    fn compare_is_idempotent(
        left in arb_rows(0..10, 20),
        right in arb_rows(5..15, 20),
        abs in prop_oneof![Just(0.0), 0.0..50.0f64],
        ignore_spaces in any::<bool>(),
    ) {
        let (l, r) = (table(left), table(right));
        let tol = ToleranceSpec::exact().with_absolute(abs).with_ignore_spaces(ignore_spaces);
        let first = compare(&l, &r, &key(), &tol).unwrap();
        let second = compare(&l, &r, &key(), &tol).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn rows_are_partitioned(
        left in arb_rows(0..10, 25),
        right in arb_rows(5..15, 25),
    ) {
        let (l, r) = (table(left), table(right));
        let result = compare(&l, &r, &key(), &ToleranceSpec::exact()).unwrap();

        let mut src_seen = vec![false; l.row_count()];
        for m in &result.matched_rows {
            src_seen[m.source_index] = true;
        }
        for u in &result.source_only_rows {
            prop_assert!(!src_seen[u.index], "source row {} both matched and unmatched", u.index);
            src_seen[u.index] = true;
        }
        prop_assert!(src_seen.iter().all(|s| *s));

        let mut tgt_seen = vec![false; r.row_count()];
        for m in &result.matched_rows {
            tgt_seen[m.target_index] = true;
        }
        for u in &result.target_only_rows {
            prop_assert!(!tgt_seen[u.index], "target row {} both matched and unmatched", u.index);
            tgt_seen[u.index] = true;
        }
        prop_assert!(tgt_seen.iter().all(|s| *s));

        // Every mismatched row is a matched row
        prop_assert!(result.mismatched_count() <= result.matched_rows.len());

        // Duplicate rows never exceed the side's row count
        let dups = detect_duplicates(&result);
        prop_assert!(dups.source.rows <= l.row_count());
        prop_assert!(dups.target.rows <= r.row_count());
    }
}
