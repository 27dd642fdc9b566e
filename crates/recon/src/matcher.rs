use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::dataset::Dataset;
use crate::equality::normalize_whitespace;
use crate::model::KeyTuple;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Hashable key form
// ---------------------------------------------------------------------------

/// Hashable mirror of `Value` for bucketing. Null equals null, numbers compare
/// exactly, different types never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum KeyPart {
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct BucketKey(Vec<KeyPart>);

impl KeyPart {
    fn from_value(value: &Value, ignore_spaces: bool) -> Self {
        match value {
            Value::Null => KeyPart::Null,
            Value::Bool(b) => KeyPart::Bool(*b),
            // -0.0 and 0.0 land in one bucket
            Value::Number(n) if *n == 0.0 => KeyPart::Number(OrderedFloat(0.0)),
            Value::Number(n) => KeyPart::Number(OrderedFloat(*n)),
            Value::String(s) if ignore_spaces => KeyPart::String(normalize_whitespace(s).into_owned()),
            Value::String(s) => KeyPart::String(s.clone()),
        }
    }
}

pub(crate) fn bucket_key(key: &KeyTuple, ignore_spaces: bool) -> BucketKey {
    BucketKey(
        key.0
            .iter()
            .map(|v| KeyPart::from_value(v, ignore_spaces))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// All rows sharing one key tuple, in row order.
#[derive(Debug)]
pub(crate) struct Bucket {
    pub key: KeyTuple,
    pub rows: Vec<usize>,
}

/// Key tuple -> row indices, buckets kept in order of first appearance.
#[derive(Debug, Default)]
pub(crate) struct KeyBuckets {
    index: HashMap<BucketKey, usize>,
    buckets: Vec<Bucket>,
}

impl KeyBuckets {
    pub fn build(dataset: &Dataset, key_columns: &[usize], ignore_spaces: bool) -> Self {
        let mut out = KeyBuckets::default();
        for (row_idx, row) in dataset.rows().iter().enumerate() {
            let key = KeyTuple(key_columns.iter().map(|&c| row[c].clone()).collect());
            out.insert(key, row_idx, ignore_spaces);
        }
        out
    }

    pub fn insert(&mut self, key: KeyTuple, row: usize, ignore_spaces: bool) {
        let bk = bucket_key(&key, ignore_spaces);
        match self.index.get(&bk) {
            Some(&b) => self.buckets[b].rows.push(row),
            None => {
                self.index.insert(bk, self.buckets.len());
                self.buckets.push(Bucket { key, rows: vec![row] });
            }
        }
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    fn get(&self, key: &KeyTuple, ignore_spaces: bool) -> Option<&Bucket> {
        self.index
            .get(&bucket_key(key, ignore_spaces))
            .map(|&b| &self.buckets[b])
    }
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JoinedPair {
    pub key: KeyTuple,
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Default)]
pub(crate) struct JoinOutput {
    pub matched: Vec<JoinedPair>,
    pub source_only: Vec<(KeyTuple, usize)>,
    pub target_only: Vec<(KeyTuple, usize)>,
}

/// Pair up two bucket sets.
///
/// A key on both sides emits every source x target combination (source-major),
/// which is how duplicated keys surface downstream. Matched and source-only
/// output follows source first appearance; target-only follows target first
/// appearance.
pub(crate) fn join_buckets(source: &KeyBuckets, target: &KeyBuckets, ignore_spaces: bool) -> JoinOutput {
    let mut out = JoinOutput::default();

    for bucket in source.buckets() {
        match target.get(&bucket.key, ignore_spaces) {
            Some(other) => {
                for &s in &bucket.rows {
                    for &t in &other.rows {
                        out.matched.push(JoinedPair {
                            key: bucket.key.clone(),
                            source: s,
                            target: t,
                        });
                    }
                }
            }
            None => {
                for &s in &bucket.rows {
                    out.source_only.push((bucket.key.clone(), s));
                }
            }
        }
    }

    for bucket in target.buckets() {
        if source.get(&bucket.key, ignore_spaces).is_none() {
            for &t in &bucket.rows {
                out.target_only.push((bucket.key.clone(), t));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(keys: &[&str]) -> Dataset {
        Dataset::from_rows(
            ["k"],
            keys.iter().map(|k| vec![Value::from_text(k)]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn buckets_keep_first_appearance_order() {
        let buckets = KeyBuckets::build(&ds(&["b", "a", "b", "c"]), &[0], false);
        let keys: Vec<String> = buckets.buckets().iter().map(|b| b.key.to_string()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(buckets.buckets()[0].rows, vec![0, 2]);
    }

    #[test]
    fn join_cartesian_within_key() {
        let src = KeyBuckets::build(&ds(&["1", "1", "2"]), &[0], false);
        let tgt = KeyBuckets::build(&ds(&["3", "1", "1"]), &[0], false);
        let out = join_buckets(&src, &tgt, false);

        let pairs: Vec<(usize, usize)> = out.matched.iter().map(|p| (p.source, p.target)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 1), (1, 2)]);
        assert_eq!(out.source_only.len(), 1);
        assert_eq!(out.source_only[0].1, 2);
        assert_eq!(out.target_only.len(), 1);
        assert_eq!(out.target_only[0].1, 0);
    }

    #[test]
    fn null_keys_match_each_other() {
        let src = KeyBuckets::build(&ds(&[""]), &[0], false);
        let tgt = KeyBuckets::build(&ds(&[""]), &[0], false);
        let out = join_buckets(&src, &tgt, false);
        assert_eq!(out.matched.len(), 1);
    }

    #[test]
    fn key_types_never_cross() {
        let src = Dataset::from_rows(["k"], vec![vec![Value::Number(1.0)]]).unwrap();
        let tgt = Dataset::from_rows(["k"], vec![vec![Value::from("1")]]).unwrap();
        let out = join_buckets(
            &KeyBuckets::build(&src, &[0], false),
            &KeyBuckets::build(&tgt, &[0], false),
            false,
        );
        assert!(out.matched.is_empty());
        assert_eq!(out.source_only.len(), 1);
        assert_eq!(out.target_only.len(), 1);
    }

    #[test]
    fn ignore_spaces_applies_to_string_keys() {
        let src = Dataset::from_rows(["k"], vec![vec![Value::from(" A  1 ")]]).unwrap();
        let tgt = Dataset::from_rows(["k"], vec![vec![Value::from("A 1")]]).unwrap();
        let strict = join_buckets(
            &KeyBuckets::build(&src, &[0], false),
            &KeyBuckets::build(&tgt, &[0], false),
            false,
        );
        assert!(strict.matched.is_empty());

        let loose = join_buckets(
            &KeyBuckets::build(&src, &[0], true),
            &KeyBuckets::build(&tgt, &[0], true),
            true,
        );
        assert_eq!(loose.matched.len(), 1);
    }

    #[test]
    fn negative_zero_key() {
        let a = bucket_key(&KeyTuple(vec![Value::Number(-0.0)]), false);
        let b = bucket_key(&KeyTuple(vec![Value::Number(0.0)]), false);
        assert_eq!(a, b);
    }
}
