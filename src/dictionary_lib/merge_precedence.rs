//! Literal, non-fused merge of precedence-ordered dictionary slots.
//!
//! The production scanner (`OpenCC::convert_by_union`) never materializes a merged
//! map: it probes each round's slots in order, pruned by a unioned [`StarterUnion`]
//! (see [`crate::dictionary_lib::StarterUnion`]). That fused approach is algebraically
//! identical to scanning a single merged map, but the legacy scanner, the JSON/CBOR
//! serializer, and conformance tests need the literal map to exist as a value they
//! can inspect directly — this function builds it.

use super::dict_max_len::DictMaxLen;
use rustc_hash::FxHashMap;

/// Merges `slots` into a single `key -> value` map, earliest slot in the slice wins
/// on key collision.
///
/// Iterates slots in order; for each `(k, v)`, inserts only if `k` is not yet
/// present. The resulting key count is at most the sum of the slots' key counts,
/// with equality iff no slot shares a key with an earlier slot. Deterministic for
/// a given, stably-ordered `slots` slice.
pub fn merge_precedence(slots: &[&DictMaxLen]) -> FxHashMap<Box<[char]>, Box<str>> {
    let mut merged: FxHashMap<Box<[char]>, Box<str>> = FxHashMap::default();
    for slot in slots {
        for (k, v) in &slot.map {
            merged.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(pairs: &[(&str, &str)]) -> DictMaxLen {
        DictMaxLen::build_from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn earlier_slot_wins_on_collision() {
        let a = dict(&[("汉", "漢A")]);
        let b = dict(&[("汉", "漢B"), ("字", "字")]);

        let merged = merge_precedence(&[&a, &b]);

        let key: Box<[char]> = "汉".chars().collect();
        assert_eq!(&*merged[&key], "漢A");
        let key2: Box<[char]> = "字".chars().collect();
        assert_eq!(&*merged[&key2], "字");
    }

    #[test]
    fn key_count_is_union_minus_collisions() {
        let a = dict(&[("汉", "漢"), ("字", "字")]);
        let b = dict(&[("字", "DUPLICATE"), ("转", "轉")]);

        let merged = merge_precedence(&[&a, &b]);

        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn empty_slots_yield_empty_map() {
        let merged = merge_precedence(&[]);
        assert!(merged.is_empty());
    }
}
