//! JSON import/export for [`DictionaryMaxlength`].
//!
//! `DictMaxLen`'s internal `map` is keyed by `Box<[char]>`, which `serde_json` cannot
//! represent directly as a JSON object key. This module instead serializes each of the
//! sixteen slots as an ordered array of `[key, value]` pairs, sorted by `(char length,
//! key)` so that output is deterministic across runs and independent of hashmap iteration
//! order.

use crate::dictionary_lib::dict_max_len::DictMaxLen;
use crate::dictionary_lib::dictionary_maxlength::{DictionaryError, DictionaryMaxlength};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk JSON shape: sixteen named slots, each a length-and-key-sorted pair list.
///
/// Every field carries `#[serde(default)]` so a bundle written by an older version that
/// doesn't yet know about a given slot (or one hand-trimmed to only the slots it needs)
/// still loads, with the missing slot defaulting to an empty dictionary rather than a
/// hard deserialization error.
#[derive(Serialize, Deserialize)]
struct DictionaryJson {
    #[serde(default)]
    st_characters: Vec<(String, String)>,
    #[serde(default)]
    st_phrases: Vec<(String, String)>,
    #[serde(default)]
    ts_characters: Vec<(String, String)>,
    #[serde(default)]
    ts_phrases: Vec<(String, String)>,
    #[serde(default)]
    tw_phrases: Vec<(String, String)>,
    #[serde(default)]
    tw_phrases_rev: Vec<(String, String)>,
    #[serde(default)]
    tw_variants: Vec<(String, String)>,
    #[serde(default)]
    tw_variants_rev: Vec<(String, String)>,
    #[serde(default)]
    tw_variants_rev_phrases: Vec<(String, String)>,
    #[serde(default)]
    hk_variants: Vec<(String, String)>,
    #[serde(default)]
    hk_variants_rev: Vec<(String, String)>,
    #[serde(default)]
    hk_variants_rev_phrases: Vec<(String, String)>,
    #[serde(default)]
    jps_characters: Vec<(String, String)>,
    #[serde(default)]
    jps_phrases: Vec<(String, String)>,
    #[serde(default)]
    jp_variants: Vec<(String, String)>,
    #[serde(default)]
    jp_variants_rev: Vec<(String, String)>,
}

fn pairs_from(dict: &DictMaxLen) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = dict
        .map
        .iter()
        .map(|(k, v)| (k.iter().collect::<String>(), v.to_string()))
        .collect();
    pairs.sort_by(|(a, _), (b, _)| a.chars().count().cmp(&b.chars().count()).then_with(|| a.cmp(b)));
    pairs
}

impl From<&DictionaryMaxlength> for DictionaryJson {
    fn from(d: &DictionaryMaxlength) -> Self {
        DictionaryJson {
            st_characters: pairs_from(&d.st_characters),
            st_phrases: pairs_from(&d.st_phrases),
            ts_characters: pairs_from(&d.ts_characters),
            ts_phrases: pairs_from(&d.ts_phrases),
            tw_phrases: pairs_from(&d.tw_phrases),
            tw_phrases_rev: pairs_from(&d.tw_phrases_rev),
            tw_variants: pairs_from(&d.tw_variants),
            tw_variants_rev: pairs_from(&d.tw_variants_rev),
            tw_variants_rev_phrases: pairs_from(&d.tw_variants_rev_phrases),
            hk_variants: pairs_from(&d.hk_variants),
            hk_variants_rev: pairs_from(&d.hk_variants_rev),
            hk_variants_rev_phrases: pairs_from(&d.hk_variants_rev_phrases),
            jps_characters: pairs_from(&d.jps_characters),
            jps_phrases: pairs_from(&d.jps_phrases),
            jp_variants: pairs_from(&d.jp_variants),
            jp_variants_rev: pairs_from(&d.jp_variants_rev),
        }
    }
}

impl DictionaryJson {
    fn into_dictionary(self) -> DictionaryMaxlength {
        let mut d = DictionaryMaxlength::default();
        d.st_characters = DictMaxLen::build_from_pairs(self.st_characters);
        d.st_phrases = DictMaxLen::build_from_pairs(self.st_phrases);
        d.ts_characters = DictMaxLen::build_from_pairs(self.ts_characters);
        d.ts_phrases = DictMaxLen::build_from_pairs(self.ts_phrases);
        d.tw_phrases = DictMaxLen::build_from_pairs(self.tw_phrases);
        d.tw_phrases_rev = DictMaxLen::build_from_pairs(self.tw_phrases_rev);
        d.tw_variants = DictMaxLen::build_from_pairs(self.tw_variants);
        d.tw_variants_rev = DictMaxLen::build_from_pairs(self.tw_variants_rev);
        d.tw_variants_rev_phrases = DictMaxLen::build_from_pairs(self.tw_variants_rev_phrases);
        d.hk_variants = DictMaxLen::build_from_pairs(self.hk_variants);
        d.hk_variants_rev = DictMaxLen::build_from_pairs(self.hk_variants_rev);
        d.hk_variants_rev_phrases = DictMaxLen::build_from_pairs(self.hk_variants_rev_phrases);
        d.jps_characters = DictMaxLen::build_from_pairs(self.jps_characters);
        d.jps_phrases = DictMaxLen::build_from_pairs(self.jps_phrases);
        d.jp_variants = DictMaxLen::build_from_pairs(self.jp_variants);
        d.jp_variants_rev = DictMaxLen::build_from_pairs(self.jp_variants_rev);
        d.finish()
    }
}

impl DictionaryMaxlength {
    /// Serializes the dictionary to a pretty-printed JSON string.
    ///
    /// Each slot is written as an ordered `[key, value]` array sorted by character
    /// length then lexical order, since `DictMaxLen`'s `Box<[char]>` keys can't be
    /// represented as JSON object keys directly.
    pub fn to_json_string(&self) -> Result<String, DictionaryError> {
        serde_json::to_string_pretty(&DictionaryJson::from(self)).map_err(|err| {
            let msg = format!("Failed to serialize to JSON: {}", err);
            Self::set_last_error(&msg);
            DictionaryError::ParseError(msg)
        })
    }

    /// Parses a dictionary previously produced by [`to_json_string`](Self::to_json_string).
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let parsed: DictionaryJson = serde_json::from_str(json).map_err(|err| {
            let msg = format!("Failed to deserialize JSON: {}", err);
            Self::set_last_error(&msg);
            DictionaryError::ParseError(msg)
        })?;
        Ok(parsed.into_dictionary())
    }

    /// Writes the dictionary to a JSON file at `path`.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), DictionaryError> {
        let json = self.to_json_string()?;
        fs::write(&path, json).map_err(|err| {
            let msg = format!("Failed to write JSON file: {}", err);
            Self::set_last_error(&msg);
            DictionaryError::IoError(msg)
        })
    }

    /// Loads a dictionary from a JSON file at `path`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let json = fs::read_to_string(&path).map_err(|err| {
            let msg = format!("Failed to read JSON file: {}", err);
            Self::set_last_error(&msg);
            DictionaryError::IoError(msg)
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DictionaryMaxlength {
        let mut d = DictionaryMaxlength::default();
        d.st_characters = DictMaxLen::build_from_pairs(vec![
            ("汉".to_string(), "漢".to_string()),
            ("字".to_string(), "字".to_string()),
        ]);
        d.st_phrases = DictMaxLen::build_from_pairs(vec![(
            "龙马精神".to_string(),
            "龍馬精神".to_string(),
        )]);
        d
    }

    #[test]
    fn roundtrip_preserves_populated_slots() {
        let original = sample();
        let json = original.to_json_string().unwrap();
        let restored = DictionaryMaxlength::from_json_str(&json).unwrap();

        assert_eq!(restored.st_characters.map.len(), 2);
        assert_eq!(restored.st_phrases.map.len(), 1);
        assert!(restored.tw_phrases.map.is_empty());
        assert!(restored.st_characters.is_populated());
    }

    #[test]
    fn pairs_are_sorted_by_length_then_lexically() {
        let dict = DictMaxLen::build_from_pairs(vec![
            ("乙".to_string(), "乙".to_string()),
            ("甲乙".to_string(), "甲乙".to_string()),
            ("甲".to_string(), "甲".to_string()),
        ]);
        let pairs = pairs_from(&dict);
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["乙", "甲", "甲乙"]);
    }

    #[test]
    fn save_and_load_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.json");
        let original = sample();
        original.save_json(&path).unwrap();
        let restored = DictionaryMaxlength::load_json(&path).unwrap();
        assert_eq!(restored.st_characters.map.len(), 2);
    }

    #[test]
    fn missing_slot_keys_default_to_empty_instead_of_erroring() {
        // An older or hand-trimmed bundle that only knows about one slot must still load,
        // with every absent slot defaulting to an empty dictionary rather than a hard
        // "missing field" deserialization error.
        let json = r#"{"st_characters": [["汉", "漢"]]}"#;
        let restored = DictionaryMaxlength::from_json_str(json).unwrap();

        assert_eq!(restored.st_characters.map.len(), 1);
        assert!(restored.st_phrases.map.is_empty());
        assert!(restored.tw_phrases.map.is_empty());
        assert!(restored.jp_variants_rev.map.is_empty());
    }

    #[test]
    fn empty_json_object_yields_a_fully_empty_dictionary() {
        let restored = DictionaryMaxlength::from_json_str("{}").unwrap();
        assert!(restored.st_characters.map.is_empty());
        assert!(restored.jp_variants_rev.map.is_empty());
    }
}
