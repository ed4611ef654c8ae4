//! Per-language translation maps of one topic, with change tracking.
//!
//! # Invariants
//! - Maps are `BTreeMap`s, so encoded blobs are always key-sorted.
//! - A language is dirty only if its map is loaded.

use crate::model::language::LanguageId;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Key → value strings for one language.
pub type TranslationMap = BTreeMap<String, String>;

/// Lazily populated translation maps keyed by language id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationSet {
    maps: BTreeMap<LanguageId, TranslationMap>,
    dirty: BTreeSet<LanguageId>,
}

impl TranslationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the map for `lang_id` has been loaded (or created) already.
    pub fn is_loaded(&self, lang_id: LanguageId) -> bool {
        self.maps.contains_key(&lang_id)
    }

    /// Stores a freshly loaded map without marking it dirty.
    pub fn insert_loaded(&mut self, lang_id: LanguageId, map: TranslationMap) {
        self.maps.insert(lang_id, map);
    }

    pub fn map(&self, lang_id: LanguageId) -> Option<&TranslationMap> {
        self.maps.get(&lang_id)
    }

    pub fn get(&self, lang_id: LanguageId, key: &str) -> Option<&str> {
        self.maps
            .get(&lang_id)
            .and_then(|map| map.get(key))
            .map(String::as_str)
    }

    pub fn contains_key(&self, lang_id: LanguageId, key: &str) -> bool {
        self.maps
            .get(&lang_id)
            .is_some_and(|map| map.contains_key(key))
    }

    /// Sets one value and marks the language dirty.
    ///
    /// Returns `true` when the key did not exist for that language before.
    pub fn set(&mut self, lang_id: LanguageId, key: &str, value: String) -> bool {
        let previous = self
            .maps
            .entry(lang_id)
            .or_default()
            .insert(key.to_string(), value);
        self.dirty.insert(lang_id);
        previous.is_none()
    }

    /// Adds `key` with an empty value when missing, marking the language dirty.
    ///
    /// Existing values are never overwritten.
    pub fn fill_missing(&mut self, lang_id: LanguageId, key: &str) -> bool {
        let map = self.maps.entry(lang_id).or_default();
        if map.contains_key(key) {
            return false;
        }
        map.insert(key.to_string(), String::new());
        self.dirty.insert(lang_id);
        true
    }

    /// Removes `key` from one loaded map. Does not touch dirty state.
    pub fn remove(&mut self, lang_id: LanguageId, key: &str) -> bool {
        self.maps
            .get_mut(&lang_id)
            .is_some_and(|map| map.remove(key).is_some())
    }

    pub fn mark_dirty(&mut self, lang_id: LanguageId) {
        if self.maps.contains_key(&lang_id) {
            self.dirty.insert(lang_id);
        }
    }

    pub fn is_dirty(&self, lang_id: LanguageId) -> bool {
        self.dirty.contains(&lang_id)
    }

    /// Dirty language ids in ascending order.
    pub fn dirty_languages(&self) -> Vec<LanguageId> {
        self.dirty.iter().copied().collect()
    }

    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn clear_changes(&mut self) {
        self.dirty.clear();
    }
}

/// Encodes one map as a JSON object with lexicographically sorted keys.
pub fn encode_translations(map: &TranslationMap) -> Result<String, serde_json::Error> {
    serde_json::to_string(map)
}

// Older writers emitted a JSON list whenever the keys happened to be `0..n`.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredBlob {
    Map(TranslationMap),
    List(Vec<String>),
}

/// Decodes a stored blob. `NULL` and blank blobs are empty maps.
///
/// A JSON list decodes as index → value pairs, so `[]` is an empty map and
/// `["zero"]` is `{"0": "zero"}`.
pub fn decode_translations(blob: Option<&str>) -> Result<TranslationMap, serde_json::Error> {
    let text = match blob.map(str::trim) {
        None | Some("") => return Ok(TranslationMap::new()),
        Some(text) => text,
    };
    Ok(match serde_json::from_str(text)? {
        StoredBlob::Map(map) => map,
        StoredBlob::List(values) => values
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_translations, encode_translations, TranslationMap, TranslationSet};

    #[test]
    fn encode_sorts_keys() {
        let mut map = TranslationMap::new();
        map.insert("zeta".to_string(), "z".to_string());
        map.insert("alpha".to_string(), "a".to_string());
        map.insert("Beta".to_string(), "b".to_string());

        let encoded = encode_translations(&map).unwrap();
        assert_eq!(encoded, r#"{"Beta":"b","alpha":"a","zeta":"z"}"#);
    }

    #[test]
    fn decode_treats_absent_and_legacy_empty_blobs_as_empty() {
        assert!(decode_translations(None).unwrap().is_empty());
        assert!(decode_translations(Some("")).unwrap().is_empty());
        assert!(decode_translations(Some("  ")).unwrap().is_empty());
        assert!(decode_translations(Some("[]")).unwrap().is_empty());
        assert!(decode_translations(Some("{}")).unwrap().is_empty());
    }

    #[test]
    fn decode_reads_list_blob_as_indexed_keys() {
        let map = decode_translations(Some(r#"["zero", "one"]"#)).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("0").map(String::as_str), Some("zero"));
        assert_eq!(map.get("1").map(String::as_str), Some("one"));
    }

    #[test]
    fn decode_rejects_non_object_blob() {
        assert!(decode_translations(Some("\"oops\"")).is_err());
    }

    #[test]
    fn set_reports_new_keys_and_marks_dirty() {
        let mut set = TranslationSet::new();
        set.insert_loaded(1, TranslationMap::new());
        assert!(!set.has_changes());

        assert!(set.set(1, "greeting", "hi".to_string()));
        assert!(!set.set(1, "greeting", "hello".to_string()));
        assert_eq!(set.get(1, "greeting"), Some("hello"));
        assert_eq!(set.dirty_languages(), vec![1]);
    }

    #[test]
    fn fill_missing_keeps_existing_values() {
        let mut set = TranslationSet::new();
        let mut loaded = TranslationMap::new();
        loaded.insert("greeting".to_string(), "hallo".to_string());
        set.insert_loaded(2, loaded);

        assert!(!set.fill_missing(2, "greeting"));
        assert!(!set.is_dirty(2));
        assert_eq!(set.get(2, "greeting"), Some("hallo"));

        assert!(set.fill_missing(2, "farewell"));
        assert!(set.is_dirty(2));
        assert_eq!(set.get(2, "farewell"), Some(""));
    }

    #[test]
    fn remove_does_not_mark_dirty() {
        let mut set = TranslationSet::new();
        set.insert_loaded(1, TranslationMap::new());
        set.set(1, "greeting", "hi".to_string());
        set.clear_changes();

        assert!(set.remove(1, "greeting"));
        assert!(!set.remove(1, "greeting"));
        assert!(!set.has_changes());
    }
}
