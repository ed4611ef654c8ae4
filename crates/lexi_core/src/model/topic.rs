//! Topic entity and its format rules.
//!
//! # Responsibility
//! - Hold topic metadata plus the lazily loaded translation maps.
//! - Track which metadata fields changed since the last save.
//!
//! # Invariants
//! - Identifiers and translation keys match `^[A-Za-z0-9_-]+$`.
//! - Once a topic's identifier is `default`, it can never change.
//! - `id == 0` means the topic has not been inserted yet.

use crate::model::translation::TranslationSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of a topic row.
pub type TopicId = i64;

/// Id carried by topics that were never saved.
pub const UNSAVED_TOPIC_ID: TopicId = 0;

/// Identifier of the topic every installation ships with.
pub const DEFAULT_TOPIC_IDENTIFIER: &str = "default";

static KEY_OR_IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid key/identifier regex"));

/// Checks a translation key or topic identifier. Spaces and dots are not allowed.
pub fn is_valid_key_or_identifier(value: &str) -> bool {
    KEY_OR_IDENTIFIER_RE.is_match(value)
}

/// Coarse category shared by topic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicErrorKind {
    NotFound,
    InvalidArgument,
    IllegalState,
    Storage,
}

/// Rejected in-memory edit of a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicValidationError {
    InvalidIdentifier(String),
    InvalidKey(String),
    /// The `default` topic keeps its identifier forever.
    DefaultIdentifierFrozen,
}

impl TopicValidationError {
    pub fn kind(&self) -> TopicErrorKind {
        match self {
            Self::InvalidIdentifier(_) | Self::InvalidKey(_) => TopicErrorKind::InvalidArgument,
            Self::DefaultIdentifierFrozen => TopicErrorKind::IllegalState,
        }
    }
}

impl Display for TopicValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(value) => write!(f, "identifier `{value}` is not valid"),
            Self::InvalidKey(value) => write!(f, "key `{value}` is not valid"),
            Self::DefaultIdentifierFrozen => {
                write!(f, "identifier of the `{DEFAULT_TOPIC_IDENTIFIER}` topic can't be changed")
            }
        }
    }
}

impl Error for TopicValidationError {}

/// Persisted topic row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: TopicId,
    pub identifier: String,
    pub title: String,
    pub description: String,
}

/// Metadata fields edited since the last save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicChanges {
    pub title: bool,
    pub description: bool,
    pub identifier: bool,
}

impl TopicChanges {
    pub fn any(&self) -> bool {
        self.title || self.description || self.identifier
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A topic with its metadata, change flags and cached translations.
///
/// Loading and saving go through `TopicService`; this type only performs
/// in-memory edits.
#[derive(Debug, Clone, Default)]
pub struct Topic {
    id: TopicId,
    identifier: String,
    title: String,
    description: String,
    changes: TopicChanges,
    translations: TranslationSet,
}

impl Topic {
    /// Creates an empty, unsaved topic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a clean topic from a stored row. No translations are loaded.
    pub fn from_record(record: TopicRecord) -> Self {
        Self {
            id: record.id,
            identifier: record.identifier,
            title: record.title,
            description: record.description,
            changes: TopicChanges::default(),
            translations: TranslationSet::new(),
        }
    }

    pub fn id(&self) -> TopicId {
        self.id
    }

    pub fn is_new(&self) -> bool {
        self.id == UNSAVED_TOPIC_ID
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_default(&self) -> bool {
        self.identifier == DEFAULT_TOPIC_IDENTIFIER
    }

    /// Sets the identifier.
    ///
    /// # Errors
    /// - `DefaultIdentifierFrozen` when this topic is the `default` topic,
    ///   whatever the candidate value is.
    /// - `InvalidIdentifier` when `identifier` fails the key/identifier format.
    pub fn set_identifier(
        &mut self,
        identifier: impl Into<String>,
    ) -> Result<(), TopicValidationError> {
        if self.is_default() {
            return Err(TopicValidationError::DefaultIdentifierFrozen);
        }
        let identifier = identifier.into();
        if !is_valid_key_or_identifier(&identifier) {
            return Err(TopicValidationError::InvalidIdentifier(identifier));
        }
        self.identifier = identifier;
        self.changes.identifier = true;
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.changes.title = true;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.changes.description = true;
    }

    pub fn changes(&self) -> TopicChanges {
        self.changes
    }

    /// Whether metadata or any language map has unsaved edits.
    pub fn has_changes(&self) -> bool {
        self.changes.any() || self.translations.has_changes()
    }

    pub fn translations(&self) -> &TranslationSet {
        &self.translations
    }

    /// Snapshot of the metadata as it would be written.
    pub fn record(&self) -> TopicRecord {
        TopicRecord {
            id: self.id,
            identifier: self.identifier.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }

    pub(crate) fn translations_mut(&mut self) -> &mut TranslationSet {
        &mut self.translations
    }

    pub(crate) fn assign_id(&mut self, id: TopicId) {
        self.id = id;
    }

    pub(crate) fn clear_metadata_changes(&mut self) {
        self.changes.clear();
    }

    pub(crate) fn clear_all_changes(&mut self) {
        self.changes.clear();
        self.translations.clear_changes();
    }

    /// Back to the unsaved empty state. Cached translations stay untouched.
    pub(crate) fn reset_after_delete(&mut self) {
        self.id = UNSAVED_TOPIC_ID;
        self.identifier.clear();
        self.title.clear();
        self.description.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{
        is_valid_key_or_identifier, Topic, TopicErrorKind, TopicRecord, TopicValidationError,
        DEFAULT_TOPIC_IDENTIFIER,
    };
    use proptest::prelude::*;

    fn stored(identifier: &str) -> Topic {
        Topic::from_record(TopicRecord {
            id: 4,
            identifier: identifier.to_string(),
            title: "Title".to_string(),
            description: String::new(),
        })
    }

    #[test]
    fn validity_accepts_letters_digits_dash_underscore() {
        assert!(is_valid_key_or_identifier("greeting"));
        assert!(is_valid_key_or_identifier("Nav_Bar-2"));
        assert!(is_valid_key_or_identifier("_"));
    }

    #[test]
    fn validity_rejects_empty_space_dot_and_unicode() {
        for value in ["", "a b", "menu.title", "ümlaut", "tab\t", "line\n", "x/y"] {
            assert!(!is_valid_key_or_identifier(value), "{value:?} should be rejected");
        }
    }

    #[test]
    fn new_topic_is_unsaved_and_clean() {
        let topic = Topic::new();
        assert!(topic.is_new());
        assert!(!topic.has_changes());
        assert_eq!(topic.identifier(), "");
    }

    #[test]
    fn setters_mark_only_their_field() {
        let mut topic = stored("docs");
        topic.set_title("Docs");
        let changes = topic.changes();
        assert!(changes.title);
        assert!(!changes.description);
        assert!(!changes.identifier);

        topic.set_description("All documentation strings");
        assert!(topic.changes().description);
    }

    #[test]
    fn set_identifier_rejects_invalid_value() {
        let mut topic = Topic::new();
        let err = topic.set_identifier("has space").unwrap_err();
        assert_eq!(err, TopicValidationError::InvalidIdentifier("has space".to_string()));
        assert_eq!(err.kind(), TopicErrorKind::InvalidArgument);
        assert!(!topic.changes().identifier);
    }

    #[test]
    fn default_identifier_is_frozen_once_set() {
        let mut topic = Topic::new();
        topic.set_identifier(DEFAULT_TOPIC_IDENTIFIER).unwrap();

        let err = topic.set_identifier("other").unwrap_err();
        assert_eq!(err, TopicValidationError::DefaultIdentifierFrozen);
        assert_eq!(err.kind(), TopicErrorKind::IllegalState);
        assert_eq!(topic.identifier(), DEFAULT_TOPIC_IDENTIFIER);
    }

    #[test]
    fn reset_after_delete_keeps_translation_cache() {
        let mut topic = stored("docs");
        topic
            .translations_mut()
            .set(1, "greeting", "hi".to_string());
        topic.reset_after_delete();

        assert!(topic.is_new());
        assert_eq!(topic.title(), "");
        assert_eq!(topic.translations().get(1, "greeting"), Some("hi"));
    }

    proptest! {
        #[test]
        fn prop_allowed_alphabet_is_valid(value in "[A-Za-z0-9_-]{1,40}") {
            prop_assert!(is_valid_key_or_identifier(&value));
        }

        #[test]
        fn prop_any_foreign_char_is_invalid(
            prefix in "[A-Za-z0-9_-]{0,10}",
            bad in prop::sample::select(vec![
                ' ', '.', ',', ':', ';', '/', '\\', '!', '?', '@', '#', '+', '=', '*', '\'',
                '"', '<', '>', '|', '~', '(', ')', '[', ']', '{', '}', '\t', '\n', 'é', 'ß',
            ]),
            suffix in "[A-Za-z0-9_-]{0,10}",
        ) {
            let value = format!("{prefix}{bad}{suffix}");
            prop_assert!(!is_valid_key_or_identifier(&value));
        }

        #[test]
        fn prop_default_identifier_never_changes(candidate in "\\PC{0,20}") {
            let mut topic = stored(DEFAULT_TOPIC_IDENTIFIER);
            let err = topic.set_identifier(candidate).unwrap_err();
            prop_assert_eq!(err, TopicValidationError::DefaultIdentifierFrozen);
            prop_assert_eq!(topic.identifier(), DEFAULT_TOPIC_IDENTIFIER);
        }
    }
}
