//! Topic use-case service.
//!
//! # Responsibility
//! - Load topics by id or identifier and lazily load their translations.
//! - Keep translation keys complete across all known languages.
//! - Persist only what changed: dirty metadata and dirty languages.
//!
//! # Invariants
//! - A key set for one language exists (possibly empty) for every language.
//! - After a successful `save()` the topic carries no pending changes.
//! - The `default` topic can't be deleted.
//! - Translation values never reach the logs; only ids and counts do.

use crate::model::language::{LanguageDirectory, LanguageId};
use crate::model::topic::{
    is_valid_key_or_identifier, Topic, TopicErrorKind, TopicId, TopicRecord,
    TopicValidationError, DEFAULT_TOPIC_IDENTIFIER,
};
use crate::model::translation::TranslationMap;
use crate::repo::topic_repo::{RepoError, TopicRepository};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_TOPIC_TITLE: &str = "Default";

pub type TopicServiceResult<T> = Result<T, TopicServiceError>;

/// Service error for topic use-cases.
#[derive(Debug)]
pub enum TopicServiceError {
    /// No topic row matches `column = value`.
    TopicNotFound {
        column: &'static str,
        value: String,
    },
    LanguageNotFound(LanguageId),
    Validation(TopicValidationError),
    DefaultTopicUndeletable,
    /// A new topic can't be saved without an identifier.
    MissingIdentifier,
    DuplicateIdentifier(String),
    Repo(RepoError),
}

impl TopicServiceError {
    pub fn kind(&self) -> TopicErrorKind {
        match self {
            Self::TopicNotFound { .. } | Self::LanguageNotFound(_) => TopicErrorKind::NotFound,
            Self::Validation(err) => err.kind(),
            Self::DefaultTopicUndeletable | Self::MissingIdentifier => {
                TopicErrorKind::IllegalState
            }
            Self::DuplicateIdentifier(_) | Self::Repo(_) => TopicErrorKind::Storage,
        }
    }
}

impl Display for TopicServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TopicNotFound { column, value } => {
                write!(f, "topic with {column} `{value}` does not exist")
            }
            Self::LanguageNotFound(id) => write!(f, "language {id} not found"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::DefaultTopicUndeletable => {
                write!(f, "the `{DEFAULT_TOPIC_IDENTIFIER}` topic can't be deleted")
            }
            Self::MissingIdentifier => {
                write!(f, "a topic identifier must be set before saving a new topic")
            }
            Self::DuplicateIdentifier(value) => {
                write!(f, "topic identifier `{value}` is already taken")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TopicServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TopicValidationError> for TopicServiceError {
    fn from(value: TopicValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TopicServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateIdentifier(identifier) => Self::DuplicateIdentifier(identifier),
            RepoError::TopicNotFound(id) => Self::TopicNotFound {
                column: "id",
                value: id.to_string(),
            },
            other => Self::Repo(other),
        }
    }
}

/// Topic store facade over a repository and a language directory.
pub struct TopicService<R: TopicRepository, L: LanguageDirectory> {
    repo: R,
    languages: L,
}

impl<R: TopicRepository, L: LanguageDirectory> TopicService<R, L> {
    pub fn new(repo: R, languages: L) -> Self {
        Self { repo, languages }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Loads a topic by primary key. Translations load lazily later.
    pub fn by_id(&self, id: TopicId) -> TopicServiceResult<Topic> {
        let record = self
            .repo
            .find_topic_by_id(id)?
            .ok_or_else(|| TopicServiceError::TopicNotFound {
                column: "id",
                value: id.to_string(),
            })?;
        debug!("event=topic_load module=topic status=ok by=id topic_id={id}");
        Ok(Topic::from_record(record))
    }

    /// Loads a topic by its unique identifier.
    pub fn by_identifier(&self, identifier: &str) -> TopicServiceResult<Topic> {
        let record = self
            .repo
            .find_topic_by_identifier(identifier)?
            .ok_or_else(|| TopicServiceError::TopicNotFound {
                column: "identifier",
                value: identifier.to_string(),
            })?;
        debug!(
            "event=topic_load module=topic status=ok by=identifier topic_id={}",
            record.id
        );
        Ok(Topic::from_record(record))
    }

    /// Lists stored topics ordered by identifier.
    pub fn list_topics(&self) -> TopicServiceResult<Vec<TopicRecord>> {
        Ok(self.repo.list_topics()?)
    }

    /// Returns the `default` topic, creating it first when missing.
    pub fn ensure_default_topic(&self) -> TopicServiceResult<Topic> {
        match self.by_identifier(DEFAULT_TOPIC_IDENTIFIER) {
            Err(TopicServiceError::TopicNotFound { .. }) => {
                let mut topic = Topic::new();
                topic.set_identifier(DEFAULT_TOPIC_IDENTIFIER)?;
                topic.set_title(DEFAULT_TOPIC_TITLE);
                self.save(&mut topic)?;
                info!(
                    "event=topic_default_created module=topic status=ok topic_id={}",
                    topic.id()
                );
                Ok(topic)
            }
            other => other,
        }
    }

    /// Reads one translation, or `""` when the key is absent.
    ///
    /// # Errors
    /// - `LanguageNotFound` when `lang_id` is not in the language directory.
    pub fn get_translation(
        &self,
        topic: &mut Topic,
        key: &str,
        lang_id: LanguageId,
    ) -> TopicServiceResult<String> {
        self.ensure_language(lang_id)?;
        self.ensure_loaded(topic, lang_id)?;
        Ok(topic
            .translations()
            .get(lang_id, key)
            .unwrap_or_default()
            .to_string())
    }

    /// Inserts or updates one translation.
    ///
    /// A key that is new for `lang_id` is also added, empty, to every other
    /// known language that lacks it. Each touched language becomes dirty.
    ///
    /// # Errors
    /// - `LanguageNotFound` when `lang_id` is unknown.
    /// - `Validation(InvalidKey)` when `key` fails the key format.
    pub fn set_translation(
        &self,
        topic: &mut Topic,
        key: &str,
        value: impl Into<String>,
        lang_id: LanguageId,
    ) -> TopicServiceResult<()> {
        self.ensure_language(lang_id)?;
        if !is_valid_key_or_identifier(key) {
            return Err(TopicValidationError::InvalidKey(key.to_string()).into());
        }

        self.ensure_loaded(topic, lang_id)?;
        let is_new = topic
            .translations_mut()
            .set(lang_id, key, value.into());
        if !is_new {
            return Ok(());
        }

        for other in self.languages.language_ids() {
            if other == lang_id {
                continue;
            }
            self.ensure_loaded(topic, other)?;
            topic.translations_mut().fill_missing(other, key);
        }
        Ok(())
    }

    /// Drops `key` from every loaded language map without marking changes.
    ///
    /// Use `remove_key` when the removal must be persisted by `save()`.
    pub fn unset_key(&self, topic: &mut Topic, key: &str) {
        for lang_id in self.languages.language_ids() {
            topic.translations_mut().remove(lang_id, key);
        }
    }

    /// Removes `key` from all languages and marks affected languages dirty.
    pub fn remove_key(&self, topic: &mut Topic, key: &str) -> TopicServiceResult<()> {
        for lang_id in self.languages.language_ids() {
            self.ensure_loaded(topic, lang_id)?;
            let translations = topic.translations_mut();
            if translations.remove(lang_id, key) {
                translations.mark_dirty(lang_id);
            }
        }
        Ok(())
    }

    /// Full map of one language, loading it first if needed.
    pub fn translations(
        &self,
        topic: &mut Topic,
        lang_id: LanguageId,
    ) -> TopicServiceResult<TranslationMap> {
        self.ensure_language(lang_id)?;
        self.ensure_loaded(topic, lang_id)?;
        Ok(topic
            .translations()
            .map(lang_id)
            .cloned()
            .unwrap_or_default())
    }

    /// Persists pending changes.
    ///
    /// New topics are inserted together with one empty translation row per
    /// language. Existing topics get a metadata update only when a metadata
    /// field is dirty. Every dirty language map is then written in full.
    ///
    /// # Errors
    /// - `MissingIdentifier` for a new topic without identifier.
    /// - `DuplicateIdentifier` when another topic owns the identifier.
    /// - Storage errors leave earlier statements of this call applied.
    pub fn save(&self, topic: &mut Topic) -> TopicServiceResult<()> {
        if topic.is_new() {
            if topic.identifier().is_empty() {
                return Err(TopicServiceError::MissingIdentifier);
            }
            let lang_ids = self.languages.language_ids();
            let id = self.repo.create_topic(&topic.record(), &lang_ids)?;
            topic.assign_id(id);
            info!(
                "event=topic_create module=topic status=ok topic_id={id} seeded_languages={}",
                lang_ids.len()
            );
        } else if topic.changes().any() {
            self.repo.update_topic(&topic.record())?;
            topic.clear_metadata_changes();
            info!(
                "event=topic_update module=topic status=ok topic_id={}",
                topic.id()
            );
        }

        let dirty = topic.translations().dirty_languages();
        for lang_id in &dirty {
            if let Some(map) = topic.translations().map(*lang_id) {
                self.repo.store_translations(topic.id(), *lang_id, map)?;
            }
        }
        if !dirty.is_empty() {
            info!(
                "event=translations_save module=topic status=ok topic_id={} languages={}",
                topic.id(),
                dirty.len()
            );
        }

        topic.clear_all_changes();
        Ok(())
    }

    /// Deletes the topic with all its translations and resets `topic` to an
    /// unsaved empty state. The translation cache is left stale.
    ///
    /// # Errors
    /// - `DefaultTopicUndeletable` for the `default` topic.
    pub fn delete(&self, topic: &mut Topic) -> TopicServiceResult<()> {
        if topic.is_default() {
            return Err(TopicServiceError::DefaultTopicUndeletable);
        }

        if !topic.is_new() {
            let id = topic.id();
            let removed = self.repo.delete_topic(id)?;
            if removed == 0 {
                warn!("event=topic_delete module=topic status=missing topic_id={id}");
            } else {
                info!("event=topic_delete module=topic status=ok topic_id={id}");
            }
        }

        topic.reset_after_delete();
        Ok(())
    }

    fn ensure_language(&self, lang_id: LanguageId) -> TopicServiceResult<()> {
        if self.languages.get(lang_id).is_none() {
            return Err(TopicServiceError::LanguageNotFound(lang_id));
        }
        Ok(())
    }

    fn ensure_loaded(&self, topic: &mut Topic, lang_id: LanguageId) -> TopicServiceResult<()> {
        if topic.translations().is_loaded(lang_id) {
            return Ok(());
        }

        let map = if topic.is_new() {
            TranslationMap::new()
        } else {
            match self.repo.load_translations(topic.id(), lang_id)? {
                Some(map) => map,
                None => {
                    warn!(
                        "event=translations_load module=topic status=missing_row topic_id={} lang_id={lang_id}",
                        topic.id()
                    );
                    TranslationMap::new()
                }
            }
        };
        debug!(
            "event=translations_load module=topic status=ok topic_id={} lang_id={lang_id} keys={}",
            topic.id(),
            map.len()
        );
        topic.translations_mut().insert_loaded(lang_id, map);
        Ok(())
    }
}
