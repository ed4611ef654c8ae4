//! Core of the Lexi translation store.
//!
//! Topics group translation keys; each topic keeps one key→value map per
//! language. This crate owns the format rules, change tracking and SQLite
//! persistence for them.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::LexiConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::language::{Language, LanguageDirectory, LanguageError, LanguageId, LanguageList};
pub use model::topic::{
    is_valid_key_or_identifier, Topic, TopicChanges, TopicErrorKind, TopicId, TopicRecord,
    TopicValidationError, DEFAULT_TOPIC_IDENTIFIER, UNSAVED_TOPIC_ID,
};
pub use model::translation::{TranslationMap, TranslationSet};
pub use repo::language_repo::{insert_language, list_languages, load_language_list};
pub use repo::topic_repo::{RepoError, RepoResult, SqliteTopicRepository, TopicRepository};
pub use service::topic_service::{TopicService, TopicServiceError, TopicServiceResult};

/// Minimal health-check API for integration probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
