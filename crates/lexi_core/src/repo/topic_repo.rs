//! Topic repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read and write `topics` rows and per-language `translations` blobs.
//! - Encode translation maps as key-sorted JSON objects.
//!
//! # Invariants
//! - A created topic gets exactly one `translations` row per language id
//!   passed to `create_topic`, each with an empty blob.
//! - Deleting a topic removes its translation rows before the topic row.

use crate::db::DbError;
use crate::model::language::{LanguageError, LanguageId};
use crate::model::topic::{TopicId, TopicRecord};
use crate::model::translation::{decode_translations, encode_translations, TranslationMap};
use crate::repo::ensure_schema;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TOPIC_SELECT_SQL: &str = "SELECT id, identifier, title, description FROM topics";

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-level error for topic and language persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection schema is not at the version this build expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// The unique `topics.identifier` constraint rejected a write.
    DuplicateIdentifier(String),
    /// An update targeted a topic row that no longer exists.
    TopicNotFound(TopicId),
    InvalidLanguage(LanguageError),
    /// Stored data cannot be turned back into the domain model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "topic repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "topic repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "topic repository requires column `{column}` in table `{table}`"
            ),
            Self::DuplicateIdentifier(identifier) => {
                write!(f, "topic identifier `{identifier}` is already taken")
            }
            Self::TopicNotFound(id) => write!(f, "topic row not found: {id}"),
            Self::InvalidLanguage(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored topic data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidLanguage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<LanguageError> for RepoError {
    fn from(value: LanguageError) -> Self {
        Self::InvalidLanguage(value)
    }
}

/// Statements the topic service needs from storage.
pub trait TopicRepository {
    fn find_topic_by_id(&self, id: TopicId) -> RepoResult<Option<TopicRecord>>;
    fn find_topic_by_identifier(&self, identifier: &str) -> RepoResult<Option<TopicRecord>>;
    /// All topics ordered by identifier.
    fn list_topics(&self) -> RepoResult<Vec<TopicRecord>>;
    /// Inserts a topic row plus one empty translation row per language.
    fn create_topic(&self, record: &TopicRecord, lang_ids: &[LanguageId]) -> RepoResult<TopicId>;
    /// Writes title, description and identifier of an existing row.
    fn update_topic(&self, record: &TopicRecord) -> RepoResult<()>;
    /// Returns `None` when no row exists for `(topic_id, lang_id)`.
    fn load_translations(
        &self,
        topic_id: TopicId,
        lang_id: LanguageId,
    ) -> RepoResult<Option<TranslationMap>>;
    /// Replaces the blob stored for `(topic_id, lang_id)`.
    fn store_translations(
        &self,
        topic_id: TopicId,
        lang_id: LanguageId,
        translations: &TranslationMap,
    ) -> RepoResult<()>;
    /// Deletes all translation rows of the topic, then the topic row.
    ///
    /// Returns the number of topic rows removed (0 or 1).
    fn delete_topic(&self, topic_id: TopicId) -> RepoResult<usize>;
}

/// SQLite-backed topic repository.
pub struct SqliteTopicRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTopicRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` for foreign schemas.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(
            conn,
            &[
                ("topics", &["id", "identifier", "title", "description"]),
                ("translations", &["topic_id", "lang_id", "translations"]),
            ],
        )?;
        Ok(Self { conn })
    }

    fn find_topic_by(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<TopicRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TOPIC_SELECT_SQL} WHERE {column} = ?1;"))?;
        let record = stmt.query_row(&[value], parse_topic_row).optional()?;
        Ok(record)
    }
}

impl TopicRepository for SqliteTopicRepository<'_> {
    fn find_topic_by_id(&self, id: TopicId) -> RepoResult<Option<TopicRecord>> {
        self.find_topic_by("id", &id)
    }

    fn find_topic_by_identifier(&self, identifier: &str) -> RepoResult<Option<TopicRecord>> {
        self.find_topic_by("identifier", &identifier)
    }

    fn list_topics(&self) -> RepoResult<Vec<TopicRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TOPIC_SELECT_SQL} ORDER BY identifier ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        Ok(topics)
    }

    fn create_topic(&self, record: &TopicRecord, lang_ids: &[LanguageId]) -> RepoResult<TopicId> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO topics (title, identifier, description) VALUES (?1, ?2, ?3);",
            params![
                record.title.as_str(),
                record.identifier.as_str(),
                record.description.as_str()
            ],
        )
        .map_err(|err| identifier_conflict(err, &record.identifier))?;
        let topic_id = tx.last_insert_rowid();

        {
            let mut seed =
                tx.prepare("INSERT INTO translations (topic_id, lang_id) VALUES (?1, ?2);")?;
            for lang_id in lang_ids {
                seed.execute(params![topic_id, lang_id])?;
            }
        }

        tx.commit()?;
        Ok(topic_id)
    }

    fn update_topic(&self, record: &TopicRecord) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE topics
                 SET title = ?1, description = ?2, identifier = ?3
                 WHERE id = ?4;",
                params![
                    record.title.as_str(),
                    record.description.as_str(),
                    record.identifier.as_str(),
                    record.id
                ],
            )
            .map_err(|err| identifier_conflict(err, &record.identifier))?;

        if changed == 0 {
            return Err(RepoError::TopicNotFound(record.id));
        }
        Ok(())
    }

    fn load_translations(
        &self,
        topic_id: TopicId,
        lang_id: LanguageId,
    ) -> RepoResult<Option<TranslationMap>> {
        let blob: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT translations FROM translations WHERE topic_id = ?1 AND lang_id = ?2;",
                params![topic_id, lang_id],
                |row| row.get(0),
            )
            .optional()?;

        match blob {
            None => Ok(None),
            Some(text) => decode_translations(text.as_deref())
                .map(Some)
                .map_err(|err| {
                    RepoError::InvalidData(format!(
                        "translations blob of topic {topic_id} language {lang_id}: {err}"
                    ))
                }),
        }
    }

    fn store_translations(
        &self,
        topic_id: TopicId,
        lang_id: LanguageId,
        translations: &TranslationMap,
    ) -> RepoResult<()> {
        let blob = encode_translations(translations).map_err(|err| {
            RepoError::InvalidData(format!("cannot encode translations: {err}"))
        })?;

        let changed = self.conn.execute(
            "UPDATE translations SET translations = ?1 WHERE topic_id = ?2 AND lang_id = ?3;",
            params![blob, topic_id, lang_id],
        )?;
        if changed == 0 {
            // Languages registered after the topic was created have no seeded row.
            self.conn.execute(
                "INSERT INTO translations (topic_id, lang_id, translations) VALUES (?1, ?2, ?3);",
                params![topic_id, lang_id, blob],
            )?;
        }
        Ok(())
    }

    fn delete_topic(&self, topic_id: TopicId) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM translations WHERE topic_id = ?1;", [topic_id])?;
        let removed = tx.execute("DELETE FROM topics WHERE id = ?1;", [topic_id])?;
        tx.commit()?;
        Ok(removed)
    }
}

fn parse_topic_row(row: &Row<'_>) -> rusqlite::Result<TopicRecord> {
    Ok(TopicRecord {
        id: row.get("id")?,
        identifier: row.get("identifier")?,
        title: row.get("title")?,
        description: row.get("description")?,
    })
}

fn identifier_conflict(err: rusqlite::Error, identifier: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateIdentifier(identifier.to_string())
        }
        _ => err.into(),
    }
}
