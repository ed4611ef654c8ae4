//! Storage for the `languages` table backing `LanguageList`.
//!
//! Hosts that keep their own language registry can skip this module and
//! hand an in-memory `LanguageList` to the topic service instead.

use crate::model::language::{Language, LanguageList};
use crate::repo::ensure_schema;
use crate::repo::topic_repo::RepoResult;
use log::info;
use rusqlite::{params, Connection};

const LANGUAGE_SCHEMA: &[(&str, &[&str])] = &[("languages", &["id", "name"])];

/// Registers one language.
///
/// # Errors
/// - `InvalidLanguage` when the id is not positive or the name is blank.
/// - `Db` when the id or name is already registered.
pub fn insert_language(conn: &Connection, language: &Language) -> RepoResult<()> {
    ensure_schema(conn, LANGUAGE_SCHEMA)?;
    language.validate()?;
    conn.execute(
        "INSERT INTO languages (id, name) VALUES (?1, ?2);",
        params![language.id, language.name.trim()],
    )?;
    info!(
        "event=language_insert module=language status=ok lang_id={}",
        language.id
    );
    Ok(())
}

/// Lists registered languages ordered by id.
pub fn list_languages(conn: &Connection) -> RepoResult<Vec<Language>> {
    ensure_schema(conn, LANGUAGE_SCHEMA)?;
    let mut stmt = conn.prepare("SELECT id, name FROM languages ORDER BY id ASC;")?;
    let mut rows = stmt.query([])?;
    let mut languages = Vec::new();
    while let Some(row) = rows.next()? {
        languages.push(Language {
            id: row.get("id")?,
            name: row.get("name")?,
        });
    }
    Ok(languages)
}

/// Builds a language directory from the `languages` table.
pub fn load_language_list(conn: &Connection) -> RepoResult<LanguageList> {
    let list = LanguageList::new(list_languages(conn)?)?;
    Ok(list)
}
