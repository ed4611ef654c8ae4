//! Language directory contracts.
//!
//! The hosting application owns the list of languages. The store only needs
//! to check that a numeric language id exists and to iterate all of them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Numeric language identifier supplied by the language directory.
pub type LanguageId = i64;

/// One language known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: LanguageId,
    /// Human-readable name, e.g. `default` or `german`.
    pub name: String,
}

impl Language {
    pub fn new(id: LanguageId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Checks the shape rules enforced before a language is registered.
    pub fn validate(&self) -> Result<(), LanguageError> {
        if self.id <= 0 {
            return Err(LanguageError::InvalidId(self.id));
        }
        if self.name.trim().is_empty() {
            return Err(LanguageError::EmptyName(self.id));
        }
        Ok(())
    }
}

/// Rejected language definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageError {
    InvalidId(LanguageId),
    DuplicateId(LanguageId),
    EmptyName(LanguageId),
}

impl Display for LanguageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "language id must be positive, got {id}"),
            Self::DuplicateId(id) => write!(f, "language id {id} is listed twice"),
            Self::EmptyName(id) => write!(f, "language {id} has an empty name"),
        }
    }
}

impl Error for LanguageError {}

/// Source of the languages a topic keeps translations for.
pub trait LanguageDirectory {
    /// All known languages, in a stable order.
    fn languages(&self) -> &[Language];

    /// Looks up one language by id.
    fn get(&self, id: LanguageId) -> Option<&Language> {
        self.languages().iter().find(|language| language.id == id)
    }

    /// Ids of all known languages, in directory order.
    fn language_ids(&self) -> Vec<LanguageId> {
        self.languages().iter().map(|language| language.id).collect()
    }
}

impl<T: LanguageDirectory + ?Sized> LanguageDirectory for &T {
    fn languages(&self) -> &[Language] {
        (**self).languages()
    }

    fn get(&self, id: LanguageId) -> Option<&Language> {
        (**self).get(id)
    }
}

/// Fixed, validated list of languages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageList {
    languages: Vec<Language>,
}

impl LanguageList {
    /// Builds a directory, rejecting non-positive, duplicate or unnamed ids.
    pub fn new(languages: Vec<Language>) -> Result<Self, LanguageError> {
        let mut seen = BTreeSet::new();
        for language in &languages {
            language.validate()?;
            if !seen.insert(language.id) {
                return Err(LanguageError::DuplicateId(language.id));
            }
        }
        Ok(Self { languages })
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl LanguageDirectory for LanguageList {
    fn languages(&self) -> &[Language] {
        &self.languages
    }
}
