//! Process configuration resolved from environment variables.
//!
//! | variable         | default               |
//! |------------------|-----------------------|
//! | `LEXI_DB_PATH`   | `lexi.sqlite3`        |
//! | `LEXI_LOG_LEVEL` | `default_log_level()` |
//! | `LEXI_LOG_DIR`   | unset: no file logs   |

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "LEXI_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "LEXI_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "LEXI_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "lexi.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<String>,
}

impl LexiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_VAR),
        }
    }
}
