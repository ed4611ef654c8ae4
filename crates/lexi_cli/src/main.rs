//! Command-line probe for a Lexi store.
//!
//! # Responsibility
//! - Verify `lexi_core` linkage (`ping`, `version`).
//! - Inspect and edit topics of the store named by `LEXI_DB_PATH`.

use clap::{Parser, Subcommand};
use lexi_core::db::open_db;
use lexi_core::{
    init_logging, insert_language, list_languages, load_language_list, Language, LanguageId,
    LanguageList, LexiConfig, SqliteTopicRepository, Topic, TopicService,
};
use log::warn;
use std::error::Error;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "lexi_cli")]
#[command(about = "Inspect and edit topics of a Lexi translation store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Check that lexi_core is linked
    Ping,
    /// Print the lexi_core version
    Version,
    /// List registered languages
    Languages,
    /// Register a language
    AddLanguage { id: LanguageId, name: String },
    /// List topics ordered by identifier
    Topics,
    /// Create a topic with one empty translation row per language
    Create {
        identifier: String,
        title: Option<String>,
    },
    /// Print one translation ("" when the key is absent)
    Get {
        identifier: String,
        key: String,
        lang_id: LanguageId,
    },
    /// Set one translation and save the topic
    Set {
        identifier: String,
        key: String,
        lang_id: LanguageId,
        value: String,
    },
    /// Delete a topic and all of its translations
    Delete { identifier: String },
}

type CliResult = Result<(), Box<dyn Error>>;
type CliService<'conn> = TopicService<SqliteTopicRepository<'conn>, LanguageList>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();
    let config = LexiConfig::from_env();
    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            warn!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &LexiConfig, command: Command) -> CliResult {
    match command {
        Command::Ping => {
            println!("lexi_core ping={}", lexi_core::ping());
            Ok(())
        }
        Command::Version => {
            println!("lexi_core version={}", lexi_core::core_version());
            Ok(())
        }
        Command::Languages => {
            let conn = open_db(&config.db_path)?;
            for language in list_languages(&conn)? {
                println!("{}\t{}", language.id, language.name);
            }
            Ok(())
        }
        Command::AddLanguage { id, name } => {
            let conn = open_db(&config.db_path)?;
            insert_language(&conn, &Language::new(id, name))?;
            Ok(())
        }
        Command::Topics => with_service(config, |service| {
            for record in service.list_topics()? {
                println!("{}\t{}\t{}", record.id, record.identifier, record.title);
            }
            Ok(())
        }),
        Command::Create { identifier, title } => with_service(config, |service| {
            let mut topic = Topic::new();
            topic.set_identifier(identifier)?;
            if let Some(title) = title {
                topic.set_title(title);
            }
            service.save(&mut topic)?;
            println!("{}", topic.id());
            Ok(())
        }),
        Command::Get {
            identifier,
            key,
            lang_id,
        } => with_service(config, |service| {
            let mut topic = service.by_identifier(&identifier)?;
            let value = service.get_translation(&mut topic, &key, lang_id)?;
            println!("{value}");
            Ok(())
        }),
        Command::Set {
            identifier,
            key,
            lang_id,
            value,
        } => with_service(config, |service| {
            let mut topic = service.by_identifier(&identifier)?;
            service.set_translation(&mut topic, &key, value, lang_id)?;
            service.save(&mut topic)?;
            Ok(())
        }),
        Command::Delete { identifier } => with_service(config, |service| {
            let mut topic = service.by_identifier(&identifier)?;
            service.delete(&mut topic)?;
            Ok(())
        }),
    }
}

fn with_service(
    config: &LexiConfig,
    action: impl FnOnce(&CliService<'_>) -> CliResult,
) -> CliResult {
    let conn = open_db(&config.db_path)?;
    let languages = load_language_list(&conn)?;
    if languages.is_empty() {
        return Err("no languages registered; run `add-language` first".into());
    }
    let service = TopicService::new(SqliteTopicRepository::try_new(&conn)?, languages);
    action(&service)
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::error::ErrorKind;
    use clap::Parser;

    #[test]
    fn set_parses_typed_language_id() {
        let cli = Cli::try_parse_from(["lexi_cli", "set", "checkout", "pay_now", "2", "Jetzt zahlen"])
            .unwrap();
        assert_eq!(
            cli.command,
            Command::Set {
                identifier: "checkout".to_string(),
                key: "pay_now".to_string(),
                lang_id: 2,
                value: "Jetzt zahlen".to_string(),
            }
        );
    }

    #[test]
    fn create_title_is_optional() {
        let cli = Cli::try_parse_from(["lexi_cli", "create", "faq"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Create {
                identifier: "faq".to_string(),
                title: None,
            }
        );
    }

    #[test]
    fn add_language_uses_kebab_case_name() {
        let cli = Cli::try_parse_from(["lexi_cli", "add-language", "3", "french"]).unwrap();
        assert_eq!(
            cli.command,
            Command::AddLanguage {
                id: 3,
                name: "french".to_string(),
            }
        );
    }

    #[test]
    fn non_numeric_language_id_is_rejected() {
        let err = Cli::try_parse_from(["lexi_cli", "get", "faq", "title", "de"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn missing_arguments_are_rejected() {
        let err = Cli::try_parse_from(["lexi_cli", "get", "faq"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
