//! Domain model for topics, languages and translation maps.
//!
//! # Responsibility
//! - Define the in-memory shapes the topic service mutates and persists.
//! - Own format rules for topic identifiers and translation keys.
//!
//! # Invariants
//! - A topic with id `0` has never been saved.
//! - Every key present for one language of a topic is present for all
//!   known languages once edits go through the topic service.

pub mod language;
pub mod topic;
pub mod translation;
