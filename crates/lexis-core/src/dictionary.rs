//! Dictionaries and the words they contain.
//!
//! A word's text can be edited after creation, but its headword, dictionary
//! and creation date never change. Learning progress lives in a separate
//! [`Schedule`](crate::schedule::Schedule) record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Dictionary ──────────────────────────────────────────────────────────────

/// A named collection of words owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
  pub dictionary_id: Uuid,
  /// Opaque user name; authentication happens outside this crate.
  pub owner:         String,
  pub name:          String,
  pub description:   Option<String>,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::TrainingStore::add_dictionary`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewDictionary {
  pub owner:       String,
  pub name:        String,
  pub description: Option<String>,
}

/// A dictionary with words waiting for repetition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDictionary {
  pub dictionary_id: Uuid,
  pub name:          String,
  pub words_count:   u64,
}

// ─── Word ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
  pub word_id:       Uuid,
  pub dictionary_id: Uuid,
  /// The headword itself.
  pub name:          String,
  pub translation:   String,
  /// Free-text note on where the word was met.
  pub context:       Option<String>,
  pub example:       Option<String>,
  pub added_on:      NaiveDate,
}

/// Input to [`crate::store::TrainingStore::add_word`].
/// `added_on` also becomes the first due date of the word's schedule.
#[derive(Debug, Clone)]
pub struct NewWord {
  pub dictionary_id: Uuid,
  pub name:          String,
  pub translation:   String,
  pub context:       Option<String>,
  pub example:       Option<String>,
  pub added_on:      NaiveDate,
}

/// The editable text fields of a word.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordEdit {
  pub translation: String,
  pub context:     Option<String>,
  pub example:     Option<String>,
}
