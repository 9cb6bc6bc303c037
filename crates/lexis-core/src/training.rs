//! Trainings, their results, and the read models derived from them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{dictionary::Word, schedule::WordStatus};

/// Whether a training introduces new words or repeats due ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingKind {
  New,
  Repeat,
}

/// One run through a fixed batch of words. The batch never changes after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Training {
  pub training_id:   Uuid,
  pub dictionary_id: Uuid,
  pub kind:          TrainingKind,
  /// Words in the order they were selected.
  pub words:         Vec<Word>,
  /// Calendar date used for every schedule update of this training.
  pub trained_on:    NaiveDate,
  pub created_at:    DateTime<Utc>,
  /// Set once the schedule has been formed from this training's results.
  pub scheduled_on:  Option<NaiveDate>,
}

/// Input to [`crate::store::TrainingStore::add_training`].
#[derive(Debug, Clone)]
pub struct NewTraining {
  pub dictionary_id: Uuid,
  pub kind:          TrainingKind,
  pub words:         Vec<Word>,
  pub trained_on:    NaiveDate,
}

/// The outcome for one word of one training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingResult {
  pub training_id: Uuid,
  pub word_id:     Uuid,
  pub success:     bool,
}

/// Running counters for an active session. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStats {
  pub all_words:        usize,
  pub trained_words:    usize,
  pub remembered_words: usize,
  pub failed_words:     usize,
}

/// One row of the post-training report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedResult {
  pub word:            String,
  pub translation:     String,
  pub success:         bool,
  pub status:          WordStatus,
  pub next_train_date: NaiveDate,
}

/// Per-owner batch sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingLimits {
  pub new_words_in_train:    usize,
  pub repeat_words_in_train: usize,
}

impl Default for TrainingLimits {
  fn default() -> Self {
    Self {
      new_words_in_train:    10,
      repeat_words_in_train: 20,
    }
  }
}

impl TrainingLimits {
  pub fn for_kind(&self, kind: TrainingKind) -> usize {
    match kind {
      TrainingKind::New => self.new_words_in_train,
      TrainingKind::Repeat => self.repeat_words_in_train,
    }
  }
}
