//! The `TrainingStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `lexis-store-sqlite`).
//! [`crate::trainer::Trainer`] and the API layer depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  dictionary::{Dictionary, DueDictionary, NewDictionary, NewWord, Word, WordEdit},
  schedule::Schedule,
  training::{ExtendedResult, NewTraining, Training, TrainingLimits, TrainingResult},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Which schedules a [`ScheduleQuery`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
  /// Status is `NEW`.
  New,
  /// Status is not `NEW` and the next train date is strictly before `before`.
  Due { before: NaiveDate },
}

/// Parameters for [`TrainingStore::select_words`].
///
/// Results are always ordered by next train date ascending, ties broken by
/// insertion order.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleQuery {
  pub dictionary_id: Uuid,
  pub selection:     Selection,
  pub limit:         Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Lexis storage backend.
///
/// Multi-row writes (`add_word`, `save_results`, `commit_schedules`,
/// `backfill_schedules`) are atomic: either every row is written or none is.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TrainingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Dictionaries ──────────────────────────────────────────────────────

  fn add_dictionary(
    &self,
    input: NewDictionary,
  ) -> impl Future<Output = Result<Dictionary, Self::Error>> + Send + '_;

  /// Retrieve a dictionary by UUID. Returns `None` if not found.
  fn get_dictionary(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Dictionary>, Self::Error>> + Send + '_;

  /// List dictionaries, optionally restricted to one owner.
  fn list_dictionaries(
    &self,
    owner: Option<String>,
  ) -> impl Future<Output = Result<Vec<Dictionary>, Self::Error>> + Send + '_;

  // ── Words ─────────────────────────────────────────────────────────────

  /// Persist a word together with its initial `NEW` schedule.
  fn add_word(
    &self,
    input: NewWord,
  ) -> impl Future<Output = Result<(Word, Schedule), Self::Error>> + Send + '_;

  fn get_word(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Word>, Self::Error>> + Send + '_;

  /// Replace the editable text of a word. Returns `None` if not found.
  fn update_word(
    &self,
    id: Uuid,
    edit: WordEdit,
  ) -> impl Future<Output = Result<Option<Word>, Self::Error>> + Send + '_;

  /// All words of a dictionary in insertion order.
  fn list_words(
    &self,
    dictionary_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Word>, Self::Error>> + Send + '_;

  // ── Schedules ─────────────────────────────────────────────────────────

  /// The schedule of a single word, if it has one.
  fn get_schedule(
    &self,
    word_id: Uuid,
  ) -> impl Future<Output = Result<Option<Schedule>, Self::Error>> + Send + '_;

  /// All schedules of a dictionary, ordered by next train date.
  fn list_schedules(
    &self,
    dictionary_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Schedule>, Self::Error>> + Send + '_;

  /// Words whose schedules match `query`. Words without a schedule are never
  /// returned. Read-only.
  fn select_words(
    &self,
    query: ScheduleQuery,
  ) -> impl Future<Output = Result<Vec<Word>, Self::Error>> + Send + '_;

  /// Insert or replace a single schedule.
  fn save_schedule(
    &self,
    schedule: Schedule,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Create a `NEW` schedule, first due on `created_on`, for every word that
  /// has none. Returns the number created.
  fn backfill_schedules(
    &self,
    created_on: NaiveDate,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Trainings ─────────────────────────────────────────────────────────

  fn add_training(
    &self,
    input: NewTraining,
  ) -> impl Future<Output = Result<Training, Self::Error>> + Send + '_;

  fn get_training(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Training>, Self::Error>> + Send + '_;

  /// Store the outcomes of a training. Re-saving a (training, word) pair
  /// overwrites its success flag.
  fn save_results(
    &self,
    results: Vec<TrainingResult>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All stored outcomes of a training.
  fn list_results(
    &self,
    training_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TrainingResult>, Self::Error>> + Send + '_;

  /// Write the updated schedules of a training and mark it scheduled on
  /// `scheduled_on`, in one transaction.
  ///
  /// Returns `false`, writing nothing, if the training was already scheduled
  /// or does not exist.
  fn commit_schedules(
    &self,
    training_id: Uuid,
    scheduled_on: NaiveDate,
    schedules: Vec<Schedule>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Per-word report for a training, joined against the current schedules
  /// and ordered by next train date.
  fn extended_results(
    &self,
    training_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ExtendedResult>, Self::Error>> + Send + '_;

  // ── Settings and summaries ────────────────────────────────────────────

  fn get_limits(
    &self,
    owner: String,
  ) -> impl Future<Output = Result<Option<TrainingLimits>, Self::Error>> + Send + '_;

  fn set_limits(
    &self,
    owner: String,
    limits: TrainingLimits,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Dictionaries of `owner` with at least one word due before `before`.
  fn due_dictionaries(
    &self,
    owner: String,
    before: NaiveDate,
  ) -> impl Future<Output = Result<Vec<DueDictionary>, Self::Error>> + Send + '_;
}
