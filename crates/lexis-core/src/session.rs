//! The in-memory cursor over one training's word batch.
//!
//! A session belongs to exactly one training and is only ever driven by the
//! user running it. [`crate::trainer::Trainer`] keeps one per active training,
//! keyed by training id.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
  Error, Result,
  dictionary::Word,
  training::{Training, TrainingResult, TrainingStats},
};

#[derive(Debug, Clone)]
pub struct TrainingSession {
  training_id:   Uuid,
  batch:         Vec<Word>,
  /// Position in `trained`; may equal `trained.len()` when showing a word
  /// that has no result yet.
  current_index: usize,
  /// Words in the order they first received a result.
  trained:       Vec<Word>,
  results:       HashMap<Uuid, bool>,
  stats:         TrainingStats,
}

impl TrainingSession {
  pub fn new(training: &Training) -> Self {
    Self {
      training_id:   training.training_id,
      batch:         training.words.clone(),
      current_index: 0,
      trained:       Vec::new(),
      results:       HashMap::new(),
      stats:         TrainingStats {
        all_words: training.words.len(),
        ..TrainingStats::default()
      },
    }
  }

  pub fn training_id(&self) -> Uuid { self.training_id }

  /// The word to show next, or `None` once every word has a result.
  ///
  /// After the user stepped back, this replays already-answered words in
  /// the order they were answered before falling through to the first
  /// unanswered word of the batch. Calling it again without recording a
  /// result returns the same word.
  pub fn next_word(&mut self) -> Option<&Word> {
    if !self.trained.is_empty() {
      self.current_index = (self.current_index + 1).min(self.trained.len());
    }
    self.current_word()
  }

  /// The word at the cursor, without moving it.
  pub fn current_word(&self) -> Option<&Word> {
    self.trained.get(self.current_index).or_else(|| {
      self
        .batch
        .iter()
        .find(|w| !self.results.contains_key(&w.word_id))
    })
  }

  /// The word before the current position.
  ///
  /// With `navigate` the cursor moves back onto it; without, this is a
  /// read-only preview.
  pub fn previous_word(&mut self, navigate: bool) -> Option<&Word> {
    if self.current_index < 1 {
      return None;
    }
    if navigate {
      self.current_index -= 1;
      self.trained.get(self.current_index)
    } else {
      self.trained.get(self.current_index - 1)
    }
  }

  /// Record (or overwrite) the outcome for a word of this training.
  pub fn record_result(&mut self, word_id: Uuid, success: bool) -> Result<TrainingStats> {
    let word = self
      .batch
      .iter()
      .find(|w| w.word_id == word_id)
      .ok_or(Error::WordNotInTraining {
        training_id: self.training_id,
        word_id,
      })?;

    if self.results.insert(word_id, success).is_none() {
      self.trained.push(word.clone());
    }

    let trained = self.results.len();
    let remembered = self.results.values().filter(|ok| **ok).count();
    self.stats.trained_words = trained;
    self.stats.remembered_words = remembered;
    self.stats.failed_words = trained - remembered;

    Ok(self.stats)
  }

  pub fn is_complete(&self) -> bool { self.results.len() == self.batch.len() }

  pub fn stats(&self) -> TrainingStats { self.stats }

  /// Recorded outcomes, in the order the words were first answered.
  pub fn results(&self) -> Vec<TrainingResult> {
    self
      .trained
      .iter()
      .filter_map(|w| {
        self.results.get(&w.word_id).map(|success| TrainingResult {
          training_id: self.training_id,
          word_id:     w.word_id,
          success:     *success,
        })
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, Utc};

  use super::*;
  use crate::training::TrainingKind;

  fn word(name: &str) -> Word {
    Word {
      word_id:       Uuid::new_v4(),
      dictionary_id: Uuid::nil(),
      name:          name.into(),
      translation:   format!("{name}-tr"),
      context:       None,
      example:       None,
      added_on:      NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    }
  }

  fn session(names: &[&str]) -> TrainingSession {
    let training = Training {
      training_id:   Uuid::new_v4(),
      dictionary_id: Uuid::nil(),
      kind:          TrainingKind::New,
      words:         names.iter().map(|n| word(n)).collect(),
      trained_on:    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
      created_at:    Utc::now(),
      scheduled_on:  None,
    };
    TrainingSession::new(&training)
  }

  fn id_of(s: &TrainingSession, name: &str) -> Uuid {
    s.batch.iter().find(|w| w.name == name).unwrap().word_id
  }

  fn next_name(s: &mut TrainingSession) -> Option<String> {
    s.next_word().map(|w| w.name.clone())
  }

  #[test]
  fn next_word_is_stable_until_answered() {
    let mut s = session(&["a", "b", "c"]);
    assert_eq!(next_name(&mut s).as_deref(), Some("a"));
    assert_eq!(next_name(&mut s).as_deref(), Some("a"));

    s.record_result(id_of(&s, "a"), true).unwrap();
    assert_eq!(next_name(&mut s).as_deref(), Some("b"));
    assert_eq!(next_name(&mut s).as_deref(), Some("b"));
    assert_eq!(next_name(&mut s).as_deref(), Some("b"));
  }

  #[test]
  fn repeated_result_updates_value_without_duplicating() {
    let mut s = session(&["a", "b"]);
    let a = id_of(&s, "a");

    s.record_result(a, true).unwrap();
    let stats = s.record_result(a, false).unwrap();

    assert_eq!(s.trained.len(), 1);
    assert_eq!(stats.trained_words, 1);
    assert_eq!(stats.remembered_words, 0);
    assert_eq!(stats.failed_words, 1);
    assert_eq!(stats.all_words, 2);
  }

  #[test]
  fn completion_requires_every_word() {
    let mut s = session(&["a", "b", "c"]);
    s.record_result(id_of(&s, "a"), true).unwrap();
    s.record_result(id_of(&s, "b"), false).unwrap();
    assert!(!s.is_complete());

    s.record_result(id_of(&s, "c"), true).unwrap();
    assert!(s.is_complete());
  }

  #[test]
  fn next_word_is_none_when_all_answered() {
    let mut s = session(&["a"]);
    next_name(&mut s);
    s.record_result(id_of(&s, "a"), true).unwrap();
    assert_eq!(next_name(&mut s), None);
  }

  #[test]
  fn empty_batch_is_immediately_complete() {
    let mut s = session(&[]);
    assert!(s.is_complete());
    assert_eq!(next_name(&mut s), None);
    assert_eq!(s.stats().all_words, 0);
  }

  #[test]
  fn unknown_word_is_rejected() {
    let mut s = session(&["a"]);
    let err = s.record_result(Uuid::new_v4(), true).unwrap_err();
    assert!(matches!(err, Error::WordNotInTraining { .. }));
    assert_eq!(s.stats().trained_words, 0);
  }

  #[test]
  fn previous_word_preview_and_navigation() {
    let mut s = session(&["a", "b", "c"]);
    assert!(s.previous_word(false).is_none());

    next_name(&mut s);
    s.record_result(id_of(&s, "a"), true).unwrap();
    assert_eq!(next_name(&mut s).as_deref(), Some("b"));

    // Preview does not move the cursor.
    assert_eq!(s.previous_word(false).map(|w| w.name.clone()).as_deref(), Some("a"));
    assert_eq!(s.previous_word(false).map(|w| w.name.clone()).as_deref(), Some("a"));

    // Navigating back lands on "a"; there is nothing before it.
    assert_eq!(s.previous_word(true).map(|w| w.name.clone()).as_deref(), Some("a"));
    assert!(s.previous_word(true).is_none());
  }

  #[test]
  fn stepping_back_replays_history_then_resumes() {
    let mut s = session(&["a", "b", "c"]);
    next_name(&mut s);
    s.record_result(id_of(&s, "a"), true).unwrap();
    next_name(&mut s);
    s.record_result(id_of(&s, "b"), false).unwrap();
    assert_eq!(next_name(&mut s).as_deref(), Some("c"));

    assert_eq!(s.previous_word(true).map(|w| w.name.clone()).as_deref(), Some("b"));
    assert_eq!(s.previous_word(true).map(|w| w.name.clone()).as_deref(), Some("a"));

    // Re-answering a replayed word keeps its slot.
    s.record_result(id_of(&s, "a"), false).unwrap();
    assert_eq!(next_name(&mut s).as_deref(), Some("b"));
    assert_eq!(next_name(&mut s).as_deref(), Some("c"));
    assert_eq!(s.trained.len(), 2);
  }

  #[test]
  fn results_follow_answer_order() {
    let mut s = session(&["a", "b", "c"]);
    s.record_result(id_of(&s, "c"), true).unwrap();
    s.record_result(id_of(&s, "a"), false).unwrap();

    let results = s.results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].word_id, id_of(&s, "c"));
    assert!(results[0].success);
    assert_eq!(results[1].word_id, id_of(&s, "a"));
    assert!(!results[1].success);
  }
}
