//! Per-word repetition schedules and the stage-advancement state machine.
//!
//! Every word owns exactly one [`Schedule`]. Its status only ever moves
//! forward (`NEW` → `IS_LEARNING` → `LEARNT`); its stage selects how many days
//! pass before the word is due again.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::training::TrainingKind;

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WordStatus {
  /// Never trained. Only candidates for new-word trainings.
  New,
  IsLearning,
  Learnt,
}

// ─── Stage table ─────────────────────────────────────────────────────────────

/// Learning stage, ordered from first to terminal.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
  Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LearningStage {
  #[default]
  Stage1,
  Stage2,
  Stage3,
  Stage4,
  Stage5,
  Stage6,
}

impl LearningStage {
  /// All stages in order. `ALL[i].index() == i`.
  pub const ALL: [Self; 6] = [
    Self::Stage1,
    Self::Stage2,
    Self::Stage3,
    Self::Stage4,
    Self::Stage5,
    Self::Stage6,
  ];

  pub const TERMINAL: Self = Self::Stage6;

  /// Days between a training at this stage and the next repetition.
  pub fn days_till_next_train(self) -> u64 {
    match self {
      Self::Stage1 => 1,
      Self::Stage2 => 3,
      Self::Stage3 => 7,
      Self::Stage4 => 14,
      Self::Stage5 => 30,
      Self::Stage6 => 60,
    }
  }

  pub fn index(self) -> usize { self as usize }

  pub fn from_index(index: usize) -> Option<Self> { Self::ALL.get(index).copied() }

  pub fn is_terminal(self) -> bool { self == Self::TERMINAL }

  /// Move `step` stages forward, stopping at the terminal stage.
  pub fn advanced_by(self, step: usize) -> Self {
    let last = Self::TERMINAL.index();
    Self::ALL[(self.index() + step).min(last)]
  }
}

/// How many stages a successful repetition moves a word forward.
///
/// A success skips one intermediate stage. Kept as observed in the system
/// this engine replaces; see `DESIGN.md` before changing it.
pub const SUCCESS_STAGE_STEP: usize = 2;

// ─── Schedule ────────────────────────────────────────────────────────────────

/// Learning progress of a single word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
  pub word_id:           Uuid,
  /// Copied from the word so schedules can be queried per dictionary.
  pub dictionary_id:     Uuid,
  pub status:            WordStatus,
  pub stage:             LearningStage,
  pub total_train_count: u32,
  pub last_train_date:   Option<NaiveDate>,
  pub next_train_date:   NaiveDate,
  /// Set only when the word reaches [`WordStatus::Learnt`].
  pub learnt_date:       Option<NaiveDate>,
}

impl Schedule {
  /// A fresh `NEW` schedule, first due on `created_on`.
  pub fn new(word_id: Uuid, dictionary_id: Uuid, created_on: NaiveDate) -> Self {
    Self {
      word_id,
      dictionary_id,
      status: WordStatus::New,
      stage: LearningStage::default(),
      total_train_count: 0,
      last_train_date: None,
      next_train_date: created_on,
      learnt_date: None,
    }
  }

  /// Fold one training outcome into the schedule.
  ///
  /// Status and stage change first; the next date is then computed from the
  /// possibly-updated stage.
  pub fn record_training(
    &mut self,
    kind: TrainingKind,
    success: bool,
    trained_on: NaiveDate,
  ) {
    match kind {
      TrainingKind::New => self.status = WordStatus::IsLearning,
      TrainingKind::Repeat if success => {
        if self.stage.is_terminal() {
          self.status = WordStatus::Learnt;
          self.learnt_date = Some(trained_on);
        } else {
          self.stage = self.stage.advanced_by(SUCCESS_STAGE_STEP);
        }
      }
      TrainingKind::Repeat => {}
    }

    self.total_train_count += 1;
    self.last_train_date = Some(trained_on);
    self.next_train_date = trained_on
      .checked_add_days(Days::new(self.stage.days_till_next_train()))
      .unwrap_or(NaiveDate::MAX);
  }

  /// Whether a repeat training on `today` would pick this word up.
  pub fn is_due(&self, today: NaiveDate) -> bool {
    self.status != WordStatus::New && self.next_train_date < today
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn schedule_at(stage: LearningStage, status: WordStatus) -> Schedule {
    let mut s = Schedule::new(Uuid::new_v4(), Uuid::new_v4(), date(2024, 1, 1));
    s.stage = stage;
    s.status = status;
    s
  }

  #[test]
  fn stage_offsets_increase() {
    let offsets: Vec<u64> = LearningStage::ALL
      .iter()
      .map(|s| s.days_till_next_train())
      .collect();
    assert_eq!(offsets[0], 1);
    assert!(offsets.windows(2).all(|w| w[0] < w[1]), "{offsets:?}");
  }

  #[test]
  fn advance_is_bounded_by_terminal_stage() {
    assert_eq!(LearningStage::Stage1.advanced_by(2), LearningStage::Stage3);
    assert_eq!(LearningStage::Stage4.advanced_by(2), LearningStage::Stage6);
    assert_eq!(LearningStage::Stage5.advanced_by(2), LearningStage::Stage6);
    assert_eq!(LearningStage::Stage6.advanced_by(2), LearningStage::Stage6);
  }

  #[test]
  fn from_index_roundtrips_and_rejects_out_of_range() {
    for stage in LearningStage::ALL {
      assert_eq!(LearningStage::from_index(stage.index()), Some(stage));
    }
    assert_eq!(LearningStage::from_index(6), None);
  }

  #[test]
  fn new_schedule_defaults() {
    let s = Schedule::new(Uuid::new_v4(), Uuid::new_v4(), date(2024, 3, 10));
    assert_eq!(s.status, WordStatus::New);
    assert_eq!(s.stage, LearningStage::Stage1);
    assert_eq!(s.total_train_count, 0);
    assert_eq!(s.next_train_date, date(2024, 3, 10));
    assert!(s.last_train_date.is_none());
    assert!(s.learnt_date.is_none());
  }

  #[test]
  fn repeat_success_at_stage1_moves_to_stage3() {
    let mut s = schedule_at(LearningStage::Stage1, WordStatus::IsLearning);
    let today = date(2024, 5, 1);
    s.record_training(TrainingKind::Repeat, true, today);

    assert_eq!(s.stage, LearningStage::Stage3);
    assert_eq!(s.status, WordStatus::IsLearning);
    assert_eq!(s.next_train_date, date(2024, 5, 8));
    assert_eq!(s.last_train_date, Some(today));
    assert_eq!(s.total_train_count, 1);
  }

  #[test]
  fn repeat_success_at_terminal_stage_marks_learnt() {
    let mut s = schedule_at(LearningStage::Stage6, WordStatus::IsLearning);
    let today = date(2024, 5, 1);
    s.record_training(TrainingKind::Repeat, true, today);

    assert_eq!(s.status, WordStatus::Learnt);
    assert_eq!(s.learnt_date, Some(today));
    assert_eq!(s.stage, LearningStage::Stage6);
    assert_eq!(s.next_train_date, date(2024, 6, 30));
  }

  #[test]
  fn repeat_failure_keeps_stage_and_status() {
    let mut s = schedule_at(LearningStage::Stage3, WordStatus::IsLearning);
    let today = date(2024, 5, 1);
    s.record_training(TrainingKind::Repeat, false, today);

    assert_eq!(s.stage, LearningStage::Stage3);
    assert_eq!(s.status, WordStatus::IsLearning);
    assert_eq!(s.next_train_date, date(2024, 5, 8));
    assert_eq!(s.total_train_count, 1);
  }

  #[test]
  fn new_training_starts_learning_regardless_of_success() {
    for success in [true, false] {
      let mut s = schedule_at(LearningStage::Stage1, WordStatus::New);
      s.record_training(TrainingKind::New, success, date(2024, 5, 1));

      assert_eq!(s.status, WordStatus::IsLearning);
      assert_eq!(s.stage, LearningStage::Stage1);
      assert_eq!(s.next_train_date, date(2024, 5, 2));
    }
  }

  #[test]
  fn due_requires_strictly_earlier_date_and_non_new_status() {
    let today = date(2024, 5, 10);
    let mut s = schedule_at(LearningStage::Stage1, WordStatus::IsLearning);

    s.next_train_date = date(2024, 5, 9);
    assert!(s.is_due(today));
    s.next_train_date = today;
    assert!(!s.is_due(today));

    s.next_train_date = date(2024, 5, 1);
    s.status = WordStatus::New;
    assert!(!s.is_due(today));
  }
}
