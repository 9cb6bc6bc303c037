//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`, so lexical order in SQL is chronological order. Enums are
//! stored under their wire names. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, NaiveDate, Utc};
use lexis_core::{
  dictionary::{Dictionary, Word},
  schedule::{LearningStage, Schedule, WordStatus},
  training::{ExtendedResult, Training, TrainingKind},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── WordStatus ───────────────────────────────────────────────────────────────

pub fn encode_status(s: WordStatus) -> &'static str {
  match s {
    WordStatus::New => "NEW",
    WordStatus::IsLearning => "IS_LEARNING",
    WordStatus::Learnt => "LEARNT",
  }
}

pub fn decode_status(s: &str) -> Result<WordStatus> {
  match s {
    "NEW" => Ok(WordStatus::New),
    "IS_LEARNING" => Ok(WordStatus::IsLearning),
    "LEARNT" => Ok(WordStatus::Learnt),
    other => Err(Error::UnknownValue { column: "status", value: other.to_owned() }),
  }
}

// ─── LearningStage ────────────────────────────────────────────────────────────

pub fn encode_stage(s: LearningStage) -> String { format!("STAGE{}", s.index() + 1) }

pub fn decode_stage(s: &str) -> Result<LearningStage> {
  s.strip_prefix("STAGE")
    .and_then(|n| n.parse::<usize>().ok())
    .and_then(|n| n.checked_sub(1))
    .and_then(LearningStage::from_index)
    .ok_or_else(|| Error::UnknownValue { column: "stage", value: s.to_owned() })
}

// ─── TrainingKind ─────────────────────────────────────────────────────────────

pub fn encode_kind(k: TrainingKind) -> &'static str {
  match k {
    TrainingKind::New => "new",
    TrainingKind::Repeat => "repeat",
  }
}

pub fn decode_kind(s: &str) -> Result<TrainingKind> {
  match s {
    "new" => Ok(TrainingKind::New),
    "repeat" => Ok(TrainingKind::Repeat),
    other => Err(Error::UnknownValue { column: "kind", value: other.to_owned() }),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawDictionary::from_row`].
pub const DICTIONARY_COLUMNS: &str = "dictionary_id, owner, name, description, created_at";

/// Raw strings read directly from a `dictionaries` row.
pub struct RawDictionary {
  pub dictionary_id: String,
  pub owner:         String,
  pub name:          String,
  pub description:   Option<String>,
  pub created_at:    String,
}

impl RawDictionary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      dictionary_id: row.get(0)?,
      owner:         row.get(1)?,
      name:          row.get(2)?,
      description:   row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_dictionary(self) -> Result<Dictionary> {
    Ok(Dictionary {
      dictionary_id: decode_uuid(&self.dictionary_id)?,
      owner:         self.owner,
      name:          self.name,
      description:   self.description,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawWord::from_row`], qualified with the `w` alias.
pub const WORD_COLUMNS: &str =
  "w.word_id, w.dictionary_id, w.name, w.translation, w.context, w.example, w.added_on";

/// Raw strings read directly from a `words` row.
pub struct RawWord {
  pub word_id:       String,
  pub dictionary_id: String,
  pub name:          String,
  pub translation:   String,
  pub context:       Option<String>,
  pub example:       Option<String>,
  pub added_on:      String,
}

impl RawWord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      word_id:       row.get(0)?,
      dictionary_id: row.get(1)?,
      name:          row.get(2)?,
      translation:   row.get(3)?,
      context:       row.get(4)?,
      example:       row.get(5)?,
      added_on:      row.get(6)?,
    })
  }

  pub fn into_word(self) -> Result<Word> {
    Ok(Word {
      word_id:       decode_uuid(&self.word_id)?,
      dictionary_id: decode_uuid(&self.dictionary_id)?,
      name:          self.name,
      translation:   self.translation,
      context:       self.context,
      example:       self.example,
      added_on:      decode_date(&self.added_on)?,
    })
  }
}

/// Column list matching [`RawSchedule::from_row`].
pub const SCHEDULE_COLUMNS: &str = "word_id, dictionary_id, status, stage, total_train_count, \
   last_train_date, next_train_date, learnt_date";

/// A `schedules` row, as read or about to be written.
pub struct RawSchedule {
  pub word_id:           String,
  pub dictionary_id:     String,
  pub status:            String,
  pub stage:             String,
  pub total_train_count: i64,
  pub last_train_date:   Option<String>,
  pub next_train_date:   String,
  pub learnt_date:       Option<String>,
}

impl RawSchedule {
  pub fn encode(s: &Schedule) -> Self {
    Self {
      word_id:           encode_uuid(s.word_id),
      dictionary_id:     encode_uuid(s.dictionary_id),
      status:            encode_status(s.status).to_owned(),
      stage:             encode_stage(s.stage),
      total_train_count: i64::from(s.total_train_count),
      last_train_date:   s.last_train_date.map(encode_date),
      next_train_date:   encode_date(s.next_train_date),
      learnt_date:       s.learnt_date.map(encode_date),
    }
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      word_id:           row.get(0)?,
      dictionary_id:     row.get(1)?,
      status:            row.get(2)?,
      stage:             row.get(3)?,
      total_train_count: row.get(4)?,
      last_train_date:   row.get(5)?,
      next_train_date:   row.get(6)?,
      learnt_date:       row.get(7)?,
    })
  }

  pub fn into_schedule(self) -> Result<Schedule> {
    Ok(Schedule {
      word_id:           decode_uuid(&self.word_id)?,
      dictionary_id:     decode_uuid(&self.dictionary_id)?,
      status:            decode_status(&self.status)?,
      stage:             decode_stage(&self.stage)?,
      total_train_count: u32::try_from(self.total_train_count).unwrap_or(u32::MAX),
      last_train_date:   decode_opt_date(self.last_train_date)?,
      next_train_date:   decode_date(&self.next_train_date)?,
      learnt_date:       decode_opt_date(self.learnt_date)?,
    })
  }

  /// Insert the row, or overwrite the mutable columns of an existing one.
  /// The rowid of an existing row is preserved.
  pub fn upsert(&self, conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute(
      "INSERT INTO schedules (
         word_id, dictionary_id, status, stage, total_train_count,
         last_train_date, next_train_date, learnt_date
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
       ON CONFLICT (word_id) DO UPDATE SET
         status            = excluded.status,
         stage             = excluded.stage,
         total_train_count = excluded.total_train_count,
         last_train_date   = excluded.last_train_date,
         next_train_date   = excluded.next_train_date,
         learnt_date       = excluded.learnt_date",
      rusqlite::params![
        self.word_id,
        self.dictionary_id,
        self.status,
        self.stage,
        self.total_train_count,
        self.last_train_date,
        self.next_train_date,
        self.learnt_date,
      ],
    )?;
    Ok(())
  }
}

/// Raw strings read from a `trainings` row plus its ordered word batch.
pub struct RawTraining {
  pub training_id:   String,
  pub dictionary_id: String,
  pub kind:          String,
  pub trained_on:    String,
  pub created_at:    String,
  pub scheduled_on:  Option<String>,
  pub words:         Vec<RawWord>,
}

impl RawTraining {
  pub fn into_training(self) -> Result<Training> {
    Ok(Training {
      training_id:   decode_uuid(&self.training_id)?,
      dictionary_id: decode_uuid(&self.dictionary_id)?,
      kind:          decode_kind(&self.kind)?,
      words:         self
        .words
        .into_iter()
        .map(RawWord::into_word)
        .collect::<Result<_>>()?,
      trained_on:    decode_date(&self.trained_on)?,
      created_at:    decode_dt(&self.created_at)?,
      scheduled_on:  decode_opt_date(self.scheduled_on)?,
    })
  }
}

/// Raw values read from the extended-results join.
pub struct RawExtendedResult {
  pub word:            String,
  pub translation:     String,
  pub success:         bool,
  pub status:          String,
  pub next_train_date: String,
}

impl RawExtendedResult {
  pub fn into_result(self) -> Result<ExtendedResult> {
    Ok(ExtendedResult {
      word:            self.word,
      translation:     self.translation,
      success:         self.success,
      status:          decode_status(&self.status)?,
      next_train_date: decode_date(&self.next_train_date)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stage_names_roundtrip() {
    for stage in LearningStage::ALL {
      assert_eq!(decode_stage(&encode_stage(stage)).unwrap(), stage);
    }
    assert_eq!(encode_stage(LearningStage::Stage3), "STAGE3");
  }

  #[test]
  fn bad_stage_names_are_rejected() {
    for bad in ["STAGE0", "STAGE7", "stage1", "STAGE", ""] {
      assert!(
        matches!(decode_stage(bad), Err(Error::UnknownValue { column: "stage", .. })),
        "{bad:?} should not decode"
      );
    }
  }

  #[test]
  fn dates_sort_lexically() {
    let a = encode_date(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap());
    let b = encode_date(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
    assert!(a < b, "{a} !< {b}");
    assert_eq!(decode_date(&b).unwrap(), NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
  }
}
