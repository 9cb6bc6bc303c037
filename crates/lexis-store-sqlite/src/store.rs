//! [`SqliteStore`], the SQLite implementation of [`TrainingStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use lexis_core::{
  dictionary::{Dictionary, DueDictionary, NewDictionary, NewWord, Word, WordEdit},
  schedule::{LearningStage, Schedule, WordStatus},
  store::{ScheduleQuery, Selection, TrainingStore},
  training::{ExtendedResult, NewTraining, Training, TrainingLimits, TrainingResult},
};

use crate::{
  Result,
  encode::{
    DICTIONARY_COLUMNS, RawDictionary, RawExtendedResult, RawSchedule, RawTraining, RawWord,
    SCHEDULE_COLUMNS, WORD_COLUMNS, decode_uuid, encode_date, encode_dt, encode_kind,
    encode_stage, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Lexis training store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

/// Load a training row and its ordered word batch.
fn load_training(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawTraining>> {
  let head = conn
    .query_row(
      "SELECT training_id, dictionary_id, kind, trained_on, created_at, scheduled_on
       FROM trainings WHERE training_id = ?1",
      rusqlite::params![id_str],
      |row| {
        Ok(RawTraining {
          training_id:   row.get(0)?,
          dictionary_id: row.get(1)?,
          kind:          row.get(2)?,
          trained_on:    row.get(3)?,
          created_at:    row.get(4)?,
          scheduled_on:  row.get(5)?,
          words:         Vec::new(),
        })
      },
    )
    .optional()?;

  let Some(mut raw) = head else { return Ok(None) };

  let mut stmt = conn.prepare(&format!(
    "SELECT {WORD_COLUMNS}
     FROM training_words tw
     JOIN words w ON w.word_id = tw.word_id
     WHERE tw.training_id = ?1
     ORDER BY tw.position"
  ))?;
  raw.words = stmt
    .query_map(rusqlite::params![id_str], RawWord::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some(raw))
}

// ─── TrainingStore impl ──────────────────────────────────────────────────────

impl TrainingStore for SqliteStore {
  type Error = crate::Error;

  // ── Dictionaries ──────────────────────────────────────────────────────────

  async fn add_dictionary(&self, input: NewDictionary) -> Result<Dictionary> {
    let dictionary = Dictionary {
      dictionary_id: Uuid::new_v4(),
      owner:         input.owner,
      name:          input.name,
      description:   input.description,
      created_at:    Utc::now(),
    };

    let id_str      = encode_uuid(dictionary.dictionary_id);
    let owner       = dictionary.owner.clone();
    let name        = dictionary.name.clone();
    let description = dictionary.description.clone();
    let at_str      = encode_dt(dictionary.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO dictionaries (dictionary_id, owner, name, description, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, owner, name, description, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(dictionary)
  }

  async fn get_dictionary(&self, id: Uuid) -> Result<Option<Dictionary>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDictionary> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DICTIONARY_COLUMNS} FROM dictionaries WHERE dictionary_id = ?1"),
              rusqlite::params![id_str],
              RawDictionary::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDictionary::into_dictionary).transpose()
  }

  async fn list_dictionaries(&self, owner: Option<String>) -> Result<Vec<Dictionary>> {
    let raws: Vec<RawDictionary> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(owner) = owner {
          let mut stmt = conn.prepare(&format!(
            "SELECT {DICTIONARY_COLUMNS} FROM dictionaries WHERE owner = ?1 ORDER BY rowid"
          ))?;
          stmt
            .query_map(rusqlite::params![owner], RawDictionary::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {DICTIONARY_COLUMNS} FROM dictionaries ORDER BY rowid"
          ))?;
          stmt
            .query_map([], RawDictionary::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDictionary::into_dictionary).collect()
  }

  // ── Words ─────────────────────────────────────────────────────────────────

  async fn add_word(&self, input: NewWord) -> Result<(Word, Schedule)> {
    let word = Word {
      word_id:       Uuid::new_v4(),
      dictionary_id: input.dictionary_id,
      name:          input.name,
      translation:   input.translation,
      context:       input.context,
      example:       input.example,
      added_on:      input.added_on,
    };
    let schedule = Schedule::new(word.word_id, word.dictionary_id, word.added_on);

    let word_id_str = encode_uuid(word.word_id);
    let dict_id_str = encode_uuid(word.dictionary_id);
    let name        = word.name.clone();
    let translation = word.translation.clone();
    let context     = word.context.clone();
    let example     = word.example.clone();
    let added_str   = encode_date(word.added_on);
    let raw_sched   = RawSchedule::encode(&schedule);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO words (
             word_id, dictionary_id, name, translation, context, example, added_on
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            word_id_str, dict_id_str, name, translation, context, example, added_str,
          ],
        )?;
        raw_sched.upsert(&tx)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok((word, schedule))
  }

  async fn get_word(&self, id: Uuid) -> Result<Option<Word>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawWord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {WORD_COLUMNS} FROM words w WHERE w.word_id = ?1"),
              rusqlite::params![id_str],
              RawWord::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawWord::into_word).transpose()
  }

  async fn update_word(&self, id: Uuid, edit: WordEdit) -> Result<Option<Word>> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE words SET translation = ?2, context = ?3, example = ?4 WHERE word_id = ?1",
          rusqlite::params![id_str, edit.translation, edit.context, edit.example],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_word(id).await
  }

  async fn list_words(&self, dictionary_id: Uuid) -> Result<Vec<Word>> {
    let dict_id_str = encode_uuid(dictionary_id);

    let raws: Vec<RawWord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {WORD_COLUMNS} FROM words w WHERE w.dictionary_id = ?1 ORDER BY w.rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![dict_id_str], RawWord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWord::into_word).collect()
  }

  // ── Schedules ─────────────────────────────────────────────────────────────

  async fn get_schedule(&self, word_id: Uuid) -> Result<Option<Schedule>> {
    let id_str = encode_uuid(word_id);

    let raw: Option<RawSchedule> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE word_id = ?1"),
              rusqlite::params![id_str],
              RawSchedule::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSchedule::into_schedule).transpose()
  }

  async fn list_schedules(&self, dictionary_id: Uuid) -> Result<Vec<Schedule>> {
    let dict_id_str = encode_uuid(dictionary_id);

    let raws: Vec<RawSchedule> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SCHEDULE_COLUMNS} FROM schedules
           WHERE dictionary_id = ?1
           ORDER BY next_train_date, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![dict_id_str], RawSchedule::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSchedule::into_schedule).collect()
  }

  async fn select_words(&self, query: ScheduleQuery) -> Result<Vec<Word>> {
    let dict_id_str = encode_uuid(query.dictionary_id);
    let new_str     = encode_status(WordStatus::New);
    // SQLite treats a negative LIMIT as "no limit".
    let limit_val   = query
      .limit
      .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
      .unwrap_or(-1);

    let (condition, before_str) = match query.selection {
      Selection::New => ("s.status = ?2", None),
      Selection::Due { before } => (
        "s.status <> ?2 AND s.next_train_date < ?3",
        Some(encode_date(before)),
      ),
    };

    let raws: Vec<RawWord> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {WORD_COLUMNS}
           FROM schedules s
           JOIN words w ON w.word_id = s.word_id
           WHERE s.dictionary_id = ?1 AND {condition}
           ORDER BY s.next_train_date, w.rowid
           LIMIT ?4"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![dict_id_str, new_str, before_str, limit_val],
            RawWord::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWord::into_word).collect()
  }

  async fn save_schedule(&self, schedule: Schedule) -> Result<()> {
    let raw = RawSchedule::encode(&schedule);
    self
      .conn
      .call(move |conn| {
        raw.upsert(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn backfill_schedules(&self, created_on: NaiveDate) -> Result<usize> {
    let date_str  = encode_date(created_on);
    let new_str   = encode_status(WordStatus::New);
    let stage_str = encode_stage(LearningStage::default());

    let created = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO schedules (
             word_id, dictionary_id, status, stage, total_train_count, next_train_date
           )
           SELECT w.word_id, w.dictionary_id, ?2, ?3, 0, ?1
           FROM words w
           WHERE NOT EXISTS (SELECT 1 FROM schedules s WHERE s.word_id = w.word_id)
           ORDER BY w.rowid",
          rusqlite::params![date_str, new_str, stage_str],
        )?)
      })
      .await?;

    Ok(created)
  }

  // ── Trainings ─────────────────────────────────────────────────────────────

  async fn add_training(&self, input: NewTraining) -> Result<Training> {
    let training = Training {
      training_id:   Uuid::new_v4(),
      dictionary_id: input.dictionary_id,
      kind:          input.kind,
      words:         input.words,
      trained_on:    input.trained_on,
      created_at:    Utc::now(),
      scheduled_on:  None,
    };

    let id_str      = encode_uuid(training.training_id);
    let dict_id_str = encode_uuid(training.dictionary_id);
    let kind_str    = encode_kind(training.kind);
    let on_str      = encode_date(training.trained_on);
    let at_str      = encode_dt(training.created_at);
    let word_ids: Vec<String> =
      training.words.iter().map(|w| encode_uuid(w.word_id)).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO trainings (training_id, dictionary_id, kind, trained_on, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, dict_id_str, kind_str, on_str, at_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO training_words (training_id, position, word_id) VALUES (?1, ?2, ?3)",
          )?;
          for (position, word_id) in word_ids.iter().enumerate() {
            stmt.execute(rusqlite::params![id_str, position as i64, word_id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(training)
  }

  async fn get_training(&self, id: Uuid) -> Result<Option<Training>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTraining> = self
      .conn
      .call(move |conn| Ok(load_training(conn, &id_str)?))
      .await?;

    raw.map(RawTraining::into_training).transpose()
  }

  async fn save_results(&self, results: Vec<TrainingResult>) -> Result<()> {
    let rows: Vec<(String, String, bool)> = results
      .iter()
      .map(|r| (encode_uuid(r.training_id), encode_uuid(r.word_id), r.success))
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO results (training_id, word_id, success) VALUES (?1, ?2, ?3)
             ON CONFLICT (training_id, word_id) DO UPDATE SET success = excluded.success",
          )?;
          for (training_id, word_id, success) in &rows {
            stmt.execute(rusqlite::params![training_id, word_id, success])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn list_results(&self, training_id: Uuid) -> Result<Vec<TrainingResult>> {
    let id_str = encode_uuid(training_id);

    let raws: Vec<(String, bool)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT word_id, success FROM results WHERE training_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(word_id, success)| {
        Ok(TrainingResult {
          training_id,
          word_id: decode_uuid(&word_id)?,
          success,
        })
      })
      .collect()
  }

  async fn commit_schedules(
    &self,
    training_id:  Uuid,
    scheduled_on: NaiveDate,
    schedules:    Vec<Schedule>,
  ) -> Result<bool> {
    let id_str = encode_uuid(training_id);
    let on_str = encode_date(scheduled_on);
    let raws: Vec<RawSchedule> = schedules.iter().map(RawSchedule::encode).collect();

    let committed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let claimed = tx.execute(
          "UPDATE trainings SET scheduled_on = ?2
           WHERE training_id = ?1 AND scheduled_on IS NULL",
          rusqlite::params![id_str, on_str],
        )?;
        if claimed == 0 {
          // Dropping the transaction rolls it back.
          return Ok(false);
        }
        for raw in &raws {
          raw.upsert(&tx)?;
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(committed)
  }

  async fn extended_results(&self, training_id: Uuid) -> Result<Vec<ExtendedResult>> {
    let id_str = encode_uuid(training_id);

    let raws: Vec<RawExtendedResult> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT w.name, w.translation, r.success, s.status, s.next_train_date
           FROM results r
           JOIN training_words tw ON tw.training_id = r.training_id AND tw.word_id = r.word_id
           JOIN words w           ON w.word_id = r.word_id
           JOIN schedules s       ON s.word_id = r.word_id
           WHERE r.training_id = ?1
           ORDER BY s.next_train_date, tw.position",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawExtendedResult {
              word:            row.get(0)?,
              translation:     row.get(1)?,
              success:         row.get(2)?,
              status:          row.get(3)?,
              next_train_date: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExtendedResult::into_result).collect()
  }

  // ── Settings and summaries ────────────────────────────────────────────────

  async fn get_limits(&self, owner: String) -> Result<Option<TrainingLimits>> {
    let raw: Option<(i64, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT new_words_in_train, repeat_words_in_train FROM settings WHERE owner = ?1",
              rusqlite::params![owner],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(|(new_words, repeat_words)| TrainingLimits {
      new_words_in_train:    usize::try_from(new_words).unwrap_or(0),
      repeat_words_in_train: usize::try_from(repeat_words).unwrap_or(0),
    }))
  }

  async fn set_limits(&self, owner: String, limits: TrainingLimits) -> Result<()> {
    let new_words    = i64::try_from(limits.new_words_in_train).unwrap_or(i64::MAX);
    let repeat_words = i64::try_from(limits.repeat_words_in_train).unwrap_or(i64::MAX);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO settings (owner, new_words_in_train, repeat_words_in_train)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (owner) DO UPDATE SET
             new_words_in_train    = excluded.new_words_in_train,
             repeat_words_in_train = excluded.repeat_words_in_train",
          rusqlite::params![owner, new_words, repeat_words],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn due_dictionaries(&self, owner: String, before: NaiveDate) -> Result<Vec<DueDictionary>> {
    let before_str = encode_date(before);
    let new_str    = encode_status(WordStatus::New);

    let raws: Vec<(String, String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT d.dictionary_id, d.name, COUNT(*)
           FROM dictionaries d
           JOIN schedules s ON s.dictionary_id = d.dictionary_id
           WHERE d.owner = ?1 AND s.status <> ?3 AND s.next_train_date < ?2
           GROUP BY d.dictionary_id, d.name
           ORDER BY d.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner, before_str, new_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(id, name, count)| {
        Ok(DueDictionary {
          dictionary_id: decode_uuid(&id)?,
          name,
          words_count: u64::try_from(count).unwrap_or(0),
        })
      })
      .collect()
  }
}
