//! [`Trainer`]: the service that runs trainings and forms schedules.
//!
//! A trainer wraps a [`TrainingStore`] and a [`Clock`] and keeps one
//! [`TrainingSession`] per active training. Sessions are looked up by training
//! id on every call; nothing about one user's progress is visible to another.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  clock::Clock,
  dictionary::{Dictionary, DueDictionary, NewDictionary, NewWord, Word, WordEdit},
  schedule::Schedule,
  session::TrainingSession,
  store::{ScheduleQuery, Selection, TrainingStore},
  training::{
    ExtendedResult, NewTraining, Training, TrainingKind, TrainingLimits,
    TrainingStats,
  },
};

/// What the user should see after asking for the next (or previous) word.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Step {
  Word {
    word:     Word,
    /// Preview of the word before the cursor, if any.
    previous: Option<Word>,
    stats:    TrainingStats,
  },
  /// Every word has a result; the schedule has been formed.
  Completed { results: Vec<ExtendedResult> },
}

pub struct Trainer<S> {
  store:          Arc<S>,
  clock:          Arc<dyn Clock>,
  default_limits: TrainingLimits,
  sessions:       Mutex<HashMap<Uuid, TrainingSession>>,
}

impl<S: TrainingStore> Trainer<S> {
  pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, default_limits: TrainingLimits) -> Self {
    Self {
      store,
      clock,
      default_limits,
      sessions: Mutex::new(HashMap::new()),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn today(&self) -> chrono::NaiveDate { self.clock.today() }

  // ── Dictionaries and words ────────────────────────────────────────────

  pub async fn add_dictionary(&self, input: NewDictionary) -> Result<Dictionary> {
    let dictionary = self.store.add_dictionary(input).await.map_err(Error::store)?;
    info!(dictionary_id = %dictionary.dictionary_id, owner = %dictionary.owner, "dictionary created");
    Ok(dictionary)
  }

  pub async fn dictionary(&self, id: Uuid) -> Result<Dictionary> {
    self
      .store
      .get_dictionary(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::DictionaryNotFound(id))
  }

  pub async fn list_dictionaries(&self, owner: Option<String>) -> Result<Vec<Dictionary>> {
    self.store.list_dictionaries(owner).await.map_err(Error::store)
  }

  /// Add a word and its initial schedule to an existing dictionary.
  pub async fn add_word(&self, input: NewWord) -> Result<Word> {
    self.dictionary(input.dictionary_id).await?;
    let (word, _schedule) = self.store.add_word(input).await.map_err(Error::store)?;
    debug!(word_id = %word.word_id, dictionary_id = %word.dictionary_id, "word added");
    Ok(word)
  }

  pub async fn word(&self, id: Uuid) -> Result<Word> {
    self
      .store
      .get_word(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::WordNotFound(id))
  }

  pub async fn edit_word(&self, id: Uuid, edit: WordEdit) -> Result<Word> {
    self
      .store
      .update_word(id, edit)
      .await
      .map_err(Error::store)?
      .ok_or(Error::WordNotFound(id))
  }

  pub async fn list_words(&self, dictionary_id: Uuid) -> Result<Vec<Word>> {
    self.dictionary(dictionary_id).await?;
    self.store.list_words(dictionary_id).await.map_err(Error::store)
  }

  /// Give every word without a schedule a fresh `NEW` one.
  pub async fn backfill_schedules(&self) -> Result<usize> {
    let created = self
      .store
      .backfill_schedules(self.today())
      .await
      .map_err(Error::store)?;
    if created > 0 {
      info!(created, "backfilled missing schedules");
    }
    Ok(created)
  }

  /// Dictionaries of `owner` with words due for repetition today.
  pub async fn due_dictionaries(&self, owner: String) -> Result<Vec<DueDictionary>> {
    self
      .store
      .due_dictionaries(owner, self.today())
      .await
      .map_err(Error::store)
  }

  // ── Settings ──────────────────────────────────────────────────────────

  /// The owner's saved limits, or the trainer-wide default.
  pub async fn limits_for(&self, owner: String) -> Result<TrainingLimits> {
    Ok(
      self
        .store
        .get_limits(owner)
        .await
        .map_err(Error::store)?
        .unwrap_or(self.default_limits),
    )
  }

  pub async fn set_limits(&self, owner: String, limits: TrainingLimits) -> Result<()> {
    self.store.set_limits(owner, limits).await.map_err(Error::store)
  }

  // ── Starting trainings ────────────────────────────────────────────────

  /// Start a training over the dictionary's `NEW` words.
  pub async fn new_training(&self, dictionary_id: Uuid) -> Result<Training> {
    self.start_training(dictionary_id, TrainingKind::New).await
  }

  /// Start a training over the dictionary's words due for repetition.
  pub async fn repeat_training(&self, dictionary_id: Uuid) -> Result<Training> {
    self.start_training(dictionary_id, TrainingKind::Repeat).await
  }

  pub async fn start_training(&self, dictionary_id: Uuid, kind: TrainingKind) -> Result<Training> {
    let dictionary = self.dictionary(dictionary_id).await?;
    let limits = self.limits_for(dictionary.owner).await?;
    let today = self.today();

    let selection = match kind {
      TrainingKind::New => Selection::New,
      TrainingKind::Repeat => Selection::Due { before: today },
    };
    let words = self
      .store
      .select_words(ScheduleQuery {
        dictionary_id,
        selection,
        limit: Some(limits.for_kind(kind)),
      })
      .await
      .map_err(Error::store)?;

    let training = self
      .store
      .add_training(NewTraining {
        dictionary_id,
        kind,
        words,
        trained_on: today,
      })
      .await
      .map_err(Error::store)?;

    self
      .sessions
      .lock()
      .insert(training.training_id, TrainingSession::new(&training));

    info!(
      training_id = %training.training_id,
      %dictionary_id,
      ?kind,
      words = training.words.len(),
      "training started"
    );
    Ok(training)
  }

  pub async fn training(&self, id: Uuid) -> Result<Training> {
    self
      .store
      .get_training(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::TrainingNotFound(id))
  }

  // ── Session cursor ────────────────────────────────────────────────────

  fn with_session<R>(
    &self,
    training_id: Uuid,
    f: impl FnOnce(&mut TrainingSession) -> R,
  ) -> Result<R> {
    let mut sessions = self.sessions.lock();
    let session = sessions
      .get_mut(&training_id)
      .ok_or(Error::SessionNotFound(training_id))?;
    Ok(f(session))
  }

  pub fn has_session(&self, training_id: Uuid) -> bool {
    self.sessions.lock().contains_key(&training_id)
  }

  pub fn next_word(&self, training_id: Uuid) -> Result<Option<Word>> {
    self.with_session(training_id, |s| s.next_word().cloned())
  }

  /// See [`TrainingSession::previous_word`].
  pub fn previous_word(&self, training_id: Uuid, navigate: bool) -> Result<Option<Word>> {
    self.with_session(training_id, |s| s.previous_word(navigate).cloned())
  }

  pub fn save_word_result(
    &self,
    training_id: Uuid,
    word_id: Uuid,
    success: bool,
  ) -> Result<TrainingStats> {
    let stats = self
      .with_session(training_id, |s| s.record_result(word_id, success))
      .and_then(|r| r);
    match &stats {
      Ok(_) => debug!(%training_id, %word_id, success, "word result recorded"),
      Err(e) => warn!(%training_id, %word_id, error = %e, "word result rejected"),
    }
    stats
  }

  pub fn is_training_completed(&self, training_id: Uuid) -> Result<bool> {
    self.with_session(training_id, |s| s.is_complete())
  }

  pub fn stats(&self, training_id: Uuid) -> Result<TrainingStats> {
    self.with_session(training_id, |s| s.stats())
  }

  /// Advance the session the way the training screen does: show the next
  /// word (or step back), and once nothing is left, finish the training.
  pub async fn step(&self, training_id: Uuid, previous: bool) -> Result<Step> {
    let training = self.training(training_id).await?;
    if training.scheduled_on.is_some() && !self.has_session(training_id) {
      return Ok(Step::Completed {
        results: self.extended_results(training_id).await?,
      });
    }

    let shown = self.with_session(training_id, |s| {
      let word = if previous {
        // Stepping back from the first word stays on it.
        let back = s.previous_word(true).cloned();
        back.or_else(|| s.current_word().cloned())
      } else {
        s.next_word().cloned()
      };
      word.map(|w| (w, s.previous_word(false).cloned(), s.stats()))
    })?;

    match shown {
      Some((word, previous, stats)) => Ok(Step::Word { word, previous, stats }),
      None => Ok(Step::Completed {
        results: self.finish_training(training_id).await?,
      }),
    }
  }

  // ── Completion ────────────────────────────────────────────────────────

  /// Persist the session's recorded outcomes.
  pub async fn save_train_results(&self, training_id: Uuid) -> Result<()> {
    let results = self.with_session(training_id, |s| s.results())?;
    let count = results.len();
    self.store.save_results(results).await.map_err(Error::store)?;
    debug!(%training_id, count, "training results saved");
    Ok(())
  }

  /// Fold the results of a training into the schedules of its words.
  ///
  /// Outcomes recorded in an open session are saved first, so the schedule
  /// never misses them. Every schedule update commits together or not at all.
  /// Returns the number of schedules written.
  pub async fn form_schedule(&self, training_id: Uuid) -> Result<usize> {
    let training = self.training(training_id).await?;
    if training.scheduled_on.is_some() {
      return Err(Error::AlreadyScheduled(training_id));
    }

    if let Ok(pending) = self.with_session(training_id, |s| s.results())
      && !pending.is_empty()
    {
      self.store.save_results(pending).await.map_err(Error::store)?;
    }

    let results = self
      .store
      .list_results(training_id)
      .await
      .map_err(Error::store)?;

    let mut schedules = Vec::with_capacity(results.len());
    for result in results {
      let mut schedule = match self
        .store
        .get_schedule(result.word_id)
        .await
        .map_err(Error::store)?
      {
        Some(s) => s,
        None => Schedule::new(result.word_id, training.dictionary_id, training.trained_on),
      };
      schedule.record_training(training.kind, result.success, training.trained_on);
      schedules.push(schedule);
    }

    let count = schedules.len();
    let committed = self
      .store
      .commit_schedules(training_id, self.today(), schedules)
      .await
      .map_err(Error::store)?;
    if !committed {
      return Err(Error::AlreadyScheduled(training_id));
    }

    info!(%training_id, schedules = count, "schedule formed");
    Ok(count)
  }

  pub async fn extended_results(&self, training_id: Uuid) -> Result<Vec<ExtendedResult>> {
    self.training(training_id).await?;
    self
      .store
      .extended_results(training_id)
      .await
      .map_err(Error::store)
  }

  /// Save results, form the schedule and close the session.
  ///
  /// On failure the session stays open so the call can be retried. A schedule
  /// formed earlier is final: the session is closed and its results reported.
  pub async fn finish_training(&self, training_id: Uuid) -> Result<Vec<ExtendedResult>> {
    match self.form_schedule(training_id).await {
      Ok(_) => {}
      Err(Error::AlreadyScheduled(_)) => {
        warn!(%training_id, "schedule already formed, closing session");
      }
      Err(e) => return Err(e),
    }
    self.sessions.lock().remove(&training_id);
    info!(%training_id, "training finished");
    self.extended_results(training_id).await
  }
}
