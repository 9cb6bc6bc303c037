//! Error types for `lexis-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("dictionary not found: {0}")]
  DictionaryNotFound(Uuid),

  #[error("word not found: {0}")]
  WordNotFound(Uuid),

  #[error("training not found: {0}")]
  TrainingNotFound(Uuid),

  /// The training exists but no session is open for it (never started in
  /// this process, or already finished).
  #[error("no active session for training {0}")]
  SessionNotFound(Uuid),

  #[error("word {word_id} is not part of training {training_id}")]
  WordNotInTraining { training_id: Uuid, word_id: Uuid },

  #[error("schedule for training {0} has already been formed")]
  AlreadyScheduled(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from a [`crate::store::TrainingStore`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::DictionaryNotFound(_)
        | Self::WordNotFound(_)
        | Self::TrainingNotFound(_)
        | Self::SessionNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
