//! Handlers for training endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/dictionaries/:id/trainings` | Body: `{"kind":"new"}`; returns 201 |
//! | `GET`  | `/trainings/:id` | Stored training with its word batch |
//! | `GET`  | `/trainings/:id/word` | `?previous=true` steps back; returns a [`Step`] |
//! | `POST` | `/trainings/:id/words/:word_id/answer` | Body: `{"success":true}` |
//! | `GET`  | `/trainings/:id/stats` | Active sessions only |
//! | `GET`  | `/trainings/:id/results` | Extended results |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use lexis_core::{
  store::TrainingStore,
  trainer::{Step, Trainer},
  training::{ExtendedResult, Training, TrainingKind, TrainingStats},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Start ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartBody {
  pub kind: TrainingKind,
}

/// `POST /dictionaries/:id/trainings`: selects the batch and opens a session.
/// An empty batch is not an error.
pub async fn start<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(dictionary_id): Path<Uuid>,
  Json(body): Json<StartBody>,
) -> Result<impl IntoResponse, ApiError> {
  let training = trainer.start_training(dictionary_id, body.kind).await?;
  Ok((StatusCode::CREATED, Json(training)))
}

/// `GET /trainings/:id`
pub async fn get_one<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Training>, ApiError> {
  Ok(Json(trainer.training(id).await?))
}

// ─── Step ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct StepParams {
  #[serde(default)]
  pub previous: bool,
}

/// `GET /trainings/:id/word[?previous=true]`
///
/// Once every word has a result this finishes the training and returns the
/// extended results instead of a word.
pub async fn step<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(id): Path<Uuid>,
  Query(params): Query<StepParams>,
) -> Result<Json<Step>, ApiError> {
  Ok(Json(trainer.step(id, params.previous).await?))
}

// ─── Answer ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerBody {
  pub success: bool,
}

/// `POST /trainings/:id/words/:word_id/answer`: answering the same word again
/// overwrites the earlier outcome.
pub async fn answer<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path((id, word_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<AnswerBody>,
) -> Result<Json<TrainingStats>, ApiError> {
  Ok(Json(trainer.save_word_result(id, word_id, body.success)?))
}

/// `GET /trainings/:id/stats`
pub async fn stats<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<TrainingStats>, ApiError> {
  Ok(Json(trainer.stats(id)?))
}

/// `GET /trainings/:id/results`
pub async fn results<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ExtendedResult>>, ApiError> {
  Ok(Json(trainer.extended_results(id).await?))
}
