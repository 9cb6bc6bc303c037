//! Handlers for word endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dictionaries/:id/words` | Insertion order |
//! | `POST` | `/dictionaries/:id/words` | Body: [`NewWordBody`]; returns 201 |
//! | `GET`  | `/words/:id` | 404 if not found |
//! | `PUT`  | `/words/:id` | Body: [`WordEdit`] |
//! | `POST` | `/schedules/backfill` | Returns `{"created": n}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use lexis_core::{
  dictionary::{NewWord, Word, WordEdit},
  store::TrainingStore,
  trainer::Trainer,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{ApiError, require};

/// `GET /dictionaries/:id/words`
pub async fn list<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(dictionary_id): Path<Uuid>,
) -> Result<Json<Vec<Word>>, ApiError> {
  Ok(Json(trainer.list_words(dictionary_id).await?))
}

/// JSON body accepted by `POST /dictionaries/:id/words`.
#[derive(Debug, Deserialize)]
pub struct NewWordBody {
  pub name:        String,
  pub translation: String,
  pub context:     Option<String>,
  pub example:     Option<String>,
  /// Defaults to today.
  pub added_on:    Option<NaiveDate>,
}

/// `POST /dictionaries/:id/words`: the word starts with a `NEW` schedule.
pub async fn create<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(dictionary_id): Path<Uuid>,
  Json(body): Json<NewWordBody>,
) -> Result<impl IntoResponse, ApiError> {
  require("name", &body.name)?;
  require("translation", &body.translation)?;

  let word = trainer
    .add_word(NewWord {
      dictionary_id,
      name:        body.name,
      translation: body.translation,
      context:     body.context,
      example:     body.example,
      added_on:    body.added_on.unwrap_or_else(|| trainer.today()),
    })
    .await?;
  Ok((StatusCode::CREATED, Json(word)))
}

/// `GET /words/:id`
pub async fn get_one<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Word>, ApiError> {
  Ok(Json(trainer.word(id).await?))
}

/// `PUT /words/:id`: replaces translation, context and example.
pub async fn edit<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<WordEdit>,
) -> Result<Json<Word>, ApiError> {
  require("translation", &body.translation)?;
  Ok(Json(trainer.edit_word(id, body).await?))
}

/// `POST /schedules/backfill`
pub async fn backfill<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
) -> Result<Json<Value>, ApiError> {
  let created = trainer.backfill_schedules().await?;
  Ok(Json(json!({ "created": created })))
}
