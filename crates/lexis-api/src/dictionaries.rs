//! Handlers for `/dictionaries` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dictionaries` | Optional `?owner=<name>` |
//! | `POST` | `/dictionaries` | Body: [`NewDictionary`]; returns 201 |
//! | `GET`  | `/dictionaries/due` | `?owner=<name>` required |
//! | `GET`  | `/dictionaries/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use lexis_core::{
  dictionary::{Dictionary, DueDictionary, NewDictionary},
  store::TrainingStore,
  trainer::Trainer,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, require};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner: Option<String>,
}

/// `GET /dictionaries[?owner=<name>]`
pub async fn list<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Dictionary>>, ApiError> {
  Ok(Json(trainer.list_dictionaries(params.owner).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /dictionaries` with body `{"owner":"...","name":"...","description":null}`
pub async fn create<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Json(body): Json<NewDictionary>,
) -> Result<impl IntoResponse, ApiError> {
  require("owner", &body.owner)?;
  require("name", &body.name)?;
  let dictionary = trainer.add_dictionary(body).await?;
  Ok((StatusCode::CREATED, Json(dictionary)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /dictionaries/:id`
pub async fn get_one<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Dictionary>, ApiError> {
  Ok(Json(trainer.dictionary(id).await?))
}

// ─── Due summary ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DueParams {
  pub owner: String,
}

/// `GET /dictionaries/due?owner=<name>`: dictionaries with words to repeat
/// today, with the number of such words.
pub async fn due<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Query(params): Query<DueParams>,
) -> Result<Json<Vec<DueDictionary>>, ApiError> {
  Ok(Json(trainer.due_dictionaries(params.owner).await?))
}
