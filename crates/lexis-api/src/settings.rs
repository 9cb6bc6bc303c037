//! Handlers for `/settings/:owner`, the per-owner training batch sizes.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use lexis_core::{store::TrainingStore, trainer::Trainer, training::TrainingLimits};

use crate::error::ApiError;

/// `GET /settings/:owner`: saved limits, or the server default.
pub async fn get_limits<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(owner): Path<String>,
) -> Result<Json<TrainingLimits>, ApiError> {
  Ok(Json(trainer.limits_for(owner).await?))
}

/// `PUT /settings/:owner` with body `{"new_words_in_train":10,"repeat_words_in_train":20}`
pub async fn put_limits<S: TrainingStore>(
  State(trainer): State<Arc<Trainer<S>>>,
  Path(owner): Path<String>,
  Json(limits): Json<TrainingLimits>,
) -> Result<Json<TrainingLimits>, ApiError> {
  trainer.set_limits(owner, limits).await?;
  Ok(Json(limits))
}
