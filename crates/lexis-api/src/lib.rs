//! JSON REST API for Lexis.
//!
//! Exposes an axum [`Router`] backed by a [`Trainer`] over any
//! [`TrainingStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility; `owner` is taken from the request as-is.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", lexis_api::api_router(trainer.clone()))
//! ```

pub mod dictionaries;
pub mod error;
pub mod settings;
pub mod trainings;
pub mod words;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use lexis_core::{store::TrainingStore, trainer::Trainer};

pub use error::ApiError;

/// Build a fully-materialised API router for `trainer`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(trainer: Arc<Trainer<S>>) -> Router<()>
where
  S: TrainingStore + 'static,
{
  Router::new()
    // Dictionaries
    .route(
      "/dictionaries",
      get(dictionaries::list::<S>).post(dictionaries::create::<S>),
    )
    .route("/dictionaries/due", get(dictionaries::due::<S>))
    .route("/dictionaries/{id}", get(dictionaries::get_one::<S>))
    .route(
      "/dictionaries/{id}/words",
      get(words::list::<S>).post(words::create::<S>),
    )
    .route("/dictionaries/{id}/trainings", post(trainings::start::<S>))
    // Words
    .route("/words/{id}", get(words::get_one::<S>).put(words::edit::<S>))
    .route("/schedules/backfill", post(words::backfill::<S>))
    // Settings
    .route(
      "/settings/{owner}",
      get(settings::get_limits::<S>).put(settings::put_limits::<S>),
    )
    // Trainings
    .route("/trainings/{id}", get(trainings::get_one::<S>))
    .route("/trainings/{id}/word", get(trainings::step::<S>))
    .route(
      "/trainings/{id}/words/{word_id}/answer",
      post(trainings::answer::<S>),
    )
    .route("/trainings/{id}/stats", get(trainings::stats::<S>))
    .route("/trainings/{id}/results", get(trainings::results::<S>))
    .with_state(trainer)
}
