//! HTTP server for Lexis.
//!
//! Loads [`ServerConfig`], and wraps the JSON API from `lexis-api` with
//! request tracing and a health probe.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, routing::get};
use lexis_core::{store::TrainingStore, trainer::Trainer, training::TrainingLimits};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LEXIS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Batch size for new-word trainings of owners without saved settings.
  pub new_words_in_train:    usize,
  /// Batch size for repeat trainings of owners without saved settings.
  pub repeat_words_in_train: usize,
}

impl ServerConfig {
  pub fn default_limits(&self) -> TrainingLimits {
    TrainingLimits {
      new_words_in_train:    self.new_words_in_train,
      repeat_words_in_train: self.repeat_words_in_train,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Read configuration from `path` (optional) layered under the environment.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  let limits = TrainingLimits::default();
  config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080_i64)?
    .set_default("store_path", "lexis.db")?
    .set_default("new_words_in_train", limits.new_words_in_train as i64)?
    .set_default("repeat_words_in_train", limits.repeat_words_in_train as i64)?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("LEXIS"))
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: the API under `/api` plus `/health`.
pub fn router<S>(trainer: Arc<Trainer<S>>) -> Router
where
  S: TrainingStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", lexis_api::api_router(trainer))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::NaiveDate;
  use lexis_core::clock::FixedClock;
  use lexis_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 5, 1).unwrap() }

  async fn make_trainer() -> Arc<Trainer<SqliteStore>> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    Arc::new(Trainer::new(
      Arc::new(store),
      Arc::new(FixedClock(today())),
      TrainingLimits {
        new_words_in_train:    2,
        repeat_words_in_train: 5,
      },
    ))
  }

  async fn call(
    trainer: &Arc<Trainer<SqliteStore>>,
    method:  &str,
    uri:     &str,
    body:    Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = router(trainer.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
      })
    };
    (status, value)
  }

  async fn create_dictionary(trainer: &Arc<Trainer<SqliteStore>>, owner: &str) -> String {
    let (status, body) = call(
      trainer,
      "POST",
      "/api/dictionaries",
      Some(json!({ "owner": owner, "name": "Spanish" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["dictionary_id"].as_str().unwrap().to_owned()
  }

  async fn add_word(trainer: &Arc<Trainer<SqliteStore>>, dictionary_id: &str, name: &str) -> String {
    let (status, body) = call(
      trainer,
      "POST",
      &format!("/api/dictionaries/{dictionary_id}/words"),
      Some(json!({ "name": name, "translation": format!("{name}!") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["word_id"].as_str().unwrap().to_owned()
  }

  // ── Health and errors ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_returns_ok() {
    let trainer = make_trainer().await;
    let (status, body) = call(&trainer, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
  }

  #[tokio::test]
  async fn unknown_dictionary_is_404_with_json_error() {
    let trainer = make_trainer().await;
    let (status, body) =
      call(&trainer, "GET", &format!("/api/dictionaries/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("dictionary not found"));
  }

  #[tokio::test]
  async fn blank_dictionary_name_is_400() {
    let trainer = make_trainer().await;
    let (status, _) = call(
      &trainer,
      "POST",
      "/api/dictionaries",
      Some(json!({ "owner": "alice", "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Dictionaries and words ─────────────────────────────────────────────────

  #[tokio::test]
  async fn words_are_added_listed_and_edited() {
    let trainer = make_trainer().await;
    let dict = create_dictionary(&trainer, "alice").await;
    let word = add_word(&trainer, &dict, "perro").await;
    add_word(&trainer, &dict, "gato").await;

    let (status, list) = call(&trainer, "GET", &format!("/api/dictionaries/{dict}/words"), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = list.as_array().unwrap().iter().map(|w| w["name"].clone()).collect();
    assert_eq!(names, [json!("perro"), json!("gato")]);
    assert_eq!(list[0]["added_on"], json!("2024-05-01"));

    let (status, edited) = call(
      &trainer,
      "PUT",
      &format!("/api/words/{word}"),
      Some(json!({ "translation": "dog", "example": "El perro ladra." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["translation"], json!("dog"));
    assert_eq!(edited["name"], json!("perro"));
  }

  #[tokio::test]
  async fn word_for_unknown_dictionary_is_404() {
    let trainer = make_trainer().await;
    let (status, _) = call(
      &trainer,
      "POST",
      &format!("/api/dictionaries/{}/words", Uuid::new_v4()),
      Some(json!({ "name": "x", "translation": "y" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn list_dictionaries_by_owner() {
    let trainer = make_trainer().await;
    create_dictionary(&trainer, "alice").await;
    create_dictionary(&trainer, "bob").await;

    let (_, all) = call(&trainer, "GET", "/api/dictionaries", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    let (_, bobs) = call(&trainer, "GET", "/api/dictionaries?owner=bob", None).await;
    assert_eq!(bobs.as_array().unwrap().len(), 1);
    assert_eq!(bobs[0]["owner"], json!("bob"));
  }

  // ── Settings ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn settings_default_then_saved() {
    let trainer = make_trainer().await;
    let (status, limits) = call(&trainer, "GET", "/api/settings/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(limits, json!({ "new_words_in_train": 2, "repeat_words_in_train": 5 }));

    let saved = json!({ "new_words_in_train": 7, "repeat_words_in_train": 9 });
    let (status, _) = call(&trainer, "PUT", "/api/settings/alice", Some(saved.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (_, limits) = call(&trainer, "GET", "/api/settings/alice", None).await;
    assert_eq!(limits, saved);
  }

  // ── Trainings ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn training_runs_to_completion() {
    let trainer = make_trainer().await;
    let dict = create_dictionary(&trainer, "alice").await;
    let first = add_word(&trainer, &dict, "uno").await;
    let second = add_word(&trainer, &dict, "dos").await;
    add_word(&trainer, &dict, "tres").await;

    let (status, training) = call(
      &trainer,
      "POST",
      &format!("/api/dictionaries/{dict}/trainings"),
      Some(json!({ "kind": "new" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(training["words"].as_array().unwrap().len(), 2);
    let id = training["training_id"].as_str().unwrap().to_owned();

    let (_, step) = call(&trainer, "GET", &format!("/api/trainings/{id}/word"), None).await;
    assert_eq!(step["state"], json!("word"));
    assert_eq!(step["word"]["word_id"].as_str(), Some(first.as_str()));
    assert_eq!(step["stats"]["all_words"], json!(2));

    let (status, stats) = call(
      &trainer,
      "POST",
      &format!("/api/trainings/{id}/words/{first}/answer"),
      Some(json!({ "success": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["remembered_words"], json!(1));

    let (_, step) = call(&trainer, "GET", &format!("/api/trainings/{id}/word"), None).await;
    assert_eq!(step["word"]["word_id"].as_str(), Some(second.as_str()));
    assert_eq!(step["previous"]["word_id"].as_str(), Some(first.as_str()));

    call(
      &trainer,
      "POST",
      &format!("/api/trainings/{id}/words/{second}/answer"),
      Some(json!({ "success": false })),
    )
    .await;

    let (status, done) = call(&trainer, "GET", &format!("/api/trainings/{id}/word"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["state"], json!("completed"));
    let results = done["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["status"] == json!("IS_LEARNING")));
    assert!(results.iter().all(|r| r["next_train_date"] == json!("2024-05-02")));

    // The session is closed; the stored results remain readable.
    let (status, _) = call(&trainer, "GET", &format!("/api/trainings/{id}/stats"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, stored) = call(&trainer, "GET", &format!("/api/trainings/{id}/results"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored, json!(results));

    let (_, training) = call(&trainer, "GET", &format!("/api/trainings/{id}"), None).await;
    assert_eq!(training["scheduled_on"], json!("2024-05-01"));
  }

  #[tokio::test]
  async fn answer_for_foreign_word_is_409() {
    let trainer = make_trainer().await;
    let dict = create_dictionary(&trainer, "alice").await;
    add_word(&trainer, &dict, "uno").await;

    let (_, training) = call(
      &trainer,
      "POST",
      &format!("/api/dictionaries/{dict}/trainings"),
      Some(json!({ "kind": "new" })),
    )
    .await;
    let id = training["training_id"].as_str().unwrap();

    let (status, body) = call(
      &trainer,
      "POST",
      &format!("/api/trainings/{id}/words/{}/answer", Uuid::new_v4()),
      Some(json!({ "success": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("not part of training"));
  }

  #[tokio::test]
  async fn repeat_training_with_nothing_due_completes_immediately() {
    let trainer = make_trainer().await;
    let dict = create_dictionary(&trainer, "alice").await;
    add_word(&trainer, &dict, "uno").await;

    let (status, training) = call(
      &trainer,
      "POST",
      &format!("/api/dictionaries/{dict}/trainings"),
      Some(json!({ "kind": "repeat" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(training["words"], json!([]));

    let id = training["training_id"].as_str().unwrap();
    let (_, step) = call(&trainer, "GET", &format!("/api/trainings/{id}/word"), None).await;
    assert_eq!(step, json!({ "state": "completed", "results": [] }));
  }

  #[tokio::test]
  async fn due_summary_and_backfill() {
    let trainer = make_trainer().await;
    let (status, due) = call(&trainer, "GET", "/api/dictionaries/due?owner=alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(due, json!([]));

    let (status, body) = call(&trainer, "POST", "/api/schedules/backfill", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "created": 0 }));
  }

  #[tokio::test]
  async fn malformed_id_is_400() {
    let trainer = make_trainer().await;
    let (status, _) = call(&trainer, "GET", "/api/trainings/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[test]
  fn tilde_expands_to_home() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/lexis.db")),
        PathBuf::from(home).join("lexis.db")
      );
    }
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }
}
