//! lexis server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus `LEXIS_*`
//! environment overrides, opens the SQLite store, and serves the JSON API
//! over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use lexis_core::{clock::SystemClock, trainer::Trainer};
use lexis_server::{expand_tilde, load_config};
use lexis_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Lexis vocabulary trainer server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create missing schedules for existing words, then exit.
  #[arg(long)]
  backfill: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = load_config(&cli.config).context("failed to load configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create store directory {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let trainer = Arc::new(Trainer::new(
    Arc::new(store),
    Arc::new(SystemClock),
    server_cfg.default_limits(),
  ));

  if cli.backfill {
    let created = trainer
      .backfill_schedules()
      .await
      .context("failed to backfill schedules")?;
    println!("{created} schedule(s) created");
    return Ok(());
  }

  let app = lexis_server::router(trainer);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
