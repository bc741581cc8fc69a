//! bayou server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `BAYOU_*` environment variables, opens the SQLite store, seeds it on first
//! start and serves the API and static pages over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use bayou_server::{ServerConfig, build, router};
use bayou_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Southeast Texas history assistant")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("BAYOU"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.chat_api_key.is_none() {
    server_cfg.chat_api_key = std::env::var("OPENAI_API_KEY").ok();
  }
  if server_cfg.chat_api_key.is_none() {
    tracing::warn!("no chat API key configured; chat requests are sent unauthenticated");
  }

  server_cfg.database = expand_tilde(&server_cfg.database);
  server_cfg.public_dir = expand_tilde(&server_cfg.public_dir);

  for dir in [server_cfg.pages_dir(), server_cfg.media_dir()] {
    tokio::fs::create_dir_all(&dir)
      .await
      .with_context(|| format!("failed to create {dir:?}"))?;
  }

  // Open SQLite store.
  let store = SqliteStore::open(&server_cfg.database)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.database))?;
  if server_cfg.seed && store.seed_if_empty().await.context("failed to seed store")? {
    tracing::info!("seeded reference data");
  }

  // Build application state.
  let components =
    build(&server_cfg, Arc::new(store)).context("failed to build archive client")?;
  let app = router(components.state, &server_cfg.public_dir);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  if let Some(queue) = components.queue {
    queue.shutdown();
  }
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
