//! HTTP server for Bayou.
//!
//! Wires the store, archive and chat clients and the pipeline components into
//! the JSON API, and serves generated pages and downloaded media as static
//! files.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use bayou_api::{ApiState, api_router};
use bayou_archive::{ArchiveClient, ArchiveConfig, ArchiveError};
use bayou_core::store::HistoryStore;
use bayou_pages::{Consolidator, PageRenderer};
use bayou_research::{Assistant, ChatClient, ConsolidationQueue, MediaCollector, Workflow};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BAYOU_*` environment variables. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                       String,
  pub port:                       u16,
  pub database:                   PathBuf,
  /// Root of the static tree; pages go to `pages/`, media to `images/`.
  pub public_dir:                 PathBuf,
  pub archive_base_url:           String,
  pub archive_name:               String,
  pub max_media:                  usize,
  pub download_timeout_secs:      u64,
  pub chat_base_url:              String,
  pub chat_model:                 String,
  pub chat_api_key:               Option<String>,
  /// Wait before a category queued after research is consolidated.
  pub consolidation_delay_secs:   u64,
  /// Pause between categories when consolidating all of them.
  pub category_delay_secs:        u64,
  pub consolidate_after_research: bool,
  pub research_from_chat:         bool,
  /// Insert the reference data on first start.
  pub seed:                       bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let archive = ArchiveConfig::default();
    Self {
      host:                       "127.0.0.1".to_string(),
      port:                       3000,
      database:                   PathBuf::from("bayou.db"),
      public_dir:                 PathBuf::from("public"),
      archive_base_url:           archive.base_url,
      archive_name:               archive.name,
      max_media:                  bayou_research::collector::DEFAULT_MAX_ITEMS,
      download_timeout_secs:      30,
      chat_base_url:              bayou_research::chat::DEFAULT_BASE_URL.to_string(),
      chat_model:                 bayou_research::chat::DEFAULT_MODEL.to_string(),
      chat_api_key:               None,
      consolidation_delay_secs:   30,
      category_delay_secs:        2,
      consolidate_after_research: true,
      research_from_chat:         true,
      seed:                       true,
    }
  }
}

impl ServerConfig {
  pub fn pages_dir(&self) -> PathBuf { self.public_dir.join("pages") }

  pub fn media_dir(&self) -> PathBuf { self.public_dir.join("images") }
}

// ─── Application state ────────────────────────────────────────────────────────

/// The assembled components. `queue` is kept so the caller can cancel
/// pending consolidations on shutdown.
pub struct Components<S> {
  pub state: Arc<ApiState<S>>,
  pub queue: Option<Arc<ConsolidationQueue<S>>>,
}

/// Build every pipeline component around `store`.
pub fn build<S>(config: &ServerConfig, store: Arc<S>) -> Result<Components<S>, ArchiveError>
where
  S: HistoryStore + 'static,
{
  let archive = ArchiveClient::new(ArchiveConfig {
    base_url: config.archive_base_url.clone(),
    name: config.archive_name.clone(),
    ..ArchiveConfig::default()
  })?;

  let collector = MediaCollector::new(store.clone(), Arc::new(archive), config.media_dir())
    .with_max_items(config.max_media)
    .with_download_timeout(Duration::from_secs(config.download_timeout_secs));
  let renderer = Arc::new(PageRenderer::new(store.clone(), config.pages_dir()));
  let consolidator = Arc::new(Consolidator::new(store.clone(), config.pages_dir()));

  let mut workflow = Workflow::new(store.clone(), collector, renderer);
  let queue = config.consolidate_after_research.then(|| {
    Arc::new(ConsolidationQueue::new(
      consolidator.clone(),
      Duration::from_secs(config.consolidation_delay_secs),
    ))
  });
  if let Some(queue) = &queue {
    workflow = workflow.with_queue(queue.clone());
  }

  let chat = ChatClient::new(config.chat_api_key.clone())
    .with_base_url(config.chat_base_url.clone())
    .with_model(config.chat_model.clone());
  let assistant = Assistant::new(store.clone(), chat);

  let state = ApiState::new(store, Arc::new(workflow), Arc::new(assistant), consolidator)
    .with_category_delay(Duration::from_secs(config.category_delay_secs))
    .with_research_from_chat(config.research_from_chat);

  Ok(Components { state: Arc::new(state), queue })
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API under `/api`, pages under `/pages`, media under `/images` and
/// anything else from `public_dir`.
pub fn router<S>(state: Arc<ApiState<S>>, public_dir: &Path) -> Router
where
  S: HistoryStore + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .nest_service("/pages", ServeDir::new(public_dir.join("pages")))
    .nest_service("/images", ServeDir::new(public_dir.join("images")))
    .fallback_service(ServeDir::new(public_dir))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
  };
  use bayou_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn oneshot(app: Router, uri: &str) -> axum::response::Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(req).await.unwrap()
  }

  async fn test_app(public_dir: &Path) -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    store.seed_if_empty().await.unwrap();
    let config = ServerConfig {
      public_dir: public_dir.to_path_buf(),
      archive_base_url: "http://127.0.0.1:9".to_string(),
      consolidate_after_research: false,
      ..ServerConfig::default()
    };
    let components = build(&config, store).unwrap();
    assert!(components.queue.is_none());
    router(components.state, public_dir)
  }

  #[test]
  fn config_defaults_fill_missing_keys() {
    let settings = config::Config::builder()
      .add_source(config::File::from_str(
        "port = 8080\nchat_model = \"local-model\"\n",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap();
    let cfg: ServerConfig = settings.try_deserialize().unwrap();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.chat_model, "local-model");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.max_media, 9);
    assert_eq!(cfg.download_timeout_secs, 30);
    assert!(cfg.chat_api_key.is_none());
    assert_eq!(cfg.pages_dir(), PathBuf::from("public/pages"));
    assert_eq!(cfg.media_dir(), PathBuf::from("public/images"));
  }

  #[tokio::test]
  async fn api_is_nested_under_api() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path()).await;

    let resp = oneshot(app.clone(), "/api/topics").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = oneshot(app, "/topics").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn generated_files_are_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("pages")).unwrap();
    std::fs::create_dir_all(dir.path().join("images")).unwrap();
    std::fs::write(dir.path().join("pages/spindletop-1.html"), "<h1>Spindletop</h1>").unwrap();
    std::fs::write(dir.path().join("images/gusher.jpg"), b"jpeg").unwrap();
    let app = test_app(dir.path()).await;

    let resp = oneshot(app.clone(), "/pages/spindletop-1.html").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"<h1>Spindletop</h1>");

    let resp = oneshot(app.clone(), "/images/gusher.jpg").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = oneshot(app, "/pages/missing.html").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
