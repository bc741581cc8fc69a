//! Handlers for rendered and consolidated pages.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/presentations` | `?topic=`; renders on demand if the topic was researched |
//! | `GET`  | `/categories` | The consolidation category table |
//! | `POST` | `/consolidate/:category` | 404 if unknown or nothing matches |
//! | `POST` | `/consolidate` | Every category, in the background; 202 |
//! | `GET`  | `/consolidated` | Consolidation runs, newest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use bayou_core::{
  research::{ConsolidatedPage, Presentation},
  store::HistoryStore,
};
use bayou_pages::{CATEGORIES, Category};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{ApiState, error::ApiError};

// ─── Presentations ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PresentationParams {
  pub topic: String,
}

/// `GET /presentations?topic=<text>`
///
/// Returns the newest page whose researched topic contains `topic`. When
/// the topic was researched but never rendered, the page is rendered first.
pub async fn presentation<S: HistoryStore + 'static>(
  State(state): State<Arc<ApiState<S>>>,
  Query(params): Query<PresentationParams>,
) -> Result<Json<Presentation>, ApiError> {
  let text = params.topic.trim();
  if text.is_empty() {
    return Err(ApiError::BadRequest("topic must not be empty".into()));
  }

  if let Some(found) = state
    .store
    .find_latest_presentation(text)
    .await
    .map_err(ApiError::store)?
  {
    return Ok(Json(found));
  }

  let not_found = || ApiError::NotFound(format!("no research found for {text:?}"));
  let topic = state
    .store
    .find_researched_topics(text)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .next()
    .ok_or_else(not_found)?;

  tracing::debug!(topic_id = topic.id, "rendering page on demand");
  state.workflow.renderer().render(topic.id).await?;

  let rendered = state
    .store
    .latest_presentation(topic.id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  Ok(Json(rendered))
}

// ─── Categories ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
  pub key:          &'static str,
  pub display_name: &'static str,
  pub description:  &'static str,
  pub related:      &'static [&'static str],
}

impl From<&Category> for CategoryInfo {
  fn from(c: &Category) -> Self {
    CategoryInfo {
      key:          c.key,
      display_name: c.display_name,
      description:  c.description,
      related:      c.related,
    }
  }
}

/// `GET /categories`
pub async fn categories() -> Json<Vec<CategoryInfo>> {
  Json(CATEGORIES.iter().map(CategoryInfo::from).collect())
}

// ─── Consolidation ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ConsolidateResponse {
  pub category: &'static str,
  pub url:      String,
  pub tabs:     usize,
}

/// `POST /consolidate/:category`
pub async fn consolidate<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(category): Path<String>,
) -> Result<Json<ConsolidateResponse>, ApiError> {
  let output = state
    .consolidator
    .consolidate(&category)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("no pages to consolidate for {category:?}")))?;

  Ok(Json(ConsolidateResponse {
    category: output.category,
    url:      output.url,
    tabs:     output.tabs,
  }))
}

/// `POST /consolidate`. Returns 202 immediately; results are logged.
pub async fn consolidate_all<S: HistoryStore + 'static>(
  State(state): State<Arc<ApiState<S>>>,
) -> impl IntoResponse {
  let consolidator = Arc::clone(&state.consolidator);
  let delay = state.category_delay;
  tokio::spawn(async move {
    let outputs = consolidator.consolidate_all(delay).await;
    tracing::info!(pages = outputs.len(), "consolidated all categories");
  });

  (
    StatusCode::ACCEPTED,
    Json(json!({ "status": "started", "categories": CATEGORIES.len() })),
  )
}

/// `GET /consolidated`
pub async fn consolidated<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
) -> Result<Json<Vec<ConsolidatedPage>>, ApiError> {
  let pages = state
    .store
    .list_consolidated_pages()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(pages))
}
