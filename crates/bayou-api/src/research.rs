//! Handlers for `/research` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/research` | Body: [`ResearchBody`]; runs the workflow to completion |
//! | `GET`  | `/research/topics` | Newest first; `?q=` filters by substring |
//! | `GET`  | `/research/topics/:id` | Topic, media and current page URL |
//! | `POST` | `/research/topics/:id/enhance` | Body: `{"query":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use bayou_core::{
  research::{ResearchedTopic, TopicMedia},
  store::HistoryStore,
};
use bayou_research::WorkflowOutcome;
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Run ─────────────────────────────────────────────────────────────────────

/// Either an explicit `topic` or a free-text `message` to extract one from.
/// `topic` wins when both are present.
#[derive(Debug, Default, Deserialize)]
pub struct ResearchBody {
  pub topic:   Option<String>,
  pub message: Option<String>,
  pub user_id: Option<String>,
}

/// `POST /research`
pub async fn start<S: HistoryStore + 'static>(
  State(state): State<Arc<ApiState<S>>>,
  Json(body): Json<ResearchBody>,
) -> Result<Json<WorkflowOutcome>, ApiError> {
  let user_id = body.user_id.as_deref();
  let topic = body.topic.as_deref().map(str::trim).filter(|t| !t.is_empty());
  let message = body.message.as_deref().map(str::trim).filter(|m| !m.is_empty());

  let outcome = match (topic, message) {
    (Some(topic), _) => state.workflow.run_topic(topic, user_id).await?,
    (None, Some(message)) => state
      .workflow
      .run(message, user_id, None)
      .await?
      .ok_or_else(|| ApiError::BadRequest("no topic found in message".into()))?,
    (None, None) => {
      return Err(ApiError::BadRequest("either topic or message is required".into()));
    }
  };
  Ok(Json(outcome))
}

// ─── Topics ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TopicParams {
  pub q: Option<String>,
}

/// `GET /research/topics[?q=..]`
pub async fn topics<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Query(params): Query<TopicParams>,
) -> Result<Json<Vec<ResearchedTopic>>, ApiError> {
  let topics = match params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
    Some(q) => state.store.find_researched_topics(q).await,
    None => state.store.list_researched_topics().await,
  }
  .map_err(ApiError::store)?;
  Ok(Json(topics))
}

#[derive(Debug, Serialize)]
pub struct TopicDetail {
  #[serde(flatten)]
  pub topic:    ResearchedTopic,
  pub media:    Vec<TopicMedia>,
  /// URL of the newest rendered page, if any.
  pub page_url: Option<String>,
}

/// `GET /research/topics/:id`
pub async fn topic<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<i64>,
) -> Result<Json<TopicDetail>, ApiError> {
  let topic = state
    .store
    .get_researched_topic(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("researched topic {id} not found")))?;
  let media = state.store.list_media(id).await.map_err(ApiError::store)?;
  let page_url = state
    .store
    .latest_presentation(id)
    .await
    .map_err(ApiError::store)?
    .map(|p| p.url);

  Ok(Json(TopicDetail { topic, media, page_url }))
}

// ─── Enhance ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EnhanceBody {
  pub query: String,
}

/// `POST /research/topics/:id/enhance`. Collects more media for an
/// existing topic and re-renders its page.
pub async fn enhance<S: HistoryStore + 'static>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<i64>,
  Json(body): Json<EnhanceBody>,
) -> Result<Json<WorkflowOutcome>, ApiError> {
  let outcome = state.workflow.enhance(id, body.query.trim()).await?;
  Ok(Json(outcome))
}
