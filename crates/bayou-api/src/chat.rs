//! Handlers for conversations and the chat assistant.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/conversations` | Body: `{"session_id"?}`; create or reuse |
//! | `GET`  | `/conversations/:session_id/messages` | Oldest first; 404 if missing |
//! | `POST` | `/chat` | Body: [`ChatBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use bayou_core::{
  chat::{ChatMessage, Conversation},
  store::HistoryStore,
};
use bayou_research::ChatReply;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// Messages returned when no `limit` is given.
pub const DEFAULT_MESSAGE_LIMIT: usize = 100;

// ─── Conversations ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct StartBody {
  pub session_id: Option<String>,
}

/// `POST /conversations`. A fresh session id is generated when none is
/// given.
pub async fn start<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Json(body): Json<StartBody>,
) -> Result<Json<Conversation>, ApiError> {
  let session_id = body
    .session_id
    .filter(|s| !s.trim().is_empty())
    .unwrap_or_else(|| Uuid::new_v4().to_string());

  let conversation = state
    .store
    .conversation(&session_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(conversation))
}

#[derive(Debug, Deserialize)]
pub struct MessageParams {
  pub limit: Option<usize>,
}

/// `GET /conversations/:session_id/messages[?limit=..]`
pub async fn messages<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(session_id): Path<String>,
  Query(params): Query<MessageParams>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
  let conversation = state
    .store
    .find_conversation(&session_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("conversation {session_id:?} not found")))?;

  let messages = state
    .store
    .recent_messages(conversation.id, params.limit.unwrap_or(DEFAULT_MESSAGE_LIMIT))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(messages))
}

// ─── Chat ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatBody {
  pub session_id: Option<String>,
  pub message:    String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
  #[serde(flatten)]
  pub reply:            ChatReply,
  /// Whether research on the detected topic was started in the background.
  pub research_started: bool,
}

/// `POST /chat`
pub async fn send<S: HistoryStore + 'static>(
  State(state): State<Arc<ApiState<S>>>,
  Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, ApiError> {
  let message = body.message.trim();
  if message.is_empty() {
    return Err(ApiError::BadRequest("message must not be empty".into()));
  }

  let reply = state
    .assistant
    .reply(body.session_id.as_deref(), message)
    .await?;

  let research_started = state.research_from_chat && reply.topic.is_some();
  if research_started {
    let workflow = Arc::clone(&state.workflow);
    let query = message.to_owned();
    tokio::spawn(async move {
      if let Err(e) = workflow.run(&query, None, None).await {
        tracing::warn!(error = %e, "background research failed");
      }
    });
  }

  Ok(Json(ChatResponse { reply, research_started }))
}
