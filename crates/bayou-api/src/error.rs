//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(err))
  }
}

impl From<bayou_pages::Error> for ApiError {
  fn from(err: bayou_pages::Error) -> Self {
    match err {
      bayou_pages::Error::TopicNotFound(_) | bayou_pages::Error::UnknownCategory(_) => {
        Self::NotFound(err.to_string())
      }
      bayou_pages::Error::Store(e) => Self::Store(e),
      other => Self::Internal(Box::new(other)),
    }
  }
}

impl From<bayou_research::Error> for ApiError {
  fn from(err: bayou_research::Error) -> Self {
    match err {
      bayou_research::Error::TopicNotFound(_) => Self::NotFound(err.to_string()),
      bayou_research::Error::Store(e) => Self::Store(e),
      bayou_research::Error::Pages(e) => e.into(),
      other => Self::Internal(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) | ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
