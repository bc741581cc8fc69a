//! Handlers for `/contributions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/contributions` | Body: [`NewContribution`]; returns 201 |
//! | `GET`  | `/contributions` | `?status=pending|approved|rejected` |
//! | `POST` | `/contributions/:id/review` | Body: `{"approve":bool,"importance"?}`; 409 if already reviewed |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use bayou_core::{
  contribution::{
    Contribution, ContributionReview, ContributionStatus, NewContribution,
    ReviewOutcome, ReviewResult,
  },
  store::HistoryStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

/// `POST /contributions`
pub async fn submit<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Json(body): Json<NewContribution>,
) -> Result<impl IntoResponse, ApiError> {
  if body.title.trim().is_empty() || body.content.trim().is_empty() {
    return Err(ApiError::BadRequest("title and content are required".into()));
  }

  let contribution = state
    .store
    .submit_contribution(body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id = contribution.id, "contribution submitted");
  Ok((StatusCode::CREATED, Json(contribution)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<ContributionStatus>,
}

/// `GET /contributions[?status=..]`
pub async fn list<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Contribution>>, ApiError> {
  let contributions = state
    .store
    .list_contributions(params.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(contributions))
}

/// `POST /contributions/:id/review`
pub async fn review<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<i64>,
  Json(body): Json<ContributionReview>,
) -> Result<Json<ReviewOutcome>, ApiError> {
  match state
    .store
    .review_contribution(id, body)
    .await
    .map_err(ApiError::store)?
  {
    ReviewResult::Reviewed(outcome) => {
      tracing::info!(id, status = %outcome.contribution.status, "contribution reviewed");
      Ok(Json(outcome))
    }
    ReviewResult::NotFound => Err(ApiError::NotFound(format!("contribution {id} not found"))),
    ReviewResult::AlreadyReviewed(status) => Err(ApiError::Conflict(format!(
      "contribution {id} was already {status}"
    ))),
  }
}
