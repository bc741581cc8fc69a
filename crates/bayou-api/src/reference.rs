//! Handlers for the lookup tables and facts.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/cities` | All cities by name |
//! | `GET`  | `/cities/:id` | 404 if missing |
//! | `GET`  | `/topics` | All lookup topics |
//! | `GET`  | `/periods` | All periods by start year |
//! | `GET`  | `/facts` | Filters: [`FactParams`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use bayou_core::{
  history::{FactQuery, HistoricalCity, HistoricalFact, HistoricalPeriod, HistoricalTopic},
  store::HistoryStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── Lookup tables ───────────────────────────────────────────────────────────

/// `GET /cities`
pub async fn cities<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
) -> Result<Json<Vec<HistoricalCity>>, ApiError> {
  let cities = state.store.list_cities().await.map_err(ApiError::store)?;
  Ok(Json(cities))
}

/// `GET /cities/:id`
pub async fn city<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Path(id): Path<i64>,
) -> Result<Json<HistoricalCity>, ApiError> {
  let city = state
    .store
    .get_city(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("city {id} not found")))?;
  Ok(Json(city))
}

/// `GET /topics`
pub async fn topics<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
) -> Result<Json<Vec<HistoricalTopic>>, ApiError> {
  let topics = state.store.list_topics().await.map_err(ApiError::store)?;
  Ok(Json(topics))
}

/// `GET /periods`
pub async fn periods<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
) -> Result<Json<Vec<HistoricalPeriod>>, ApiError> {
  let periods = state.store.list_periods().await.map_err(ApiError::store)?;
  Ok(Json(periods))
}

// ─── Facts ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct FactParams {
  pub city_id:   Option<i64>,
  pub topic_id:  Option<i64>,
  pub period_id: Option<i64>,
  /// Substring over title and content.
  pub q:         Option<String>,
  /// If `true`, only verified facts. Default `false`.
  #[serde(default)]
  pub verified:  bool,
  pub limit:     Option<usize>,
}

impl From<FactParams> for FactQuery {
  fn from(p: FactParams) -> Self {
    FactQuery {
      city_id:       p.city_id,
      topic_id:      p.topic_id,
      period_id:     p.period_id,
      text:          p.q.filter(|q| !q.trim().is_empty()),
      verified_only: p.verified,
      limit:         p.limit,
    }
  }
}

/// `GET /facts[?city_id=..][&topic_id=..][&period_id=..][&q=..][&verified=true][&limit=..]`
pub async fn facts<S: HistoryStore>(
  State(state): State<Arc<ApiState<S>>>,
  Query(params): Query<FactParams>,
) -> Result<Json<Vec<HistoricalFact>>, ApiError> {
  let query = FactQuery::from(params);
  let facts = state
    .store
    .list_facts(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(facts))
}
