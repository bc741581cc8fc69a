//! JSON REST API for Bayou.
//!
//! Exposes an axum [`Router`] backed by any [`bayou_core::store::HistoryStore`]
//! and the pipeline components built on it. Static files, TLS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", bayou_api::api_router(state))
//! ```

pub mod chat;
pub mod contributions;
pub mod error;
pub mod pages;
pub mod reference;
pub mod research;

#[cfg(test)]
mod tests;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use bayou_core::store::HistoryStore;
use bayou_pages::Consolidator;
use bayou_research::{Assistant, Workflow};

pub use error::ApiError;

/// Pause between categories when every category is consolidated at once.
pub const DEFAULT_CATEGORY_DELAY: Duration = Duration::from_secs(2);

/// Everything the handlers need, shared behind one `Arc`.
pub struct ApiState<S> {
  pub store:              Arc<S>,
  pub workflow:           Arc<Workflow<S>>,
  pub assistant:          Arc<Assistant<S>>,
  pub consolidator:       Arc<Consolidator<S>>,
  pub category_delay:     Duration,
  /// Start research in the background when a chat message names a topic.
  pub research_from_chat: bool,
}

impl<S> ApiState<S> {
  pub fn new(
    store: Arc<S>,
    workflow: Arc<Workflow<S>>,
    assistant: Arc<Assistant<S>>,
    consolidator: Arc<Consolidator<S>>,
  ) -> Self {
    Self {
      store,
      workflow,
      assistant,
      consolidator,
      category_delay: DEFAULT_CATEGORY_DELAY,
      research_from_chat: true,
    }
  }

  pub fn with_category_delay(mut self, delay: Duration) -> Self {
    self.category_delay = delay;
    self
  }

  pub fn with_research_from_chat(mut self, enabled: bool) -> Self {
    self.research_from_chat = enabled;
    self
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: Arc<ApiState<S>>) -> Router<()>
where
  S: HistoryStore + 'static,
{
  Router::new()
    // Reference data
    .route("/cities", get(reference::cities::<S>))
    .route("/cities/{id}", get(reference::city::<S>))
    .route("/topics", get(reference::topics::<S>))
    .route("/periods", get(reference::periods::<S>))
    .route("/facts", get(reference::facts::<S>))
    // Conversations
    .route("/conversations", post(chat::start::<S>))
    .route("/conversations/{session_id}/messages", get(chat::messages::<S>))
    .route("/chat", post(chat::send::<S>))
    // Research
    .route("/research", post(research::start::<S>))
    .route("/research/topics", get(research::topics::<S>))
    .route("/research/topics/{id}", get(research::topic::<S>))
    .route("/research/topics/{id}/enhance", post(research::enhance::<S>))
    // Pages
    .route("/presentations", get(pages::presentation::<S>))
    .route("/categories", get(pages::categories))
    .route("/consolidate", post(pages::consolidate_all::<S>))
    .route("/consolidate/{category}", post(pages::consolidate::<S>))
    .route("/consolidated", get(pages::consolidated::<S>))
    // Contributions
    .route(
      "/contributions",
      get(contributions::list::<S>).post(contributions::submit::<S>),
    )
    .route("/contributions/{id}/review", post(contributions::review::<S>))
    .with_state(state)
}
