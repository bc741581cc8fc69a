//! [`Workflow`]: topic extraction, media collection and page rendering as
//! one sequential run.

use std::sync::Arc;

use bayou_core::{
  store::HistoryStore,
  topic::{extract_keywords, extract_topic},
};
use bayou_pages::{PageRenderer, category};
use serde::Serialize;

use crate::{Error, Result, collector::MediaCollector, queue::ConsolidationQueue};

/// User id recorded for runs that do not name one.
pub const DEFAULT_USER_ID: &str = "anonymous";

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowOutcome {
  pub topic_id:    i64,
  pub topic:       String,
  pub media_count: usize,
  pub page_url:    String,
}

pub struct Workflow<S> {
  store:     Arc<S>,
  collector: MediaCollector<S>,
  renderer:  Arc<PageRenderer<S>>,
  queue:     Option<Arc<ConsolidationQueue<S>>>,
}

impl<S: HistoryStore + 'static> Workflow<S> {
  pub fn new(store: Arc<S>, collector: MediaCollector<S>, renderer: Arc<PageRenderer<S>>) -> Self {
    Self { store, collector, renderer, queue: None }
  }

  /// Schedule consolidation of matching categories after every run.
  pub fn with_queue(mut self, queue: Arc<ConsolidationQueue<S>>) -> Self {
    self.queue = Some(queue);
    self
  }

  pub fn renderer(&self) -> &PageRenderer<S> { &self.renderer }

  /// Research whatever topic `query` is about.
  ///
  /// Returns `Ok(None)` without touching the archive when no topic can be
  /// extracted. With `existing_topic_id` the media is appended to that
  /// topic instead of a new one.
  pub async fn run(
    &self,
    query: &str,
    user_id: Option<&str>,
    existing_topic_id: Option<i64>,
  ) -> Result<Option<WorkflowOutcome>> {
    let Some(topic) = extract_topic(query) else {
      tracing::info!(query, "no topic found in query");
      return Ok(None);
    };

    if let Some(id) = existing_topic_id {
      self.require_topic(id).await?;
    }

    let keywords = extract_keywords(query);
    self
      .execute(&topic, &keywords, user_id, existing_topic_id)
      .await
      .map(Some)
  }

  /// Research an explicitly named topic, skipping extraction.
  pub async fn run_topic(&self, topic: &str, user_id: Option<&str>) -> Result<WorkflowOutcome> {
    let keywords = extract_keywords(topic);
    self.execute(topic.trim(), &keywords, user_id, None).await
  }

  /// Add media to an existing topic and re-render its page.
  ///
  /// The search uses the topic extracted from `query` when there is one,
  /// otherwise the stored topic string.
  pub async fn enhance(&self, topic_id: i64, query: &str) -> Result<WorkflowOutcome> {
    let existing = self.require_topic(topic_id).await?;

    let topic = extract_topic(query).unwrap_or_else(|| existing.topic.clone());
    let mut keywords = extract_keywords(query);
    if keywords.is_empty() {
      keywords = existing.keywords.clone();
    }

    self
      .execute(&topic, &keywords, Some(&existing.user_id), Some(topic_id))
      .await
  }

  async fn require_topic(&self, id: i64) -> Result<bayou_core::research::ResearchedTopic> {
    self
      .store
      .get_researched_topic(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::TopicNotFound(id))
  }

  async fn execute(
    &self,
    topic: &str,
    keywords: &[String],
    user_id: Option<&str>,
    existing_topic_id: Option<i64>,
  ) -> Result<WorkflowOutcome> {
    let user_id = user_id.unwrap_or(DEFAULT_USER_ID);
    tracing::info!(topic, ?keywords, user_id, ?existing_topic_id, "research started");

    let collection = self
      .collector
      .collect(topic, keywords, user_id, existing_topic_id)
      .await?;
    let page = self.renderer.render(collection.topic_id).await?;

    // The page is titled after the stored topic, which may differ from
    // `topic` when the row already existed.
    let stored = self.require_topic(collection.topic_id).await?;

    if let Some(queue) = &self.queue {
      for category in category::matching(&stored.topic) {
        queue.schedule(category.key);
      }
    }

    tracing::info!(
      topic_id = collection.topic_id,
      media = collection.media.len(),
      url = %page.url,
      "research finished"
    );

    Ok(WorkflowOutcome {
      topic_id:    collection.topic_id,
      topic:       stored.topic,
      media_count: collection.media.len(),
      page_url:    page.url,
    })
  }
}
