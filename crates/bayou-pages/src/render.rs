//! [`PageRenderer`]: one HTML page per researched topic.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use bayou_core::{
  history::HistoricalFact,
  research::{FactCard, GalleryItem, MediaKind, NewPresentation, PageFragments, TopicMedia},
  store::HistoryStore,
  topic::slugify,
};
use chrono::Utc;

use crate::{Error, Result, html};

/// Maximum number of facts shown on a topic page.
pub const FACT_LIMIT: usize = 20;

/// Where a rendered page ended up.
#[derive(Debug, Clone)]
pub struct RenderedPage {
  pub url:             String,
  pub file_path:       PathBuf,
  pub presentation_id: i64,
}

pub struct PageRenderer<S> {
  store:      Arc<S>,
  pages_dir:  PathBuf,
  url_prefix: String,
  fact_limit: usize,
}

impl<S: HistoryStore> PageRenderer<S> {
  /// Pages are written to `pages_dir` and served under `/pages`.
  pub fn new(store: Arc<S>, pages_dir: impl Into<PathBuf>) -> Self {
    Self {
      store,
      pages_dir: pages_dir.into(),
      url_prefix: "/pages".to_owned(),
      fact_limit: FACT_LIMIT,
    }
  }

  pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.url_prefix = prefix.into();
    self
  }

  pub fn pages_dir(&self) -> &Path { &self.pages_dir }

  pub fn url_prefix(&self) -> &str { &self.url_prefix }

  /// Render the page for `topic_id`, write it to
  /// `<pages_dir>/<topic-slug>-<topic_id>.html` and record a presentation.
  ///
  /// Re-rendering overwrites the same file and appends a new presentation.
  pub async fn render(&self, topic_id: i64) -> Result<RenderedPage> {
    let topic = self
      .store
      .get_researched_topic(topic_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::TopicNotFound(topic_id))?;

    let media = self.store.list_media(topic_id).await.map_err(Error::store)?;
    let facts = self
      .store
      .facts_for_topic(&topic.topic, self.fact_limit)
      .await
      .map_err(Error::store)?;

    let fragments = PageFragments {
      title:   topic.topic.clone(),
      summary: summary(&topic.topic, &facts),
      gallery: gallery(&media, &facts),
      facts:   facts.iter().map(fact_card).collect(),
    };
    let html = html::topic_page(&fragments, Utc::now());

    let file_name = format!("{}-{}.html", slugify(&topic.topic), topic.id);
    let file_path = self.pages_dir.join(&file_name);
    tokio::fs::create_dir_all(&self.pages_dir).await?;
    tokio::fs::write(&file_path, &html).await?;
    let url = format!("{}/{}", self.url_prefix.trim_end_matches('/'), file_name);

    let presentation = self
      .store
      .add_presentation(NewPresentation {
        topic_id,
        title: fragments.title.clone(),
        html_content: html,
        fragments: Some(fragments),
        file_path: file_path.display().to_string(),
        url: url.clone(),
      })
      .await
      .map_err(Error::store)?;

    if let Err(e) = self.store.mark_page_generated(topic_id).await {
      tracing::warn!(topic_id, error = %e, "failed to flag topic as rendered");
    }

    tracing::info!(
      topic_id,
      topic = %topic.topic,
      media = media.len(),
      facts = facts.len(),
      %url,
      "rendered topic page"
    );

    Ok(RenderedPage { url, file_path, presentation_id: presentation.id })
  }
}

fn summary(topic: &str, facts: &[HistoricalFact]) -> String {
  match facts.first() {
    Some(top) => top.content.clone(),
    None => format!("Archival research on {topic} in Southeast Texas history."),
  }
}

/// Downloaded media first, then fact images.
fn gallery(media: &[TopicMedia], facts: &[HistoricalFact]) -> Vec<GalleryItem> {
  let downloaded = media.iter().map(|m| GalleryItem {
    url:    m.file_path.clone(),
    kind:   m.kind,
    title:  m.title.clone(),
    source: Some(m.source.clone()),
  });
  let fact_images = facts.iter().filter_map(|f| {
    Some(GalleryItem {
      url:    f.image_url.clone()?,
      kind:   MediaKind::Image,
      title:  f.title.clone(),
      source: f.source_name.clone(),
    })
  });
  downloaded.chain(fact_images).collect()
}

fn fact_card(fact: &HistoricalFact) -> FactCard {
  FactCard {
    title:       fact.title.clone(),
    content:     fact.content.clone(),
    year:        fact.year,
    city:        fact.city_name.clone(),
    source_name: fact.source_name.clone(),
    source_url:  fact.source_url.clone(),
  }
}
