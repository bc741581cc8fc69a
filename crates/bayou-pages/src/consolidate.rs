//! [`Consolidator`]: one tabbed page per category.

use std::{
  path::PathBuf,
  sync::Arc,
  time::Duration,
};

use bayou_core::{
  research::{MatchedPresentation, NewConsolidatedPage},
  store::HistoryStore,
  topic::slugify,
};
use chrono::Utc;
use html_escape::encode_text;

use crate::{
  Error, Result,
  category::{self, CATEGORIES, Category},
  extract::extract_page,
  html::{self, Tab},
};

/// Where a consolidated page ended up.
#[derive(Debug, Clone)]
pub struct ConsolidatedOutput {
  pub category:  &'static str,
  pub file_path: PathBuf,
  pub url:       String,
  pub tabs:      usize,
}

pub struct Consolidator<S> {
  store:      Arc<S>,
  pages_dir:  PathBuf,
  url_prefix: String,
}

impl<S: HistoryStore> Consolidator<S> {
  /// Consolidated pages are written to `<pages_dir>/consolidated`.
  pub fn new(store: Arc<S>, pages_dir: impl Into<PathBuf>) -> Self {
    Self {
      store,
      pages_dir: pages_dir.into(),
      url_prefix: "/pages".to_owned(),
    }
  }

  pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.url_prefix = prefix.into();
    self
  }

  pub fn output_dir(&self) -> PathBuf { self.pages_dir.join("consolidated") }

  /// Build the page for `key`. Returns `Ok(None)` without writing anything
  /// when no presentation matches the category.
  pub async fn consolidate(&self, key: &str) -> Result<Option<ConsolidatedOutput>> {
    let category = category::find(key).ok_or_else(|| Error::UnknownCategory(key.to_owned()))?;
    self.consolidate_category(category).await
  }

  async fn consolidate_category(
    &self,
    category: &'static Category,
  ) -> Result<Option<ConsolidatedOutput>> {
    let matched = self
      .store
      .presentations_matching(&category.terms())
      .await
      .map_err(Error::store)?;

    if matched.is_empty() {
      tracing::info!(category = category.key, "nothing to consolidate");
      return Ok(None);
    }

    let tabs: Vec<Tab> = matched.iter().map(tab).collect();
    let now = Utc::now();
    let html = html::consolidated_page(category, &tabs, now);

    let dir = self.output_dir();
    let file_name = format!(
      "{}-{}.html",
      slugify(category.key),
      now.format("%Y%m%d%H%M%S%3f")
    );
    let file_path = dir.join(&file_name);
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(&file_path, &html).await?;
    let url = format!(
      "{}/consolidated/{}",
      self.url_prefix.trim_end_matches('/'),
      file_name
    );

    self
      .store
      .add_consolidated_page(NewConsolidatedPage {
        category:     category.key.to_owned(),
        display_name: category.display_name.to_owned(),
        file_path:    file_path.display().to_string(),
        url:          url.clone(),
      })
      .await
      .map_err(Error::store)?;

    tracing::info!(category = category.key, tabs = tabs.len(), %url, "consolidated category");
    Ok(Some(ConsolidatedOutput {
      category: category.key,
      file_path,
      url,
      tabs: tabs.len(),
    }))
  }

  /// Consolidate every category in table order, pausing `delay` between
  /// categories. Failures are logged and skipped.
  pub async fn consolidate_all(&self, delay: Duration) -> Vec<ConsolidatedOutput> {
    let mut outputs = Vec::new();
    for (i, category) in CATEGORIES.iter().enumerate() {
      if i > 0 && !delay.is_zero() {
        tokio::time::sleep(delay).await;
      }
      match self.consolidate_category(category).await {
        Ok(Some(output)) => outputs.push(output),
        Ok(None) => {}
        Err(e) => {
          tracing::warn!(category = category.key, error = %e, "consolidation failed");
        }
      }
    }
    outputs
  }
}

/// Build a tab from stored fragments, or from the stored HTML when the
/// presentation has none.
fn tab(matched: &MatchedPresentation) -> Tab {
  let presentation = &matched.presentation;

  match &presentation.fragments {
    Some(fragments) => Tab {
      label:        matched.topic.clone(),
      title_html:   encode_text(&fragments.title).into_owned(),
      hero_html:    html::hero_section(fragments),
      gallery_html: html::gallery_section(&fragments.gallery),
      facts_html:   html::facts_section(&fragments.facts),
      page_url:     presentation.url.clone(),
    },
    None => {
      let extracted = extract_page(&presentation.html_content);
      Tab {
        label:        matched.topic.clone(),
        title_html:   extracted
          .title
          .unwrap_or_else(|| encode_text(&presentation.title).into_owned()),
        hero_html:    extracted.hero,
        gallery_html: extracted.gallery,
        facts_html:   extracted.facts,
        page_url:     presentation.url.clone(),
      }
    }
  }
}
