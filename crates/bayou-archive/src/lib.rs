//! HTTP client for a public media archive's JSON search API.
//!
//! Each media kind has its own search path on the same host. Searches return
//! [`ArchiveHit`]s; [`ArchiveClient::download`] fetches a hit's payload.

pub mod error;
pub mod types;

use std::time::Duration;

use bytes::Bytes;

pub use error::{ArchiveError, Result};
pub use types::{ArchiveHit, Family, SearchItem, SearchResponse, select_resource};

use types::absolute;

const DEFAULT_BASE_URL: &str = "https://www.loc.gov";
const DEFAULT_NAME: &str = "Library of Congress";
const DEFAULT_USER_AGENT: &str =
  concat!("bayou-history/", env!("CARGO_PKG_VERSION"));

/// Where and how to reach the archive.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
  pub base_url:   String,
  /// Human-readable name used in attributions.
  pub name:       String,
  pub user_agent: String,
  pub image_path: String,
  pub audio_path: String,
  pub video_path: String,
}

impl Default for ArchiveConfig {
  fn default() -> Self {
    Self {
      base_url:   DEFAULT_BASE_URL.to_owned(),
      name:       DEFAULT_NAME.to_owned(),
      user_agent: DEFAULT_USER_AGENT.to_owned(),
      image_path: "/photos/".to_owned(),
      audio_path: "/audio/".to_owned(),
      video_path: "/film-and-videos/".to_owned(),
    }
  }
}

impl ArchiveConfig {
  /// Default paths and name against a different host.
  pub fn with_base_url(base_url: impl Into<String>) -> Self {
    Self { base_url: base_url.into(), ..Self::default() }
  }
}

pub struct ArchiveClient {
  client: reqwest::Client,
  config: ArchiveConfig,
}

impl ArchiveClient {
  pub fn new(config: ArchiveConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(config.user_agent.clone())
      .build()?;
    Ok(Self { client, config })
  }

  /// The archive's display name.
  pub fn name(&self) -> &str { &self.config.name }

  /// Image hits whose full-size image URL is known.
  pub async fn search_images(&self, query: &str, limit: usize) -> Result<Vec<ArchiveHit>> {
    let items = self.search(&self.config.image_path, query, limit).await?;

    Ok(
      items
        .into_iter()
        .filter_map(|item| {
          let full = item.image.as_ref()?.full.as_deref()?;
          Some(hit(&item, absolute(full)))
        })
        .take(limit)
        .collect(),
    )
  }

  pub async fn search_audio(&self, query: &str, limit: usize) -> Result<Vec<ArchiveHit>> {
    self.search_family(&self.config.audio_path, Family::Audio, query, limit).await
  }

  pub async fn search_video(&self, query: &str, limit: usize) -> Result<Vec<ArchiveHit>> {
    self.search_family(&self.config.video_path, Family::Video, query, limit).await
  }

  async fn search_family(
    &self,
    path: &str,
    family: Family,
    query: &str,
    limit: usize,
  ) -> Result<Vec<ArchiveHit>> {
    let items = self.search(path, query, limit).await?;

    Ok(
      items
        .into_iter()
        .filter_map(|item| {
          let url = select_resource(&item, family)?;
          Some(hit(&item, url))
        })
        .take(limit)
        .collect(),
    )
  }

  async fn search(&self, path: &str, query: &str, limit: usize) -> Result<Vec<SearchItem>> {
    let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
    let count = limit.to_string();

    tracing::debug!(%url, query, limit, "archive search");
    let resp = self
      .client
      .get(&url)
      .query(&[("q", query), ("fo", "json"), ("c", count.as_str())])
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(ArchiveError::Api {
        status:  status.as_u16(),
        message: body,
      });
    }

    let body = resp.text().await?;
    let parsed: SearchResponse = serde_json::from_str(&body)?;
    Ok(parsed.results)
  }

  /// Fetch a payload, failing on non-success status or an empty body.
  pub async fn download(&self, url: &str, timeout: Duration) -> Result<Bytes> {
    let resp = self.client.get(url).timeout(timeout).send().await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(ArchiveError::Api {
        status:  status.as_u16(),
        message: format!("download of {url} failed"),
      });
    }

    let bytes = resp.bytes().await?;
    if bytes.is_empty() {
      return Err(ArchiveError::EmptyBody(url.to_owned()));
    }
    Ok(bytes)
  }
}

fn hit(item: &SearchItem, download_url: String) -> ArchiveHit {
  let title = item
    .title
    .as_deref()
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .unwrap_or("Untitled")
    .to_owned();
  let item_url = item
    .url
    .as_deref()
    .map(absolute)
    .unwrap_or_else(|| download_url.clone());
  ArchiveHit { title, download_url, item_url }
}

#[cfg(test)]
mod tests;
