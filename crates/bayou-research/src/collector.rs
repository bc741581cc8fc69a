//! [`MediaCollector`]: archive search, download and media linking for one
//! topic.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use bayou_archive::{ArchiveClient, ArchiveHit};
use bayou_core::{
  research::{MediaKind, NewResearchedTopic, NewTopicMedia, TopicMedia},
  store::HistoryStore,
  topic::slugify,
};
use chrono::Utc;
use tokio::{fs::OpenOptions, io::AsyncWriteExt as _};

use crate::{Error, Result};

pub const DEFAULT_MAX_ITEMS: usize = 9;
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Appended to every archive query to keep results regional.
const QUERY_SUFFIX: &str = "Texas";

/// Longest cleaned title kept in a media file name.
const MAX_TITLE_SLUG: usize = 50;

/// Result of a collection run.
#[derive(Debug, Clone)]
pub struct Collection {
  pub topic_id: i64,
  /// Linked media in download order.
  pub media:    Vec<TopicMedia>,
}

pub struct MediaCollector<S> {
  store:            Arc<S>,
  archive:          Arc<ArchiveClient>,
  media_dir:        PathBuf,
  url_prefix:       String,
  max_items:        usize,
  download_timeout: Duration,
}

impl<S: HistoryStore> MediaCollector<S> {
  /// Media files are written to `media_dir` and served under `/images`.
  pub fn new(store: Arc<S>, archive: Arc<ArchiveClient>, media_dir: impl Into<PathBuf>) -> Self {
    Self {
      store,
      archive,
      media_dir: media_dir.into(),
      url_prefix: "/images".to_owned(),
      max_items: DEFAULT_MAX_ITEMS,
      download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
    }
  }

  pub fn with_max_items(mut self, max_items: usize) -> Self {
    self.max_items = max_items;
    self
  }

  pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
    self.download_timeout = timeout;
    self
  }

  pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.url_prefix = prefix.into();
    self
  }

  /// Search the archive for `topic`, download what was found and link it to
  /// a researched topic.
  ///
  /// With `existing_topic_id` the media is appended to that topic; otherwise
  /// the topic row is created (or merged by key). Search and download
  /// failures only reduce the result.
  pub async fn collect(
    &self,
    topic: &str,
    keywords: &[String],
    user_id: &str,
    existing_topic_id: Option<i64>,
  ) -> Result<Collection> {
    let topic_id = match existing_topic_id {
      Some(id) => id,
      None => {
        self
          .store
          .create_topic(NewResearchedTopic {
            topic:    topic.to_owned(),
            keywords: keywords.to_vec(),
            user_id:  user_id.to_owned(),
          })
          .await
          .map_err(Error::store)?
          .id
      }
    };

    let query = search_query(topic, keywords);
    let hits = self.search_all(&query).await;
    tracing::info!(topic_id, %query, found = hits.len(), "archive search finished");

    let mut media = Vec::with_capacity(hits.len());
    for (kind, hit) in hits {
      match self.fetch(topic_id, topic, kind, &hit).await {
        Ok(Some(linked)) => media.push(linked),
        Ok(None) => {}
        Err(e) => {
          tracing::warn!(topic_id, url = %hit.download_url, error = %e, "skipping media item");
        }
      }
    }

    tracing::info!(topic_id, collected = media.len(), "media collection finished");
    Ok(Collection { topic_id, media })
  }

  /// Images first, then audio, then video; truncated to `max_items`.
  async fn search_all(&self, query: &str) -> Vec<(MediaKind, ArchiveHit)> {
    let half = self.max_items / 2;

    let images = self
      .archive
      .search_images(query, self.max_items)
      .await
      .unwrap_or_else(|e| {
        tracing::warn!(kind = "image", error = %e, "archive search failed");
        vec![]
      });
    let audio = self.archive.search_audio(query, half).await.unwrap_or_else(|e| {
      tracing::warn!(kind = "audio", error = %e, "archive search failed");
      vec![]
    });
    let video = self.archive.search_video(query, half).await.unwrap_or_else(|e| {
      tracing::warn!(kind = "video", error = %e, "archive search failed");
      vec![]
    });

    images
      .into_iter()
      .map(|h| (MediaKind::Image, h))
      .chain(audio.into_iter().map(|h| (MediaKind::Audio, h)))
      .chain(video.into_iter().map(|h| (MediaKind::Video, h)))
      .take(self.max_items)
      .collect()
  }

  /// Download one hit and link it. A failed link is logged and yields
  /// `None`; the downloaded file stays on disk.
  async fn fetch(
    &self,
    topic_id: i64,
    topic: &str,
    kind: MediaKind,
    hit: &ArchiveHit,
  ) -> Result<Option<TopicMedia>> {
    let bytes = self
      .archive
      .download(&hit.download_url, self.download_timeout)
      .await?;

    tokio::fs::create_dir_all(&self.media_dir).await?;
    let file_name =
      write_new(&self.media_dir, &media_file_name(topic, &hit.title, kind), &bytes).await?;
    tracing::debug!(topic_id, %file_name, bytes = bytes.len(), "media downloaded");

    let linked = self
      .store
      .link_media(NewTopicMedia {
        topic_id,
        file_path: format!("{}/{}", self.url_prefix.trim_end_matches('/'), file_name),
        kind,
        title: hit.title.clone(),
        source: format!("{}: {}", self.archive.name(), hit.item_url),
      })
      .await;

    match linked {
      Ok(media) => Ok(Some(media)),
      Err(e) => {
        tracing::warn!(topic_id, %file_name, error = %e, "failed to link media");
        Ok(None)
      }
    }
  }
}

fn search_query(topic: &str, keywords: &[String]) -> String {
  let topic_lower = topic.to_lowercase();
  let mut parts = vec![topic.trim().to_owned()];
  parts.extend(
    keywords
      .iter()
      .filter(|k| !topic_lower.contains(k.as_str()))
      .cloned(),
  );
  parts.push(QUERY_SUFFIX.to_owned());
  parts.join(" ")
}

/// `<topic-slug>-<cleaned-title>-<timestamp>.<ext>`
fn media_file_name(topic: &str, title: &str, kind: MediaKind) -> String {
  let mut title = slugify(title);
  if title.len() > MAX_TITLE_SLUG {
    title.truncate(MAX_TITLE_SLUG);
    title = title.trim_end_matches('-').to_owned();
  }
  format!(
    "{}-{}-{}.{}",
    slugify(topic),
    title,
    Utc::now().format("%Y%m%d%H%M%S%3f"),
    kind.extension()
  )
}

/// Write `bytes` to a file that did not exist before. A taken name gets
/// `-2`, `-3`, .. before its extension. Returns the name written.
async fn write_new(dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<String> {
  let (stem, ext) = file_name.rsplit_once('.').unwrap_or((file_name, ""));
  let mut candidate = file_name.to_owned();
  let mut n = 1;
  loop {
    let opened = OpenOptions::new()
      .write(true)
      .create_new(true)
      .open(dir.join(&candidate))
      .await;
    match opened {
      Ok(mut file) => {
        file.write_all(bytes).await?;
        file.flush().await?;
        return Ok(candidate);
      }
      Err(e) if e.kind() == ErrorKind::AlreadyExists => {
        n += 1;
        candidate = if ext.is_empty() {
          format!("{stem}-{n}")
        } else {
          format!("{stem}-{n}.{ext}")
        };
      }
      Err(e) => return Err(e),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn query_skips_keywords_already_in_topic() {
    let q = search_query("Spindletop", &["spindletop".into(), "discovery".into()]);
    assert_eq!(q, "Spindletop discovery Texas");
  }

  #[test]
  fn file_names_follow_topic_title_timestamp_pattern() {
    let name = media_file_name("Port Arthur", "Gulf Refinery, 1910!", MediaKind::Image);
    assert!(name.starts_with("port-arthur-gulf-refinery-1910-"), "{name}");
    assert!(name.ends_with(".jpg"));

    let stamp = name
      .trim_start_matches("port-arthur-gulf-refinery-1910-")
      .trim_end_matches(".jpg");
    assert_eq!(stamp.len(), 17);
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));
  }

  #[test]
  fn long_titles_are_shortened() {
    let title = "a very long title ".repeat(10);
    let name = media_file_name("Orange", &title, MediaKind::Audio);
    let middle = name.trim_start_matches("orange-");
    assert!(middle.len() <= MAX_TITLE_SLUG + 1 + 17 + 4);
    assert!(name.ends_with(".mp3"));
  }

  #[tokio::test]
  async fn taken_names_get_a_counter() {
    let dir = tempfile::tempdir().unwrap();

    let first = write_new(dir.path(), "refinery.jpg", b"ONE").await.unwrap();
    let second = write_new(dir.path(), "refinery.jpg", b"TWO").await.unwrap();
    let third = write_new(dir.path(), "refinery.jpg", b"THREE").await.unwrap();

    assert_eq!(first, "refinery.jpg");
    assert_eq!(second, "refinery-2.jpg");
    assert_eq!(third, "refinery-3.jpg");
    assert_eq!(std::fs::read(dir.path().join(first)).unwrap(), b"ONE");
    assert_eq!(std::fs::read(dir.path().join(second)).unwrap(), b"TWO");
  }
}
