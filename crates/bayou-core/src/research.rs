//! Research pipeline records: researched topics, their downloaded media, the
//! pages rendered from them and the consolidated category pages.
//!
//! Media, presentation and consolidation rows are append-only. Re-rendering a
//! topic adds a new [`Presentation`]; the newest one (by `created_at`, then
//! by id) is the one callers treat as current.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

// ─── Researched topics ───────────────────────────────────────────────────────

/// A subject that has been (or is being) researched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchedTopic {
  pub id:             i64,
  pub topic:          String,
  /// Normalised identity key; see [`crate::topic::topic_key`].
  pub topic_key:      String,
  pub keywords:       Vec<String>,
  pub user_id:        String,
  pub created_at:     DateTime<Utc>,
  pub page_generated: bool,
}

/// Input to [`crate::store::HistoryStore::create_topic`].
#[derive(Debug, Clone)]
pub struct NewResearchedTopic {
  pub topic:    String,
  pub keywords: Vec<String>,
  pub user_id:  String,
}

// ─── Media ───────────────────────────────────────────────────────────────────

/// The family of a downloaded asset. Determines the file extension; the
/// payload itself is never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
  Image,
  Audio,
  Video,
}

impl MediaKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Image => "image",
      Self::Audio => "audio",
      Self::Video => "video",
    }
  }

  /// Extension used for files of this kind.
  pub fn extension(self) -> &'static str {
    match self {
      Self::Image => "jpg",
      Self::Audio => "mp3",
      Self::Video => "mp4",
    }
  }
}

impl fmt::Display for MediaKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for MediaKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "image" => Ok(Self::Image),
      "audio" => Ok(Self::Audio),
      "video" => Ok(Self::Video),
      other => Err(Error::UnknownMediaKind(other.to_owned())),
    }
  }
}

/// A downloaded asset linked to a researched topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicMedia {
  pub id:         i64,
  pub topic_id:   i64,
  /// Public relative URL of the stored file, e.g. `/images/x.jpg`.
  pub file_path:  String,
  pub kind:       MediaKind,
  pub title:      String,
  /// Attribution, e.g. "Library of Congress: https://...".
  pub source:     String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTopicMedia {
  pub topic_id:  i64,
  pub file_path: String,
  pub kind:      MediaKind,
  pub title:     String,
  pub source:    String,
}

// ─── Page fragments ──────────────────────────────────────────────────────────

/// One entry of a page gallery: either a downloaded asset or a fact's image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
  pub url:    String,
  pub kind:   MediaKind,
  pub title:  String,
  pub source: Option<String>,
}

/// The parts of a fact shown on a rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCard {
  pub title:       String,
  pub content:     String,
  pub year:        Option<i32>,
  pub city:        Option<String>,
  pub source_name: Option<String>,
  pub source_url:  Option<String>,
}

/// Structured content of a rendered page, stored next to its HTML so that
/// consolidation never has to re-parse markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFragments {
  pub title:   String,
  /// Short introductory text shown under the title.
  pub summary: String,
  pub gallery: Vec<GalleryItem>,
  pub facts:   Vec<FactCard>,
}

// ─── Presentations ───────────────────────────────────────────────────────────

/// A rendered page for one researched topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
  pub id:           i64,
  pub topic_id:     i64,
  pub title:        String,
  #[serde(skip_serializing)]
  pub html_content: String,
  /// `None` for rows whose fragments were missing or unreadable.
  #[serde(skip_serializing)]
  pub fragments:    Option<PageFragments>,
  pub file_path:    String,
  pub url:          String,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPresentation {
  pub topic_id:     i64,
  pub title:        String,
  pub html_content: String,
  pub fragments:    Option<PageFragments>,
  pub file_path:    String,
  pub url:          String,
}

/// A presentation together with the topic string it was rendered for.
#[derive(Debug, Clone)]
pub struct MatchedPresentation {
  pub presentation: Presentation,
  pub topic:        String,
}

// ─── Consolidated pages ──────────────────────────────────────────────────────

/// A tabbed page combining the presentations of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedPage {
  pub id:           i64,
  pub category:     String,
  pub display_name: String,
  pub file_path:    String,
  pub url:          String,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewConsolidatedPage {
  pub category:     String,
  pub display_name: String,
  pub file_path:    String,
  pub url:          String,
}
