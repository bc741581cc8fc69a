//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Keyword lists and page
//! fragments are stored as compact JSON. Enum tags are stored as their
//! lowercase names.

use bayou_core::{
  chat::{ChatMessage, Conversation},
  contribution::Contribution,
  history::HistoricalFact,
  research::{ConsolidatedPage, PageFragments, Presentation, ResearchedTopic, TopicMedia},
};
use chrono::{DateTime, Utc};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Keywords ────────────────────────────────────────────────────────────────

pub fn encode_keywords(keywords: &[String]) -> Result<String> {
  Ok(serde_json::to_string(keywords)?)
}

pub fn decode_keywords(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Page fragments ──────────────────────────────────────────────────────────

pub fn encode_fragments(fragments: Option<&PageFragments>) -> Result<Option<String>> {
  Ok(fragments.map(serde_json::to_string).transpose()?)
}

/// Unreadable fragments decode to `None`; consolidation then falls back to
/// the stored HTML.
pub fn decode_fragments(id: i64, s: Option<&str>) -> Option<PageFragments> {
  let s = s?;
  match serde_json::from_str(s) {
    Ok(f) => Some(f),
    Err(e) => {
      tracing::warn!(presentation_id = id, error = %e, "unreadable page fragments");
      None
    }
  }
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// `%text%` with `%`, `_` and `\` escaped; pair with `ESCAPE '\'`.
pub fn contains_pattern(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 2);
  out.push('%');
  for c in text.trim().chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawFact::from_row`]; expects `historical_facts f`
/// left-joined with `cities c` and `topics t`.
pub const FACT_COLUMNS: &str = "
  f.id, f.title, f.content, f.event_date, f.year, f.city_id, f.topic_id,
  c.name, t.name, f.source_name, f.source_url, f.image_url,
  f.verified, f.importance, f.created_at";

/// Raw values read from a `historical_facts` row joined with its lookups.
pub struct RawFact {
  pub id:          i64,
  pub title:       String,
  pub content:     String,
  pub event_date:  Option<String>,
  pub year:        Option<i32>,
  pub city_id:     Option<i64>,
  pub topic_id:    Option<i64>,
  pub city_name:   Option<String>,
  pub topic_name:  Option<String>,
  pub source_name: Option<String>,
  pub source_url:  Option<String>,
  pub image_url:   Option<String>,
  pub verified:    bool,
  pub importance:  i64,
  pub created_at:  String,
}

impl RawFact {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      content:     row.get(2)?,
      event_date:  row.get(3)?,
      year:        row.get(4)?,
      city_id:     row.get(5)?,
      topic_id:    row.get(6)?,
      city_name:   row.get(7)?,
      topic_name:  row.get(8)?,
      source_name: row.get(9)?,
      source_url:  row.get(10)?,
      image_url:   row.get(11)?,
      verified:    row.get(12)?,
      importance:  row.get(13)?,
      created_at:  row.get(14)?,
    })
  }

  pub fn into_fact(self) -> Result<HistoricalFact> {
    Ok(HistoricalFact {
      id:          self.id,
      title:       self.title,
      content:     self.content,
      event_date:  self.event_date,
      year:        self.year,
      city_id:     self.city_id,
      topic_id:    self.topic_id,
      city_name:   self.city_name,
      topic_name:  self.topic_name,
      source_name: self.source_name,
      source_url:  self.source_url,
      image_url:   self.image_url,
      verified:    self.verified,
      importance:  self.importance,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const TOPIC_COLUMNS: &str =
  "id, topic, topic_key, keywords, user_id, created_at, page_generated";

pub struct RawResearchedTopic {
  pub id:             i64,
  pub topic:          String,
  pub topic_key:      String,
  pub keywords:       String,
  pub user_id:        String,
  pub created_at:     String,
  pub page_generated: bool,
}

impl RawResearchedTopic {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      topic:          row.get(1)?,
      topic_key:      row.get(2)?,
      keywords:       row.get(3)?,
      user_id:        row.get(4)?,
      created_at:     row.get(5)?,
      page_generated: row.get(6)?,
    })
  }

  pub fn into_topic(self) -> Result<ResearchedTopic> {
    Ok(ResearchedTopic {
      id:             self.id,
      topic:          self.topic,
      topic_key:      self.topic_key,
      keywords:       decode_keywords(&self.keywords)?,
      user_id:        self.user_id,
      created_at:     decode_dt(&self.created_at)?,
      page_generated: self.page_generated,
    })
  }
}

pub const MEDIA_COLUMNS: &str =
  "id, topic_id, file_path, media_type, title, source, created_at";

pub struct RawMedia {
  pub id:         i64,
  pub topic_id:   i64,
  pub file_path:  String,
  pub media_type: String,
  pub title:      String,
  pub source:     String,
  pub created_at: String,
}

impl RawMedia {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      topic_id:   row.get(1)?,
      file_path:  row.get(2)?,
      media_type: row.get(3)?,
      title:      row.get(4)?,
      source:     row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_media(self) -> Result<TopicMedia> {
    Ok(TopicMedia {
      id:         self.id,
      topic_id:   self.topic_id,
      file_path:  self.file_path,
      kind:       self.media_type.parse()?,
      title:      self.title,
      source:     self.source,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawPresentation::from_row`]; expects the
/// `presentations` table aliased as `p`.
pub const PRESENTATION_COLUMNS: &str =
  "p.id, p.topic_id, p.title, p.html_content, p.fragments, p.file_path, p.url, p.created_at";

pub struct RawPresentation {
  pub id:           i64,
  pub topic_id:     i64,
  pub title:        String,
  pub html_content: String,
  pub fragments:    Option<String>,
  pub file_path:    String,
  pub url:          String,
  pub created_at:   String,
}

impl RawPresentation {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      topic_id:     row.get(1)?,
      title:        row.get(2)?,
      html_content: row.get(3)?,
      fragments:    row.get(4)?,
      file_path:    row.get(5)?,
      url:          row.get(6)?,
      created_at:   row.get(7)?,
    })
  }

  pub fn into_presentation(self) -> Result<Presentation> {
    Ok(Presentation {
      id:           self.id,
      topic_id:     self.topic_id,
      title:        self.title,
      html_content: self.html_content,
      fragments:    decode_fragments(self.id, self.fragments.as_deref()),
      file_path:    self.file_path,
      url:          self.url,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub const CONSOLIDATED_COLUMNS: &str =
  "id, category, display_name, file_path, url, created_at, updated_at";

pub struct RawConsolidatedPage {
  pub id:           i64,
  pub category:     String,
  pub display_name: String,
  pub file_path:    String,
  pub url:          String,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawConsolidatedPage {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      category:     row.get(1)?,
      display_name: row.get(2)?,
      file_path:    row.get(3)?,
      url:          row.get(4)?,
      created_at:   row.get(5)?,
      updated_at:   row.get(6)?,
    })
  }

  pub fn into_page(self) -> Result<ConsolidatedPage> {
    Ok(ConsolidatedPage {
      id:           self.id,
      category:     self.category,
      display_name: self.display_name,
      file_path:    self.file_path,
      url:          self.url,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawConversation {
  pub id:         i64,
  pub session_id: String,
  pub created_at: String,
}

impl RawConversation {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      session_id: row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_conversation(self) -> Result<Conversation> {
    Ok(Conversation {
      id:         self.id,
      session_id: self.session_id,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawMessage {
  pub id:              i64,
  pub conversation_id: i64,
  pub role:            String,
  pub content:         String,
  pub created_at:      String,
}

impl RawMessage {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      conversation_id: row.get(1)?,
      role:            row.get(2)?,
      content:         row.get(3)?,
      created_at:      row.get(4)?,
    })
  }

  pub fn into_message(self) -> Result<ChatMessage> {
    Ok(ChatMessage {
      id:              self.id,
      conversation_id: self.conversation_id,
      role:            self.role.parse()?,
      content:         self.content,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

pub const CONTRIBUTION_COLUMNS: &str = "
  id, title, content, city_name, topic_name, year, source_name, source_url,
  contributor_name, contributor_email, status, submitted_at, reviewed_at";

pub struct RawContribution {
  pub id:                i64,
  pub title:             String,
  pub content:           String,
  pub city_name:         Option<String>,
  pub topic_name:        Option<String>,
  pub year:              Option<i32>,
  pub source_name:       Option<String>,
  pub source_url:        Option<String>,
  pub contributor_name:  Option<String>,
  pub contributor_email: Option<String>,
  pub status:            String,
  pub submitted_at:      String,
  pub reviewed_at:       Option<String>,
}

impl RawContribution {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      title:             row.get(1)?,
      content:           row.get(2)?,
      city_name:         row.get(3)?,
      topic_name:        row.get(4)?,
      year:              row.get(5)?,
      source_name:       row.get(6)?,
      source_url:        row.get(7)?,
      contributor_name:  row.get(8)?,
      contributor_email: row.get(9)?,
      status:            row.get(10)?,
      submitted_at:      row.get(11)?,
      reviewed_at:       row.get(12)?,
    })
  }

  pub fn into_contribution(self) -> Result<Contribution> {
    Ok(Contribution {
      id:                self.id,
      title:             self.title,
      content:           self.content,
      city_name:         self.city_name,
      topic_name:        self.topic_name,
      year:              self.year,
      source_name:       self.source_name,
      source_url:        self.source_url,
      contributor_name:  self.contributor_name,
      contributor_email: self.contributor_email,
      status:            self.status.parse()?,
      submitted_at:      decode_dt(&self.submitted_at)?,
      reviewed_at:       self.reviewed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
