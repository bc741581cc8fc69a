//! Reference data: cities, topics, periods and the historical facts that
//! link them.
//!
//! These rows are written by seeding and by contribution review. The research
//! pipeline only ever reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Lookup entities ─────────────────────────────────────────────────────────

/// A city or town in the region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalCity {
  pub id:           i64,
  pub name:         String,
  pub county:       Option<String>,
  pub founded_year: Option<i32>,
  pub description:  Option<String>,
}

/// Input to [`crate::store::HistoryStore::add_city`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCity {
  pub name:         String,
  pub county:       Option<String>,
  pub founded_year: Option<i32>,
  pub description:  Option<String>,
}

/// A subject heading such as "Spindletop" or "Shipbuilding".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalTopic {
  pub id:          i64,
  pub name:        String,
  /// Broad grouping, e.g. "industry", "disaster", "culture".
  pub category:    Option<String>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTopic {
  pub name:        String,
  pub category:    Option<String>,
  pub description: Option<String>,
}

/// A named span of years, e.g. "Oil Boom (1901-1930)".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPeriod {
  pub id:          i64,
  pub name:        String,
  pub start_year:  Option<i32>,
  pub end_year:    Option<i32>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPeriod {
  pub name:        String,
  pub start_year:  Option<i32>,
  pub end_year:    Option<i32>,
  pub description: Option<String>,
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// A single historical claim with provenance.
///
/// `city_name` and `topic_name` are joined in on read and are not stored on
/// the fact row itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalFact {
  pub id:          i64,
  pub title:       String,
  pub content:     String,
  /// Free-form date text as found in the source ("January 10, 1901").
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
  /// Ordering rank; higher sorts first. No bounds are enforced.
  pub importance:  i64,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::HistoryStore::record_fact`].
#[derive(Debug, Clone, Default)]
pub struct NewHistoricalFact {
  pub title:       String,
  pub content:     String,
  pub event_date:  Option<String>,
  pub year:        Option<i32>,
  pub city_id:     Option<i64>,
  pub topic_id:    Option<i64>,
  pub source_name: Option<String>,
  pub source_url:  Option<String>,
  pub image_url:   Option<String>,
  pub verified:    bool,
  pub importance:  i64,
}

impl NewHistoricalFact {
  /// Convenience constructor with all optional fields left empty.
  pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      content: content.into(),
      ..Self::default()
    }
  }
}

/// Parameters for [`crate::store::HistoryStore::list_facts`].
#[derive(Debug, Clone, Default)]
pub struct FactQuery {
  pub city_id:       Option<i64>,
  pub topic_id:      Option<i64>,
  /// Restrict to facts whose year falls inside the period's range.
  pub period_id:     Option<i64>,
  /// Case-insensitive substring over title and content.
  pub text:          Option<String>,
  pub verified_only: bool,
  pub limit:         Option<usize>,
}
