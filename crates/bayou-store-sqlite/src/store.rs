//! [`SqliteStore`]: the SQLite implementation of [`HistoryStore`].

use std::path::Path;

use bayou_core::{
  chat::{ChatMessage, ChatRole, Conversation},
  contribution::{
    Contribution, ContributionReview, ContributionStatus, NewContribution,
    ReviewOutcome, ReviewResult,
  },
  history::{
    FactQuery, HistoricalCity, HistoricalFact, HistoricalPeriod,
    HistoricalTopic, NewCity, NewHistoricalFact, NewPeriod, NewTopic,
  },
  research::{
    ConsolidatedPage, MatchedPresentation, NewConsolidatedPage,
    NewPresentation, NewResearchedTopic, NewTopicMedia, Presentation,
    ResearchedTopic, TopicMedia,
  },
  store::HistoryStore,
  topic::topic_key,
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};

use crate::{
  Error, Result,
  encode::{
    CONSOLIDATED_COLUMNS, CONTRIBUTION_COLUMNS, FACT_COLUMNS, MEDIA_COLUMNS,
    PRESENTATION_COLUMNS, RawConsolidatedPage, RawContribution,
    RawConversation, RawFact, RawMedia, RawMessage, RawPresentation,
    RawResearchedTopic, TOPIC_COLUMNS, contains_pattern, encode_dt,
    encode_fragments, encode_keywords,
  },
  schema::SCHEMA,
};

const FACT_FROM: &str = "
  FROM historical_facts f
  LEFT JOIN cities c ON c.id = f.city_id
  LEFT JOIN topics t ON t.id = f.topic_id";

const FACT_ORDER: &str =
  "ORDER BY f.importance DESC, f.year IS NULL, f.year ASC, f.id ASC";

/// Outcome of the review transaction, decoded outside the connection thread.
enum ReviewRow {
  Missing,
  AlreadyReviewed(String),
  Reviewed { fact_id: Option<i64> },
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Bayou store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. The
/// connection closes when the last clone is dropped.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a fact query built from `FACT_COLUMNS`/`FACT_FROM` with positional
  /// parameters.
  async fn query_facts(
    &self,
    sql: String,
    params: Vec<Value>,
  ) -> Result<Vec<HistoricalFact>> {
    let raws: Vec<RawFact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawFact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFact::into_fact).collect()
  }

  async fn fetch_fact(&self, id: i64) -> Result<Option<HistoricalFact>> {
    let sql = format!("SELECT {FACT_COLUMNS} {FACT_FROM} WHERE f.id = ?1");
    let mut facts = self.query_facts(sql, vec![Value::Integer(id)]).await?;
    Ok(facts.pop())
  }

  async fn fetch_contribution(&self, id: i64) -> Result<Option<Contribution>> {
    let raw: Option<RawContribution> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CONTRIBUTION_COLUMNS} FROM contributions WHERE id = ?1"),
              rusqlite::params![id],
              RawContribution::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContribution::into_contribution).transpose()
  }

  async fn query_topics(
    &self,
    sql: String,
    params: Vec<Value>,
  ) -> Result<Vec<ResearchedTopic>> {
    let raws: Vec<RawResearchedTopic> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawResearchedTopic::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResearchedTopic::into_topic).collect()
  }

  async fn query_presentation(
    &self,
    sql: String,
    params: Vec<Value>,
  ) -> Result<Option<Presentation>> {
    let raw: Option<RawPresentation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params_from_iter(params),
              RawPresentation::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPresentation::into_presentation).transpose()
  }
}

// ─── HistoryStore impl ───────────────────────────────────────────────────────

impl HistoryStore for SqliteStore {
  type Error = Error;

  // ── Reference data ────────────────────────────────────────────────────────

  async fn add_city(&self, input: NewCity) -> Result<HistoricalCity> {
    let NewCity { name, county, founded_year, description } = input;
    let (n, co, d) = (name.clone(), county.clone(), description.clone());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cities (name, county, founded_year, description)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![n, co, founded_year, d],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(HistoricalCity { id, name, county, founded_year, description })
  }

  async fn list_cities(&self) -> Result<Vec<HistoricalCity>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(
            "SELECT id, name, county, founded_year, description
             FROM cities ORDER BY name",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(HistoricalCity {
                id:           row.get(0)?,
                name:         row.get(1)?,
                county:       row.get(2)?,
                founded_year: row.get(3)?,
                description:  row.get(4)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn get_city(&self, id: i64) -> Result<Option<HistoricalCity>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT id, name, county, founded_year, description
                 FROM cities WHERE id = ?1",
                rusqlite::params![id],
                |row| {
                  Ok(HistoricalCity {
                    id:           row.get(0)?,
                    name:         row.get(1)?,
                    county:       row.get(2)?,
                    founded_year: row.get(3)?,
                    description:  row.get(4)?,
                  })
                },
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn add_topic(&self, input: NewTopic) -> Result<HistoricalTopic> {
    let NewTopic { name, category, description } = input;
    let (n, c, d) = (name.clone(), category.clone(), description.clone());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO topics (name, category, description) VALUES (?1, ?2, ?3)",
          rusqlite::params![n, c, d],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(HistoricalTopic { id, name, category, description })
  }

  async fn list_topics(&self) -> Result<Vec<HistoricalTopic>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(
            "SELECT id, name, category, description FROM topics ORDER BY name",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(HistoricalTopic {
                id:          row.get(0)?,
                name:        row.get(1)?,
                category:    row.get(2)?,
                description: row.get(3)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn find_topic_by_name(&self, name: &str) -> Result<Option<HistoricalTopic>> {
    let name = name.trim().to_owned();

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT id, name, category, description
                 FROM topics WHERE lower(name) = lower(?1)",
                rusqlite::params![name],
                |row| {
                  Ok(HistoricalTopic {
                    id:          row.get(0)?,
                    name:        row.get(1)?,
                    category:    row.get(2)?,
                    description: row.get(3)?,
                  })
                },
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn add_period(&self, input: NewPeriod) -> Result<HistoricalPeriod> {
    let NewPeriod { name, start_year, end_year, description } = input;
    let (n, d) = (name.clone(), description.clone());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO periods (name, start_year, end_year, description)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![n, start_year, end_year, d],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(HistoricalPeriod { id, name, start_year, end_year, description })
  }

  async fn list_periods(&self) -> Result<Vec<HistoricalPeriod>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(
            "SELECT id, name, start_year, end_year, description
             FROM periods ORDER BY start_year IS NULL, start_year, id",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(HistoricalPeriod {
                id:          row.get(0)?,
                name:        row.get(1)?,
                start_year:  row.get(2)?,
                end_year:    row.get(3)?,
                description: row.get(4)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  // ── Facts ─────────────────────────────────────────────────────────────────

  async fn record_fact(&self, input: NewHistoricalFact) -> Result<HistoricalFact> {
    let created_at = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO historical_facts (
             title, content, event_date, year, city_id, topic_id,
             source_name, source_url, image_url, verified, importance, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            input.title,
            input.content,
            input.event_date,
            input.year,
            input.city_id,
            input.topic_id,
            input.source_name,
            input.source_url,
            input.image_url,
            input.verified,
            input.importance,
            created_at,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .fetch_fact(id)
      .await?
      .ok_or_else(|| Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::QueryReturnedNoRows,
      )))
  }

  async fn list_facts(&self, query: &FactQuery) -> Result<Vec<HistoricalFact>> {
    // Build WHERE clause dynamically.
    let mut conds: Vec<String> = vec![];
    let mut params: Vec<Value> = vec![];

    if let Some(id) = query.city_id {
      params.push(Value::Integer(id));
      conds.push(format!("f.city_id = ?{}", params.len()));
    }
    if let Some(id) = query.topic_id {
      params.push(Value::Integer(id));
      conds.push(format!("f.topic_id = ?{}", params.len()));
    }
    if let Some(id) = query.period_id {
      params.push(Value::Integer(id));
      let n = params.len();
      conds.push(format!(
        "f.year BETWEEN
           (SELECT COALESCE(start_year, -100000) FROM periods WHERE id = ?{n})
           AND (SELECT COALESCE(end_year, 100000) FROM periods WHERE id = ?{n})"
      ));
    }
    if let Some(text) = query.text.as_deref().filter(|t| !t.trim().is_empty()) {
      params.push(Value::Text(contains_pattern(text)));
      let n = params.len();
      conds.push(format!(
        "(f.title LIKE ?{n} ESCAPE '\\' OR f.content LIKE ?{n} ESCAPE '\\')"
      ));
    }
    if query.verified_only {
      conds.push("f.verified = 1".to_owned());
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    params.push(Value::Integer(query.limit.unwrap_or(100) as i64));
    let sql = format!(
      "SELECT {FACT_COLUMNS} {FACT_FROM} {where_clause} {FACT_ORDER} LIMIT ?{}",
      params.len()
    );

    self.query_facts(sql, params).await
  }

  async fn facts_for_topic(&self, topic: &str, limit: usize) -> Result<Vec<HistoricalFact>> {
    let limit = Value::Integer(limit as i64);

    if let Some(exact) = self.find_topic_by_name(topic).await? {
      let sql = format!(
        "SELECT {FACT_COLUMNS} {FACT_FROM} WHERE f.topic_id = ?1 {FACT_ORDER} LIMIT ?2"
      );
      return self.query_facts(sql, vec![Value::Integer(exact.id), limit]).await;
    }

    let pattern = Value::Text(contains_pattern(topic));
    let sql = format!(
      "SELECT {FACT_COLUMNS} {FACT_FROM}
       WHERE t.name LIKE ?1 ESCAPE '\\' OR c.name LIKE ?1 ESCAPE '\\'
          OR f.title LIKE ?1 ESCAPE '\\' OR f.content LIKE ?1 ESCAPE '\\'
       {FACT_ORDER} LIMIT ?2"
    );
    self.query_facts(sql, vec![pattern, limit]).await
  }

  // ── Researched topics and media ───────────────────────────────────────────

  async fn create_topic(&self, input: NewResearchedTopic) -> Result<ResearchedTopic> {
    let key        = topic_key(&input.topic);
    let keywords   = encode_keywords(&input.keywords)?;
    let created_at = encode_dt(Utc::now());
    let topic      = input.topic.trim().to_owned();
    let user_id    = input.user_id;

    let raw: RawResearchedTopic = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO researched_topics (topic, topic_key, keywords, user_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(topic_key) DO NOTHING",
          rusqlite::params![topic, key, keywords, user_id, created_at],
        )?;
        Ok(conn.query_row(
          &format!("SELECT {TOPIC_COLUMNS} FROM researched_topics WHERE topic_key = ?1"),
          rusqlite::params![key],
          RawResearchedTopic::from_row,
        )?)
      })
      .await?;

    raw.into_topic()
  }

  async fn get_researched_topic(&self, id: i64) -> Result<Option<ResearchedTopic>> {
    let sql = format!("SELECT {TOPIC_COLUMNS} FROM researched_topics WHERE id = ?1");
    let mut topics = self.query_topics(sql, vec![Value::Integer(id)]).await?;
    Ok(topics.pop())
  }

  async fn list_researched_topics(&self) -> Result<Vec<ResearchedTopic>> {
    let sql = format!(
      "SELECT {TOPIC_COLUMNS} FROM researched_topics ORDER BY created_at DESC, id DESC"
    );
    self.query_topics(sql, vec![]).await
  }

  async fn find_researched_topics(&self, text: &str) -> Result<Vec<ResearchedTopic>> {
    let sql = format!(
      "SELECT {TOPIC_COLUMNS} FROM researched_topics
       WHERE topic LIKE ?1 ESCAPE '\\'
       ORDER BY created_at DESC, id DESC"
    );
    let pattern = Value::Text(contains_pattern(text));
    self.query_topics(sql, vec![pattern]).await
  }

  async fn link_media(&self, input: NewTopicMedia) -> Result<TopicMedia> {
    let now      = Utc::now();
    let at_str   = encode_dt(now);
    let kind_str = input.kind.as_str();
    let (topic_id, path, title, source) =
      (input.topic_id, input.file_path.clone(), input.title.clone(), input.source.clone());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO topic_media (topic_id, file_path, media_type, title, source, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![topic_id, path, kind_str, title, source, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(TopicMedia {
      id,
      topic_id:   input.topic_id,
      file_path:  input.file_path,
      kind:       input.kind,
      title:      input.title,
      source:     input.source,
      created_at: now,
    })
  }

  async fn list_media(&self, topic_id: i64) -> Result<Vec<TopicMedia>> {
    let raws: Vec<RawMedia> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MEDIA_COLUMNS} FROM topic_media WHERE topic_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![topic_id], RawMedia::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMedia::into_media).collect()
  }

  async fn mark_page_generated(&self, topic_id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE researched_topics SET page_generated = 1 WHERE id = ?1",
          rusqlite::params![topic_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Presentations ─────────────────────────────────────────────────────────

  async fn add_presentation(&self, input: NewPresentation) -> Result<Presentation> {
    let now       = Utc::now();
    let at_str    = encode_dt(now);
    let fragments = encode_fragments(input.fragments.as_ref())?;
    let (topic_id, title, html, path, url) = (
      input.topic_id,
      input.title.clone(),
      input.html_content.clone(),
      input.file_path.clone(),
      input.url.clone(),
    );

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO presentations
             (topic_id, title, html_content, fragments, file_path, url, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![topic_id, title, html, fragments, path, url, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Presentation {
      id,
      topic_id:     input.topic_id,
      title:        input.title,
      html_content: input.html_content,
      fragments:    input.fragments,
      file_path:    input.file_path,
      url:          input.url,
      created_at:   now,
    })
  }

  async fn latest_presentation(&self, topic_id: i64) -> Result<Option<Presentation>> {
    let sql = format!(
      "SELECT {PRESENTATION_COLUMNS} FROM presentations p
       WHERE p.topic_id = ?1
       ORDER BY p.created_at DESC, p.id DESC LIMIT 1"
    );
    self.query_presentation(sql, vec![Value::Integer(topic_id)]).await
  }

  async fn find_latest_presentation(&self, text: &str) -> Result<Option<Presentation>> {
    let sql = format!(
      "SELECT {PRESENTATION_COLUMNS} FROM presentations p
       JOIN researched_topics r ON r.id = p.topic_id
       WHERE r.topic LIKE ?1 ESCAPE '\\'
       ORDER BY p.created_at DESC, p.id DESC LIMIT 1"
    );
    let pattern = Value::Text(contains_pattern(text));
    self.query_presentation(sql, vec![pattern]).await
  }

  async fn presentations_matching(&self, terms: &[String]) -> Result<Vec<MatchedPresentation>> {
    let terms: Vec<&str> = terms
      .iter()
      .map(|t| t.trim())
      .filter(|t| !t.is_empty())
      .collect();
    if terms.is_empty() {
      return Ok(vec![]);
    }

    let conds = (1..=terms.len())
      .map(|n| format!("r.topic LIKE ?{n} ESCAPE '\\'"))
      .collect::<Vec<_>>()
      .join(" OR ");
    let params: Vec<Value> = terms
      .iter()
      .map(|t| Value::Text(contains_pattern(t)))
      .collect();
    let sql = format!(
      "SELECT {PRESENTATION_COLUMNS}, r.topic FROM presentations p
       JOIN researched_topics r ON r.id = p.topic_id
       WHERE p.id = (
           SELECT p2.id FROM presentations p2
           WHERE p2.topic_id = p.topic_id
           ORDER BY p2.created_at DESC, p2.id DESC LIMIT 1
         )
         AND ({conds})
       ORDER BY r.created_at ASC, r.id ASC"
    );

    let raws: Vec<(RawPresentation, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok((RawPresentation::from_row(row)?, row.get(8)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(raw, topic)| {
        Ok(MatchedPresentation { presentation: raw.into_presentation()?, topic })
      })
      .collect()
  }

  // ── Consolidated pages ────────────────────────────────────────────────────

  async fn add_consolidated_page(&self, input: NewConsolidatedPage) -> Result<ConsolidatedPage> {
    let now    = Utc::now();
    let at_str = encode_dt(now);
    let (category, display, path, url) = (
      input.category.clone(),
      input.display_name.clone(),
      input.file_path.clone(),
      input.url.clone(),
    );

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO consolidated_pages
             (category, display_name, file_path, url, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![category, display, path, url, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ConsolidatedPage {
      id,
      category:     input.category,
      display_name: input.display_name,
      file_path:    input.file_path,
      url:          input.url,
      created_at:   now,
      updated_at:   now,
    })
  }

  async fn list_consolidated_pages(&self) -> Result<Vec<ConsolidatedPage>> {
    let raws: Vec<RawConsolidatedPage> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONSOLIDATED_COLUMNS} FROM consolidated_pages
           ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawConsolidatedPage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawConsolidatedPage::into_page).collect()
  }

  // ── Conversations ─────────────────────────────────────────────────────────

  async fn conversation(&self, session_id: &str) -> Result<Conversation> {
    let session_id = session_id.to_owned();
    let at_str     = encode_dt(Utc::now());

    let raw: RawConversation = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO conversations (session_id, created_at) VALUES (?1, ?2)
           ON CONFLICT(session_id) DO NOTHING",
          rusqlite::params![session_id, at_str],
        )?;
        Ok(conn.query_row(
          "SELECT id, session_id, created_at FROM conversations WHERE session_id = ?1",
          rusqlite::params![session_id],
          RawConversation::from_row,
        )?)
      })
      .await?;

    raw.into_conversation()
  }

  async fn find_conversation(&self, session_id: &str) -> Result<Option<Conversation>> {
    let session_id = session_id.to_owned();

    let raw: Option<RawConversation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, session_id, created_at FROM conversations WHERE session_id = ?1",
              rusqlite::params![session_id],
              RawConversation::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawConversation::into_conversation).transpose()
  }

  async fn add_message(
    &self,
    conversation_id: i64,
    role:            ChatRole,
    content:         String,
  ) -> Result<ChatMessage> {
    let now      = Utc::now();
    let at_str   = encode_dt(now);
    let role_str = role.as_str();
    let text     = content.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO messages (conversation_id, role, content, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![conversation_id, role_str, text, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ChatMessage { id, conversation_id, role, content, created_at: now })
  }

  async fn recent_messages(&self, conversation_id: i64, limit: usize) -> Result<Vec<ChatMessage>> {
    let limit = limit as i64;

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, conversation_id, role, content, created_at
           FROM messages WHERE conversation_id = ?1
           ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![conversation_id, limit], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut messages: Vec<ChatMessage> = raws
      .into_iter()
      .map(RawMessage::into_message)
      .collect::<Result<_>>()?;
    messages.reverse();
    Ok(messages)
  }

  // ── Contributions ─────────────────────────────────────────────────────────

  async fn submit_contribution(&self, input: NewContribution) -> Result<Contribution> {
    let at_str = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contributions (
             title, content, city_name, topic_name, year, source_name,
             source_url, contributor_name, contributor_email, status, submitted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'pending', ?10)",
          rusqlite::params![
            input.title,
            input.content,
            input.city_name,
            input.topic_name,
            input.year,
            input.source_name,
            input.source_url,
            input.contributor_name,
            input.contributor_email,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    self
      .fetch_contribution(id)
      .await?
      .ok_or_else(|| Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::QueryReturnedNoRows,
      )))
  }

  async fn list_contributions(
    &self,
    status: Option<ContributionStatus>,
  ) -> Result<Vec<Contribution>> {
    let status_str = status.map(ContributionStatus::as_str);

    let raws: Vec<RawContribution> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTRIBUTION_COLUMNS} FROM contributions
           WHERE ?1 IS NULL OR status = ?1
           ORDER BY submitted_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status_str], RawContribution::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContribution::into_contribution).collect()
  }

  async fn review_contribution(
    &self,
    id:     i64,
    review: ContributionReview,
  ) -> Result<ReviewResult> {
    let at_str = encode_dt(Utc::now());

    let row = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let raw = tx
          .query_row(
            &format!("SELECT {CONTRIBUTION_COLUMNS} FROM contributions WHERE id = ?1"),
            rusqlite::params![id],
            RawContribution::from_row,
          )
          .optional()?;
        let Some(raw) = raw else {
          return Ok(ReviewRow::Missing);
        };
        if raw.status != ContributionStatus::Pending.as_str() {
          return Ok(ReviewRow::AlreadyReviewed(raw.status));
        }

        let status = if review.approve {
          ContributionStatus::Approved
        } else {
          ContributionStatus::Rejected
        };
        tx.execute(
          "UPDATE contributions SET status = ?1, reviewed_at = ?2 WHERE id = ?3",
          rusqlite::params![status.as_str(), at_str, id],
        )?;

        let fact_id = if review.approve {
          let city_id: Option<i64> = match raw.city_name.as_deref() {
            Some(name) => tx
              .query_row(
                "SELECT id FROM cities WHERE lower(name) = lower(?1)",
                rusqlite::params![name],
                |r| r.get(0),
              )
              .optional()?,
            None => None,
          };
          let topic_id: Option<i64> = match raw.topic_name.as_deref() {
            Some(name) => tx
              .query_row(
                "SELECT id FROM topics WHERE lower(name) = lower(?1)",
                rusqlite::params![name],
                |r| r.get(0),
              )
              .optional()?,
            None => None,
          };
          tx.execute(
            "INSERT INTO historical_facts (
               title, content, year, city_id, topic_id, source_name,
               source_url, verified, importance, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9)",
            rusqlite::params![
              raw.title,
              raw.content,
              raw.year,
              city_id,
              topic_id,
              raw.source_name,
              raw.source_url,
              review.importance,
              at_str,
            ],
          )?;
          Some(tx.last_insert_rowid())
        } else {
          None
        };

        tx.commit()?;
        Ok(ReviewRow::Reviewed { fact_id })
      })
      .await?;

    let fact_id = match row {
      ReviewRow::Missing => return Ok(ReviewResult::NotFound),
      ReviewRow::AlreadyReviewed(status) => {
        return Ok(ReviewResult::AlreadyReviewed(status.parse()?));
      }
      ReviewRow::Reviewed { fact_id } => fact_id,
    };

    let Some(contribution) = self.fetch_contribution(id).await? else {
      return Ok(ReviewResult::NotFound);
    };
    let fact = match fact_id {
      Some(fid) => self.fetch_fact(fid).await?,
      None => None,
    };

    tracing::info!(
      contribution_id = id,
      status = %contribution.status,
      fact_id = ?fact_id,
      "contribution reviewed"
    );

    Ok(ReviewResult::Reviewed(ReviewOutcome { contribution, fact }))
  }
}
