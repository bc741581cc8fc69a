//! [`Assistant`]: conversational answers grounded in stored facts.

use std::sync::Arc;

use bayou_core::{
  chat::{ChatMessage, ChatRole},
  history::{FactQuery, HistoricalFact},
  store::HistoryStore,
  topic::{extract_keywords, extract_topic},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  chat::{ChatClient, ChatTurn},
};

/// Facts included in the system prompt.
pub const CONTEXT_FACTS: usize = 8;
/// Conversation turns sent with each request, including the new message.
pub const HISTORY_TURNS: usize = 10;

pub const APOLOGY: &str = "I'm sorry, I can't reach my notes on Southeast Texas history right now. \
                           Please try again in a little while.";

const SYSTEM_PROMPT: &str = "You are a friendly local historian for Southeast Texas: Beaumont, \
Port Arthur, Orange and the surrounding Golden Triangle. Answer briefly and accurately. Prefer \
the facts listed below; if they do not cover the question, say what you know and note that it \
is not from the local archive.";

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
  pub session_id: String,
  pub reply:      String,
  /// Topic detected in the user's message, if any.
  pub topic:      Option<String>,
}

pub struct Assistant<S> {
  store: Arc<S>,
  chat:  ChatClient,
}

impl<S: HistoryStore> Assistant<S> {
  pub fn new(store: Arc<S>, chat: ChatClient) -> Self { Self { store, chat } }

  /// Answer `message` within the conversation `session_id`, starting a new
  /// conversation when no id is given.
  ///
  /// Chat endpoint failures produce [`APOLOGY`] rather than an error.
  pub async fn reply(&self, session_id: Option<&str>, message: &str) -> Result<ChatReply> {
    let session_id = session_id
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_owned)
      .unwrap_or_else(|| Uuid::new_v4().to_string());

    let conversation = self
      .store
      .conversation(&session_id)
      .await
      .map_err(Error::store)?;
    self
      .store
      .add_message(conversation.id, ChatRole::User, message.to_owned())
      .await
      .map_err(Error::store)?;

    let topic = extract_topic(message);
    let facts = self.context_facts(topic.as_deref(), message).await?;
    let history = self
      .store
      .recent_messages(conversation.id, HISTORY_TURNS)
      .await
      .map_err(Error::store)?;

    let turns = prompt(&facts, &history);
    let reply = match self.chat.complete(&turns).await {
      Ok(reply) => reply,
      Err(e) => {
        tracing::warn!(%session_id, error = %e, "chat completion failed");
        APOLOGY.to_owned()
      }
    };

    if let Err(e) = self
      .store
      .add_message(conversation.id, ChatRole::Assistant, reply.clone())
      .await
    {
      tracing::warn!(%session_id, error = %e, "failed to store assistant reply");
    }

    Ok(ChatReply { session_id, reply, topic })
  }

  /// Topic facts, else keyword matches, else the most important facts.
  async fn context_facts(&self, topic: Option<&str>, message: &str) -> Result<Vec<HistoricalFact>> {
    if let Some(topic) = topic {
      let facts = self
        .store
        .facts_for_topic(topic, CONTEXT_FACTS)
        .await
        .map_err(Error::store)?;
      if !facts.is_empty() {
        return Ok(facts);
      }
    }

    let mut facts: Vec<HistoricalFact> = Vec::new();
    for keyword in extract_keywords(message) {
      let query = FactQuery {
        text: Some(keyword),
        limit: Some(CONTEXT_FACTS),
        ..FactQuery::default()
      };
      for fact in self.store.list_facts(&query).await.map_err(Error::store)? {
        if facts.len() < CONTEXT_FACTS && !facts.iter().any(|f| f.id == fact.id) {
          facts.push(fact);
        }
      }
      if facts.len() >= CONTEXT_FACTS {
        break;
      }
    }
    if !facts.is_empty() {
      return Ok(facts);
    }

    let query = FactQuery { limit: Some(CONTEXT_FACTS), ..FactQuery::default() };
    self.store.list_facts(&query).await.map_err(Error::store)
  }
}

fn prompt(facts: &[HistoricalFact], history: &[ChatMessage]) -> Vec<ChatTurn> {
  let mut system = SYSTEM_PROMPT.to_owned();
  if !facts.is_empty() {
    system.push_str("\n\nFacts from the local archive:");
    for fact in facts {
      let year = fact.year.map(|y| format!(" ({y})")).unwrap_or_default();
      let city = fact
        .city_name
        .as_deref()
        .map(|c| format!(" [{c}]"))
        .unwrap_or_default();
      system.push_str(&format!("\n- {}{year}{city}: {}", fact.title, fact.content));
    }
  }

  std::iter::once(ChatTurn::new("system", system))
    .chain(
      history
        .iter()
        .map(|m| ChatTurn::new(m.role.as_str(), m.content.clone())),
    )
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn message(role: ChatRole, content: &str) -> ChatMessage {
    ChatMessage {
      id: 1,
      conversation_id: 1,
      role,
      content: content.to_owned(),
      created_at: Utc::now(),
    }
  }

  #[test]
  fn prompt_lists_facts_then_history() {
    let fact = HistoricalFact {
      id:          1,
      title:       "The Lucas Gusher".into(),
      content:     "Oil at Spindletop.".into(),
      event_date:  None,
      year:        Some(1901),
      city_id:     None,
      topic_id:    None,
      city_name:   Some("Beaumont".into()),
      topic_name:  None,
      source_name: None,
      source_url:  None,
      image_url:   None,
      verified:    true,
      importance:  10,
      created_at:  Utc::now(),
    };
    let history = [message(ChatRole::User, "hi"), message(ChatRole::Assistant, "hello")];

    let turns = prompt(&[fact], &history);
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].role, "system");
    assert!(turns[0].content.contains("- The Lucas Gusher (1901) [Beaumont]: Oil at Spindletop."));
    assert_eq!(turns[1], ChatTurn::new("user", "hi"));
    assert_eq!(turns[2].role, "assistant");
  }
}
