//! Conversations and their messages.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A chat session, keyed by the client's session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
  pub id:         i64,
  pub session_id: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
  System,
  User,
  Assistant,
}

impl ChatRole {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::System => "system",
      Self::User => "user",
      Self::Assistant => "assistant",
    }
  }
}

impl fmt::Display for ChatRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ChatRole {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "system" => Ok(Self::System),
      "user" => Ok(Self::User),
      "assistant" => Ok(Self::Assistant),
      other => Err(Error::UnknownChatRole(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
  pub id:              i64,
  pub conversation_id: i64,
  pub role:            ChatRole,
  pub content:         String,
  pub created_at:      DateTime<Utc>,
}
