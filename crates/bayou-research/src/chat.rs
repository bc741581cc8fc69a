//! Minimal client for an OpenAI-compatible chat-completion endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error)]
pub enum ChatError {
  #[error("network error: {0}")]
  Network(String),

  #[error("chat API error (status {status}): {message}")]
  Api { status: u16, message: String },

  #[error("chat response had no content")]
  EmptyResponse,
}

impl From<reqwest::Error> for ChatError {
  fn from(err: reqwest::Error) -> Self { ChatError::Network(err.to_string()) }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
  pub role:    &'static str,
  pub content: String,
}

impl ChatTurn {
  pub fn new(role: &'static str, content: impl Into<String>) -> Self {
    Self { role, content: content.into() }
  }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:    &'a str,
  messages: &'a [ChatTurn],
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
  content: Option<String>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

pub struct ChatClient {
  http:     reqwest::Client,
  base_url: String,
  model:    String,
  api_key:  Option<String>,
}

impl ChatClient {
  pub fn new(api_key: Option<String>) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: DEFAULT_BASE_URL.to_owned(),
      model: DEFAULT_MODEL.to_owned(),
      api_key,
    }
  }

  pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
    self.base_url = url.into();
    self
  }

  pub fn with_model(mut self, model: impl Into<String>) -> Self {
    self.model = model.into();
    self
  }

  pub fn model(&self) -> &str { &self.model }

  /// Send `messages` and return the first choice's content.
  pub async fn complete(&self, messages: &[ChatTurn]) -> Result<String, ChatError> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    tracing::debug!(model = %self.model, turns = messages.len(), "chat completion request");

    let mut request = self
      .http
      .post(&url)
      .json(&ChatRequest { model: &self.model, messages });
    if let Some(key) = &self.api_key {
      request = request.bearer_auth(key);
    }
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
      let message = response.text().await.unwrap_or_default();
      return Err(ChatError::Api { status: status.as_u16(), message });
    }

    let body: ChatResponse = response.json().await?;
    body
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .filter(|c| !c.trim().is_empty())
      .ok_or(ChatError::EmptyResponse)
  }
}
