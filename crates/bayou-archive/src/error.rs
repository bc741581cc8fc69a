use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("network error: {0}")]
  Network(String),

  #[error("archive error (status {status}): {message}")]
  Api { status: u16, message: String },

  #[error("parse error: {0}")]
  Parse(String),

  #[error("empty response body from {0}")]
  EmptyBody(String),
}

impl From<reqwest::Error> for ArchiveError {
  fn from(err: reqwest::Error) -> Self { ArchiveError::Network(err.to_string()) }
}

impl From<serde_json::Error> for ArchiveError {
  fn from(err: serde_json::Error) -> Self { ArchiveError::Parse(err.to_string()) }
}
