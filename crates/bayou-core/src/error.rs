//! Error types for `bayou-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown media kind: {0:?}")]
  UnknownMediaKind(String),

  #[error("unknown chat role: {0:?}")]
  UnknownChatRole(String),

  #[error("unknown contribution status: {0:?}")]
  UnknownContributionStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
