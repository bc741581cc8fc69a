//! Error types for `bayou-pages`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("researched topic {0} not found")]
  TopicNotFound(i64),

  #[error("unknown category: {0:?}")]
  UnknownCategory(String),

  #[error("store error: {0}")]
  Store(Box<dyn std::error::Error + Send + Sync>),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
