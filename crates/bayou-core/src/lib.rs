//! Domain types shared by every Bayou crate: reference history data, the
//! research pipeline records, conversations and contributions, plus the
//! [`store::HistoryStore`] trait and topic extraction.
//!
//! Nothing here performs I/O.

pub mod chat;
pub mod contribution;
pub mod error;
pub mod history;
pub mod research;
pub mod store;
pub mod topic;

pub use error::{Error, Result};
