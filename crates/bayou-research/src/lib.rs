//! The research pipeline: extract a topic from a question, collect archive
//! media for it, render its page and schedule category consolidation.
//!
//! Also home to the chat [`Assistant`], which answers questions from stored
//! facts through an OpenAI-compatible endpoint.

pub mod assistant;
pub mod chat;
pub mod collector;
pub mod error;
pub mod queue;
pub mod workflow;

pub use assistant::{Assistant, ChatReply};
pub use chat::{ChatClient, ChatError};
pub use collector::{Collection, MediaCollector};
pub use error::{Error, Result};
pub use queue::ConsolidationQueue;
pub use workflow::{Workflow, WorkflowOutcome};

#[cfg(test)]
mod tests;
