//! The `HistoryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `bayou-store-sqlite`).
//! The pipeline crates (`bayou-pages`, `bayou-research`) and the HTTP layer
//! depend on this abstraction, not on any concrete backend. A store is
//! constructed once and shared as `Arc<S>`; it is closed when the last
//! reference drops.

use std::future::Future;

use crate::{
  chat::{ChatMessage, ChatRole, Conversation},
  contribution::{
    Contribution, ContributionReview, ContributionStatus, NewContribution,
    ReviewResult,
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
};

/// Abstraction over a Bayou store backend.
///
/// Media, presentation, consolidation and message writes are append-only.
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HistoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reference data ────────────────────────────────────────────────────

  fn add_city(
    &self,
    input: NewCity,
  ) -> impl Future<Output = Result<HistoricalCity, Self::Error>> + Send + '_;

  fn list_cities(
    &self,
  ) -> impl Future<Output = Result<Vec<HistoricalCity>, Self::Error>> + Send + '_;

  /// Returns `None` if no city has this id.
  fn get_city(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<HistoricalCity>, Self::Error>> + Send + '_;

  fn add_topic(
    &self,
    input: NewTopic,
  ) -> impl Future<Output = Result<HistoricalTopic, Self::Error>> + Send + '_;

  fn list_topics(
    &self,
  ) -> impl Future<Output = Result<Vec<HistoricalTopic>, Self::Error>> + Send + '_;

  /// Exact, case-insensitive lookup on the topic name.
  fn find_topic_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<HistoricalTopic>, Self::Error>> + Send + 'a;

  fn add_period(
    &self,
    input: NewPeriod,
  ) -> impl Future<Output = Result<HistoricalPeriod, Self::Error>> + Send + '_;

  fn list_periods(
    &self,
  ) -> impl Future<Output = Result<Vec<HistoricalPeriod>, Self::Error>> + Send + '_;

  // ── Facts ─────────────────────────────────────────────────────────────

  fn record_fact(
    &self,
    input: NewHistoricalFact,
  ) -> impl Future<Output = Result<HistoricalFact, Self::Error>> + Send + '_;

  /// Facts matching `query`, ordered by importance (descending) then year.
  fn list_facts<'a>(
    &'a self,
    query: &'a FactQuery,
  ) -> impl Future<Output = Result<Vec<HistoricalFact>, Self::Error>> + Send + 'a;

  /// Facts relevant to a free-text topic.
  ///
  /// If `topic` names a lookup-table topic exactly (case-insensitive), only
  /// facts linked to it are returned. Otherwise falls back to a substring
  /// match over topic name, city name, title and content. Ordered by
  /// importance (descending) then year, at most `limit` rows.
  fn facts_for_topic<'a>(
    &'a self,
    topic: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<HistoricalFact>, Self::Error>> + Send + 'a;

  // ── Researched topics and media ───────────────────────────────────────

  /// Persist a researched topic.
  ///
  /// Topics are identified by their normalised key: if a row with the same
  /// key exists it is returned unchanged instead of inserting a duplicate.
  fn create_topic(
    &self,
    input: NewResearchedTopic,
  ) -> impl Future<Output = Result<ResearchedTopic, Self::Error>> + Send + '_;

  fn get_researched_topic(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<ResearchedTopic>, Self::Error>> + Send + '_;

  /// All researched topics, newest first.
  fn list_researched_topics(
    &self,
  ) -> impl Future<Output = Result<Vec<ResearchedTopic>, Self::Error>> + Send + '_;

  /// Researched topics whose topic string contains `text`
  /// (case-insensitive), newest first.
  fn find_researched_topics<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Vec<ResearchedTopic>, Self::Error>> + Send + 'a;

  fn link_media(
    &self,
    input: NewTopicMedia,
  ) -> impl Future<Output = Result<TopicMedia, Self::Error>> + Send + '_;

  /// Media for a topic in insertion order.
  fn list_media(
    &self,
    topic_id: i64,
  ) -> impl Future<Output = Result<Vec<TopicMedia>, Self::Error>> + Send + '_;

  fn mark_page_generated(
    &self,
    topic_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Presentations ─────────────────────────────────────────────────────

  fn add_presentation(
    &self,
    input: NewPresentation,
  ) -> impl Future<Output = Result<Presentation, Self::Error>> + Send + '_;

  /// Newest presentation for a topic id.
  fn latest_presentation(
    &self,
    topic_id: i64,
  ) -> impl Future<Output = Result<Option<Presentation>, Self::Error>> + Send + '_;

  /// Newest presentation whose researched topic contains `text`
  /// (case-insensitive).
  fn find_latest_presentation<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Option<Presentation>, Self::Error>> + Send + 'a;

  /// The newest presentation of every researched topic whose topic string
  /// contains any of `terms` (case-insensitive), oldest topic first.
  fn presentations_matching<'a>(
    &'a self,
    terms: &'a [String],
  ) -> impl Future<Output = Result<Vec<MatchedPresentation>, Self::Error>> + Send + 'a;

  // ── Consolidated pages ────────────────────────────────────────────────

  fn add_consolidated_page(
    &self,
    input: NewConsolidatedPage,
  ) -> impl Future<Output = Result<ConsolidatedPage, Self::Error>> + Send + '_;

  /// All consolidation runs, newest first.
  fn list_consolidated_pages(
    &self,
  ) -> impl Future<Output = Result<Vec<ConsolidatedPage>, Self::Error>> + Send + '_;

  // ── Conversations ─────────────────────────────────────────────────────

  /// Return the conversation for `session_id`, creating it if needed.
  fn conversation<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = Result<Conversation, Self::Error>> + Send + 'a;

  fn find_conversation<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = Result<Option<Conversation>, Self::Error>> + Send + 'a;

  fn add_message(
    &self,
    conversation_id: i64,
    role: ChatRole,
    content: String,
  ) -> impl Future<Output = Result<ChatMessage, Self::Error>> + Send + '_;

  /// The last `limit` messages of a conversation, oldest first.
  fn recent_messages(
    &self,
    conversation_id: i64,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ChatMessage>, Self::Error>> + Send + '_;

  // ── Contributions ─────────────────────────────────────────────────────

  fn submit_contribution(
    &self,
    input: NewContribution,
  ) -> impl Future<Output = Result<Contribution, Self::Error>> + Send + '_;

  /// Contributions, optionally filtered by status, newest first.
  fn list_contributions(
    &self,
    status: Option<ContributionStatus>,
  ) -> impl Future<Output = Result<Vec<Contribution>, Self::Error>> + Send + '_;

  /// Approve or reject a pending contribution. Only pending contributions
  /// change; approval also records a verified fact.
  fn review_contribution(
    &self,
    id: i64,
    review: ContributionReview,
  ) -> impl Future<Output = Result<ReviewResult, Self::Error>> + Send + '_;
}
