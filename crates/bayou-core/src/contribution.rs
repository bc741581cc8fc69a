//! Public contributions awaiting review.
//!
//! A contribution is never edited. Review moves it from `Pending` to exactly
//! one of `Approved` or `Rejected`; approval also records a verified
//! [`HistoricalFact`](crate::history::HistoricalFact).

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, history::HistoricalFact};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionStatus {
  Pending,
  Approved,
  Rejected,
}

impl ContributionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }
}

impl fmt::Display for ContributionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ContributionStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(Self::Pending),
      "approved" => Ok(Self::Approved),
      "rejected" => Ok(Self::Rejected),
      other => Err(Error::UnknownContributionStatus(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
  pub id:                i64,
  pub title:             String,
  pub content:           String,
  pub city_name:         Option<String>,
  pub topic_name:        Option<String>,
  pub year:              Option<i32>,
  pub source_name:       Option<String>,
  pub source_url:        Option<String>,
  pub contributor_name:  Option<String>,
  pub contributor_email: Option<String>,
  pub status:            ContributionStatus,
  pub submitted_at:      DateTime<Utc>,
  pub reviewed_at:       Option<DateTime<Utc>>,
}

/// Input to [`crate::store::HistoryStore::submit_contribution`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewContribution {
  pub title:             String,
  pub content:           String,
  pub city_name:         Option<String>,
  pub topic_name:        Option<String>,
  pub year:              Option<i32>,
  pub source_name:       Option<String>,
  pub source_url:        Option<String>,
  pub contributor_name:  Option<String>,
  pub contributor_email: Option<String>,
}

/// A reviewer's decision.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ContributionReview {
  pub approve:    bool,
  /// Importance assigned to the resulting fact; defaults to 0.
  #[serde(default)]
  pub importance: i64,
}

/// Result of a review: the updated contribution and, when approved, the
/// fact it produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
  pub contribution: Contribution,
  pub fact:         Option<HistoricalFact>,
}

/// What a review request did.
#[derive(Debug, Clone)]
pub enum ReviewResult {
  /// No contribution has this id.
  NotFound,
  /// The contribution was already reviewed; carries its current status.
  AlreadyReviewed(ContributionStatus),
  Reviewed(ReviewOutcome),
}
