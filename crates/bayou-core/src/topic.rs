//! Topic extraction from free-text queries.
//!
//! Extraction is pure pattern matching: a fixed vocabulary of known regional
//! subjects is tried first (most specific first), then generic question
//! templates. Finding no topic is a normal outcome.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum number of keywords kept by [`extract_keywords`].
pub const MAX_KEYWORDS: usize = 5;

/// Words that never become keywords. Tokens of three characters or fewer are
/// dropped separately.
const STOP_WORDS: &[&str] = &[
  "tell", "about", "what", "when", "where", "which", "whom", "were", "does",
  "that", "this", "these", "those", "with", "from", "have", "into", "your",
  "there", "their", "they", "them", "then", "than", "know", "like", "more",
  "some", "please", "could", "would", "should", "give", "show", "info",
  "information", "history", "historical", "learn", "anything", "something",
  "happened", "much", "many", "also", "just", "very",
];

// ─── Patterns ────────────────────────────────────────────────────────────────

struct Pattern {
  regex:     Regex,
  /// Fixed spelling returned for vocabulary matches. Templates return their
  /// first capture group instead.
  canonical: Option<&'static str>,
}

/// Known subjects, most specific first.
const VOCABULARY: &[(&str, &str)] = &[
  (r"\bspindletop\b", "Spindletop"),
  (r"\blucas\s+gusher\b", "Lucas Gusher"),
  (r"\bgladys\s+city\b", "Gladys City"),
  (r"\bhurricane\s+rita\b", "Hurricane Rita"),
  (r"\bhurricane\s+ike\b", "Hurricane Ike"),
  (r"\bhurricane\s+harvey\b", "Hurricane Harvey"),
  (r"\bhurricane\s+audrey\b", "Hurricane Audrey"),
  (r"\bjanis\s+joplin\b", "Janis Joplin"),
  (r"\bbig\s+bopper\b", "Big Bopper"),
  (r"\bbabe\s+didrikson\b", "Babe Didrikson Zaharias"),
  (r"\bgeorge\s+jones\b", "George Jones"),
  (r"\blamar\s+university\b", "Lamar University"),
  (r"\bbig\s+thicket\b", "Big Thicket"),
  (r"\bsabine\s+pass\b", "Sabine Pass"),
  (r"\bport\s+arthur\b", "Port Arthur"),
  (r"\bport\s+neches\b", "Port Neches"),
  (r"\bbeaumont\b", "Beaumont"),
  (r"\bnederland\b", "Nederland"),
  (r"\bgroves\b", "Groves"),
  (r"\bvidor\b", "Vidor"),
  (r"\bsilsbee\b", "Silsbee"),
  (r"\borange\b", "Orange"),
  (r"\boil\s+(?:boom|industry|discovery)\b", "Oil Boom"),
  (r"\bpetrochemical", "Petrochemical Industry"),
  (r"\bshipbuilding\b|\bshipyards?\b", "Shipbuilding"),
  (r"\b(?:lumber|timber)\s+(?:industry|boom|mills?)\b", "Lumber Industry"),
  (r"\brice\s+(?:farming|industry|mills?)\b", "Rice Farming"),
];

/// Generic question templates; the first capture group is the topic.
const TEMPLATES: &[&str] = &[
  r"\btell\s+me\s+(?:more\s+)?about\s+(?:the\s+)?(.+)",
  r"\bwhat\s+(?:is|was|were)\s+(?:the\s+)?(.+)",
  r"\bhow\s+did\s+(?:the\s+)?(.+?)(?:\s+(?:start|begin|happen|develop|change|affect|impact|grow|end)\b.*)?$",
  r"\bhistory\s+of\s+(?:the\s+)?(.+)",
  r"\bwho\s+(?:is|was|were)\s+(.+)",
];

static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
  let vocabulary = VOCABULARY.iter().map(|(re, canonical)| Pattern {
    regex:     compile(re),
    canonical: Some(*canonical),
  });
  let templates = TEMPLATES.iter().map(|re| Pattern {
    regex:     compile(re),
    canonical: None,
  });
  vocabulary.chain(templates).collect()
});

fn compile(pattern: &str) -> Regex {
  Regex::new(&format!("(?i){pattern}")).expect("topic patterns are valid")
}

// ─── Extraction ──────────────────────────────────────────────────────────────

/// Derive a best-guess topic from `text`, or `None` if nothing matches.
pub fn extract_topic(text: &str) -> Option<String> {
  let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
  if normalized.is_empty() {
    return None;
  }

  for pattern in PATTERNS.iter() {
    let Some(caps) = pattern.regex.captures(&normalized) else {
      continue;
    };
    if let Some(canonical) = pattern.canonical {
      return Some(canonical.to_owned());
    }
    let topic = caps
      .get(1)
      .map(|m| clean_capture(m.as_str()))
      .unwrap_or_default();
    if !topic.is_empty() {
      return Some(topic);
    }
  }
  None
}

fn clean_capture(s: &str) -> String {
  s.trim()
    .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
    .to_owned()
}

/// Up to [`MAX_KEYWORDS`] lowercase keywords from `text`, in original order.
///
/// Tokens are split on whitespace and stripped of surrounding punctuation;
/// stop-words and tokens of three characters or fewer are dropped. No
/// stemming and no deduplication.
pub fn extract_keywords(text: &str) -> Vec<String> {
  text
    .to_lowercase()
    .split_whitespace()
    .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
    .filter(|t| t.chars().count() > 3 && !STOP_WORDS.contains(t))
    .take(MAX_KEYWORDS)
    .map(str::to_owned)
    .collect()
}

// ─── Identity and file names ─────────────────────────────────────────────────

/// Identity key for a researched topic: lowercase with collapsed whitespace.
pub fn topic_key(topic: &str) -> String {
  topic
    .to_lowercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Lowercase ASCII alphanumerics joined by single dashes.
///
/// Returns `"untitled"` when nothing usable remains.
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  for c in text.chars() {
    if c.is_ascii_alphanumeric() {
      slug.push(c.to_ascii_lowercase());
    } else if !slug.ends_with('-') && !slug.is_empty() {
      slug.push('-');
    }
  }
  let slug = slug.trim_end_matches('-');
  if slug.is_empty() {
    "untitled".to_owned()
  } else {
    slug.to_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn named_subject_wins_regardless_of_phrasing() {
    for q in [
      "Tell me about Spindletop",
      "spindletop?",
      "What happened at SPINDLETOP in 1901",
      "How did the Spindletop discovery change Beaumont",
      "I want to   learn\nabout spindletop please",
    ] {
      assert_eq!(extract_topic(q).as_deref(), Some("Spindletop"), "query: {q}");
    }
  }

  #[test]
  fn vocabulary_is_tried_before_templates() {
    assert_eq!(
      extract_topic("What was life like in Port Arthur?").as_deref(),
      Some("Port Arthur")
    );
  }

  #[test]
  fn templates_capture_the_subject() {
    assert_eq!(
      extract_topic("Tell me about the Neches River ferry.").as_deref(),
      Some("Neches River ferry")
    );
    assert_eq!(
      extract_topic("what were streetcars").as_deref(),
      Some("streetcars")
    );
    assert_eq!(
      extract_topic("How did the cotton trade begin here?").as_deref(),
      Some("cotton trade")
    );
    assert_eq!(
      extract_topic("the history of Jefferson County").as_deref(),
      Some("Jefferson County")
    );
  }

  #[test]
  fn unmatched_text_yields_none() {
    assert_eq!(extract_topic("hello there"), None);
    assert_eq!(extract_topic(""), None);
    assert_eq!(extract_topic("   "), None);
  }

  #[test]
  fn keywords_drop_stop_words_and_short_tokens() {
    let kw = extract_keywords("Tell me about the Spindletop oil discovery in 1901");
    assert_eq!(kw, vec!["spindletop", "discovery", "1901"]);
    assert!(!kw.contains(&"tell".to_owned()));
    assert!(!kw.contains(&"about".to_owned()));
    assert!(!kw.contains(&"the".to_owned()));
  }

  #[test]
  fn keywords_are_capped_and_keep_order() {
    let kw = extract_keywords(
      "beaumont refinery workers strike union wages housing railroad",
    );
    assert_eq!(kw, vec!["beaumont", "refinery", "workers", "strike", "union"]);
  }

  #[test]
  fn keywords_keep_duplicates() {
    let kw = extract_keywords("gusher gusher gusher");
    assert_eq!(kw.len(), 3);
  }

  #[test]
  fn topic_key_normalises_case_and_spacing() {
    assert_eq!(topic_key("  Port   Arthur "), "port arthur");
    assert_eq!(topic_key("PORT ARTHUR"), topic_key("port arthur"));
  }

  #[test]
  fn slugify_produces_file_safe_names() {
    assert_eq!(slugify("Spindletop"), "spindletop");
    assert_eq!(slugify("Hurricane Rita (2005)!"), "hurricane-rita-2005");
    assert_eq!(slugify("--Big  Thicket--"), "big-thicket");
    assert_eq!(slugify("???"), "untitled");
  }
}
