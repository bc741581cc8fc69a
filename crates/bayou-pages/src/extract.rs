//! Pattern extraction of page sections from stored topic-page HTML.
//!
//! Only used for presentations that carry no structured fragments.

use std::sync::LazyLock;

use regex::Regex;

static TITLE: LazyLock<Regex> = LazyLock::new(|| pattern(r"<h1[^>]*>(.*?)</h1>"));
static HERO: LazyLock<Regex> = LazyLock::new(|| section("hero"));
static GALLERY: LazyLock<Regex> = LazyLock::new(|| section("gallery"));
static FACTS: LazyLock<Regex> = LazyLock::new(|| section("facts"));

fn pattern(re: &str) -> Regex {
  Regex::new(&format!("(?is){re}")).expect("extraction patterns are valid")
}

fn section(class: &str) -> Regex {
  pattern(&format!(r#"<section\s+class="{class}"[^>]*>(.*?)</section>"#))
}

/// Sections recovered from a topic page. A section that could not be found
/// is empty.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExtractedPage {
  pub title:   Option<String>,
  pub hero:    String,
  pub gallery: String,
  pub facts:   String,
}

pub fn extract_page(html: &str) -> ExtractedPage {
  let capture = |re: &Regex| {
    re.captures(html)
      .and_then(|c| c.get(1))
      .map(|m| m.as_str().trim().to_owned())
  };

  ExtractedPage {
    title:   capture(&TITLE).filter(|t| !t.is_empty()),
    hero:    capture(&HERO).unwrap_or_default(),
    gallery: capture(&GALLERY).unwrap_or_default(),
    facts:   capture(&FACTS).unwrap_or_default(),
  }
}
