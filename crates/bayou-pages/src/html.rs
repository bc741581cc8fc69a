//! HTML templates. Every page is a single self-contained document with
//! inline styling.
//!
//! Topic pages wrap their content in `<section class="hero">`,
//! `<section class="gallery">` and `<section class="facts">`; consolidation
//! relies on these markers when a presentation has no stored fragments.

use bayou_core::research::{FactCard, GalleryItem, MediaKind, PageFragments};
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::category::Category;

const STYLE: &str = r#"
body { margin:0; font-family:Georgia,'Times New Roman',serif; background:#f7f3ea; color:#2b2118; line-height:1.6; }
header.banner { background:#5b3a1e; color:#f7f3ea; padding:32px 24px; }
header.banner h1 { margin:0; font-size:2.2em; }
header.banner p { margin:8px 0 0; opacity:.85; }
main { max-width:960px; margin:0 auto; padding:24px; }
section { margin-bottom:32px; }
section h2 { border-bottom:2px solid #c9a66b; padding-bottom:4px; }
.gallery-grid { display:grid; grid-template-columns:repeat(auto-fill,minmax(220px,1fr)); gap:16px; }
figure.media { margin:0; background:#fff; border:1px solid #e0d5c1; border-radius:6px; padding:8px; }
figure.media img, figure.media video { width:100%; border-radius:4px; }
figure.media audio { width:100%; }
figcaption { font-size:.85em; color:#5e5040; margin-top:6px; }
article.fact { background:#fff; border-left:4px solid #c9a66b; padding:12px 16px; margin-bottom:12px; border-radius:4px; }
article.fact h3 { margin:0 0 4px; }
.fact-meta, .fact-source { font-size:.85em; color:#7a6a55; margin:0; }
.empty { color:#8c7d68; font-style:italic; }
footer { text-align:center; font-size:.8em; color:#8c7d68; padding:24px; }
.tab-bar { display:flex; flex-wrap:wrap; gap:4px; border-bottom:2px solid #c9a66b; margin-bottom:16px; }
.tab-button { background:#e9dfcc; border:none; padding:8px 14px; cursor:pointer; font:inherit; border-radius:4px 4px 0 0; }
.tab-button.active { background:#5b3a1e; color:#f7f3ea; }
.tab-pane { display:none; }
.tab-pane.active { display:block; }
"#;

const TAB_SCRIPT: &str = r#"
<script>
document.querySelectorAll('.tab-button').forEach(function (button) {
  button.addEventListener('click', function () {
    document.querySelectorAll('.tab-button').forEach(function (b) { b.classList.remove('active'); });
    document.querySelectorAll('.tab-pane').forEach(function (p) { p.classList.remove('active'); });
    button.classList.add('active');
    document.getElementById(button.dataset.tab).classList.add('active');
  });
});
</script>
"#;

fn build_page(title: &str, header: &str, body: &str, script: &str, generated_at: DateTime<Utc>) -> String {
  format!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Southeast Texas History</title>
<style>{STYLE}</style>
</head>
<body>
{header}
<main>
{body}
</main>
<footer>Generated {generated} by the Bayou history assistant.</footer>
{script}
</body>
</html>
"#,
    title = text(title),
    generated = generated_at.format("%B %-d, %Y %H:%M UTC"),
  )
}

// ─── Topic page ──────────────────────────────────────────────────────────────

/// A complete page for one researched topic.
pub fn topic_page(fragments: &PageFragments, generated_at: DateTime<Utc>) -> String {
  let header = format!(
    r#"<header class="banner"><h1 class="page-title">{}</h1><p>Southeast Texas History</p></header>"#,
    text(&fragments.title),
  );
  let body = format!(
    "<section class=\"hero\">{}</section>\n<section class=\"gallery\">{}</section>\n<section class=\"facts\">{}</section>",
    hero_section(fragments),
    gallery_section(&fragments.gallery),
    facts_section(&fragments.facts),
  );
  build_page(&fragments.title, &header, &body, "", generated_at)
}

/// Inner HTML of the hero section.
pub fn hero_section(fragments: &PageFragments) -> String {
  format!("<p class=\"summary\">{}</p>", text(&fragments.summary))
}

/// Inner HTML of the gallery section.
pub fn gallery_section(items: &[GalleryItem]) -> String {
  if items.is_empty() {
    return r#"<h2>Gallery</h2><p class="empty">No archival media found yet.</p>"#.to_owned();
  }

  let mut figures = String::new();
  for item in items {
    let url = attr(&item.url);
    let player = match item.kind {
      MediaKind::Image => {
        format!(r#"<img src="{url}" alt="{}" loading="lazy">"#, attr(&item.title))
      }
      MediaKind::Audio => format!(r#"<audio controls preload="none" src="{url}"></audio>"#),
      MediaKind::Video => format!(r#"<video controls preload="none" src="{url}"></video>"#),
    };
    let source = item
      .source
      .as_deref()
      .map(|s| format!("<br><small>{}</small>", text(s)))
      .unwrap_or_default();
    figures.push_str(&format!(
      r#"<figure class="media">{player}<figcaption>{}{source}</figcaption></figure>"#,
      text(&item.title),
    ));
  }
  format!(r#"<h2>Gallery</h2><div class="gallery-grid">{figures}</div>"#)
}

/// Inner HTML of the facts section.
pub fn facts_section(cards: &[FactCard]) -> String {
  if cards.is_empty() {
    return r#"<h2>Historical Facts</h2><p class="empty">No recorded facts match this topic yet.</p>"#
      .to_owned();
  }

  let mut articles = String::new();
  for card in cards {
    let meta = [
      card.year.map(|y| y.to_string()),
      card.city.as_deref().map(|c| text(c).into_owned()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" | ");
    let meta = if meta.is_empty() {
      String::new()
    } else {
      format!(r#"<p class="fact-meta">{meta}</p>"#)
    };

    let source = match (card.source_name.as_deref(), card.source_url.as_deref()) {
      (Some(name), Some(url)) => format!(
        r#"<p class="fact-source">Source: <a href="{}" rel="noopener">{}</a></p>"#,
        attr(url),
        text(name)
      ),
      (Some(name), None) => format!(r#"<p class="fact-source">Source: {}</p>"#, text(name)),
      (None, Some(url)) => format!(
        r#"<p class="fact-source">Source: <a href="{0}" rel="noopener">{1}</a></p>"#,
        attr(url),
        text(url)
      ),
      (None, None) => String::new(),
    };

    articles.push_str(&format!(
      r#"<article class="fact"><h3>{}</h3>{meta}<p>{}</p>{source}</article>"#,
      text(&card.title),
      text(&card.content),
    ));
  }
  format!("<h2>Historical Facts</h2>{articles}")
}

// ─── Consolidated page ───────────────────────────────────────────────────────

/// One tab of a consolidated page. All `*_html` fields are trusted markup.
#[derive(Debug, Clone, Default)]
pub struct Tab {
  /// Plain-text label shown on the tab button.
  pub label:        String,
  pub title_html:   String,
  pub hero_html:    String,
  pub gallery_html: String,
  pub facts_html:   String,
  pub page_url:     String,
}

pub fn consolidated_page(category: &Category, tabs: &[Tab], generated_at: DateTime<Utc>) -> String {
  let header = format!(
    r#"<header class="banner"><h1 class="page-title">{}</h1><p>{}</p></header>"#,
    text(category.display_name),
    text(category.description),
  );

  let mut buttons = String::new();
  let mut panes = String::new();
  for (i, tab) in tabs.iter().enumerate() {
    let active = if i == 0 { " active" } else { "" };
    buttons.push_str(&format!(
      r#"<button class="tab-button{active}" data-tab="tab-{i}">{}</button>"#,
      text(&tab.label),
    ));
    panes.push_str(&format!(
      r#"<div class="tab-pane{active}" id="tab-{i}"><h2>{title}</h2><div class="hero">{hero}</div><div class="gallery">{gallery}</div><div class="facts">{facts}</div><p class="fact-source"><a href="{url}">Open the full page</a></p></div>"#,
      title = tab.title_html,
      hero = tab.hero_html,
      gallery = tab.gallery_html,
      facts = tab.facts_html,
      url = attr(&tab.page_url),
    ));
  }

  let body = format!(r#"<nav class="tab-bar">{buttons}</nav>{panes}"#);
  build_page(category.display_name, &header, &body, TAB_SCRIPT, generated_at)
}
