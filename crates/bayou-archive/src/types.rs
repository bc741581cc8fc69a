use serde::Deserialize;

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
  #[serde(default)]
  pub results: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
  pub title:     Option<String>,
  /// Landing page of the item in the archive.
  pub url:       Option<String>,
  pub image:     Option<ImageLinks>,
  #[serde(default)]
  pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageLinks {
  pub full: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
  pub mime_type: Option<String>,
  pub url:       Option<String>,
}

// ─── Hits ────────────────────────────────────────────────────────────────────

/// A downloadable asset found by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHit {
  pub title:        String,
  /// Direct URL of the binary payload.
  pub download_url: String,
  /// Landing page used for attribution; falls back to the download URL.
  pub item_url:     String,
}

/// Time-based media families that carry their payload in `resources[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
  Audio,
  Video,
}

impl Family {
  fn mime_prefix(self) -> &'static str {
    match self {
      Self::Audio => "audio/",
      Self::Video => "video/",
    }
  }

  fn extensions(self) -> &'static [&'static str] {
    match self {
      Self::Audio => &["mp3", "wav", "ogg", "m4a"],
      Self::Video => &["mp4", "webm", "mov"],
    }
  }

  fn matches_url(self, url: &str) -> bool {
    url_extension(url).is_some_and(|ext| self.extensions().contains(&ext.as_str()))
  }
}

/// Lowercased extension of the last path segment, ignoring query and
/// fragment.
fn url_extension(url: &str) -> Option<String> {
  let path = url.split(['?', '#']).next()?;
  let segment = path.rsplit('/').next()?;
  let (_, ext) = segment.rsplit_once('.')?;
  (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Pick the resource URL of `family` from an item: the first resource whose
/// MIME type is in the family or whose URL ends in one of its extensions.
pub fn select_resource(item: &SearchItem, family: Family) -> Option<String> {
  item.resources.iter().find_map(|r| {
    let url = r.url.as_deref()?;
    let mime_ok = r
      .mime_type
      .as_deref()
      .is_some_and(|m| m.to_ascii_lowercase().starts_with(family.mime_prefix()));
    (mime_ok || family.matches_url(url)).then(|| absolute(url))
  })
}

/// Archive URLs are sometimes protocol-relative.
pub(crate) fn absolute(url: &str) -> String {
  if url.starts_with("//") {
    format!("https:{url}")
  } else {
    url.to_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(resources: &[(Option<&str>, &str)]) -> SearchItem {
    SearchItem {
      title:     Some("Gusher".into()),
      url:       None,
      image:     None,
      resources: resources
        .iter()
        .map(|(mime, url)| Resource {
          mime_type: mime.map(str::to_owned),
          url:       Some((*url).to_owned()),
        })
        .collect(),
    }
  }

  #[test]
  fn mime_type_selects_resource() {
    let it = item(&[
      (Some("text/html"), "https://a/item"),
      (Some("audio/mpeg"), "https://a/stream"),
    ]);
    assert_eq!(select_resource(&it, Family::Audio).as_deref(), Some("https://a/stream"));
  }

  #[test]
  fn extension_selects_resource() {
    let it = item(&[(None, "https://a/index.html"), (None, "https://a/reel.MP4?x=1")]);
    assert_eq!(select_resource(&it, Family::Video).as_deref(), Some("https://a/reel.MP4?x=1"));
    assert_eq!(select_resource(&it, Family::Audio), None);
  }

  #[test]
  fn items_without_usable_resources_yield_nothing() {
    assert_eq!(select_resource(&item(&[]), Family::Audio), None);
    let it = item(&[(Some("image/jpeg"), "https://a/photo.jpg")]);
    assert_eq!(select_resource(&it, Family::Video), None);
  }

  #[test]
  fn protocol_relative_urls_become_https() {
    assert_eq!(absolute("//tile.loc.gov/x.jpg"), "https://tile.loc.gov/x.jpg");
    assert_eq!(absolute("http://a/b"), "http://a/b");
  }
}
