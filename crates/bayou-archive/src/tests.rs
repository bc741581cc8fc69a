use std::time::Duration;

use serde_json::json;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{method, path, query_param},
};

use crate::{ArchiveClient, ArchiveConfig, ArchiveError};

fn client(server: &MockServer) -> ArchiveClient {
  ArchiveClient::new(ArchiveConfig::with_base_url(server.uri())).unwrap()
}

#[tokio::test]
async fn search_images_keeps_items_with_full_image() {
  let server = MockServer::start().await;
  let body = json!({
    "results": [
      { "title": "Lucas Gusher, 1901", "url": "https://archive/item/1",
        "image": { "full": "//tile.archive/gusher.jpg" } },
      { "title": "No picture", "url": "https://archive/item/2" },
      { "title": "  ", "image": { "full": "https://tile.archive/derricks.jpg" } }
    ]
  });
  Mock::given(method("GET"))
    .and(path("/photos/"))
    .and(query_param("q", "Spindletop oil"))
    .and(query_param("fo", "json"))
    .respond_with(ResponseTemplate::new(200).set_body_json(body))
    .mount(&server)
    .await;

  let hits = client(&server).search_images("Spindletop oil", 9).await.unwrap();

  assert_eq!(hits.len(), 2);
  assert_eq!(hits[0].title, "Lucas Gusher, 1901");
  assert_eq!(hits[0].download_url, "https://tile.archive/gusher.jpg");
  assert_eq!(hits[0].item_url, "https://archive/item/1");
  assert_eq!(hits[1].title, "Untitled");
  assert_eq!(hits[1].item_url, hits[1].download_url);
}

#[tokio::test]
async fn search_audio_selects_playable_resources() {
  let server = MockServer::start().await;
  let body = json!({
    "results": [
      { "title": "Oral history", "resources": [
          { "mime_type": "text/html", "url": "https://archive/page" },
          { "mime_type": "audio/mpeg", "url": "https://archive/oral.mp3" } ] },
      { "title": "Transcript only", "resources": [
          { "url": "https://archive/transcript.pdf" } ] }
    ]
  });
  Mock::given(method("GET"))
    .and(path("/audio/"))
    .respond_with(ResponseTemplate::new(200).set_body_json(body))
    .mount(&server)
    .await;

  let hits = client(&server).search_audio("Spindletop", 4).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].download_url, "https://archive/oral.mp3");
}

#[tokio::test]
async fn search_respects_limit() {
  let server = MockServer::start().await;
  let results: Vec<_> = (0..6)
    .map(|i| json!({ "title": format!("reel {i}"), "resources": [{ "url": format!("https://a/{i}.mp4") }] }))
    .collect();
  Mock::given(method("GET"))
    .and(path("/film-and-videos/"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
    .mount(&server)
    .await;

  let hits = client(&server).search_video("refinery", 2).await.unwrap();
  assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn search_error_status_is_reported() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/photos/"))
    .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
    .mount(&server)
    .await;

  let err = client(&server).search_images("x", 3).await.unwrap_err();
  assert!(matches!(err, ArchiveError::Api { status: 503, .. }));
}

#[tokio::test]
async fn malformed_search_body_is_a_parse_error() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/photos/"))
    .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
    .mount(&server)
    .await;

  let err = client(&server).search_images("x", 3).await.unwrap_err();
  assert!(matches!(err, ArchiveError::Parse(_)));
}

#[tokio::test]
async fn download_returns_payload() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/files/gusher.jpg"))
    .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
    .mount(&server)
    .await;

  let url = format!("{}/files/gusher.jpg", server.uri());
  let bytes = client(&server).download(&url, Duration::from_secs(5)).await.unwrap();
  assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF]);
}

#[tokio::test]
async fn download_rejects_failures_and_empty_bodies() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/missing.jpg"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/empty.jpg"))
    .respond_with(ResponseTemplate::new(200))
    .mount(&server)
    .await;

  let c = client(&server);
  let timeout = Duration::from_secs(5);

  let err = c
    .download(&format!("{}/missing.jpg", server.uri()), timeout)
    .await
    .unwrap_err();
  assert!(matches!(err, ArchiveError::Api { status: 404, .. }));

  let err = c
    .download(&format!("{}/empty.jpg", server.uri()), timeout)
    .await
    .unwrap_err();
  assert!(matches!(err, ArchiveError::EmptyBody(_)));
}
