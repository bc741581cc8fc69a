//! Pipeline tests against an in-memory store, a temp directory and a mock
//! archive/chat server.

use std::{sync::Arc, time::Duration};

use bayou_archive::{ArchiveClient, ArchiveConfig};
use bayou_core::{
  research::{MediaKind, TopicMedia},
  store::HistoryStore,
};
use bayou_pages::{Consolidator, PageRenderer};
use bayou_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{body_string_contains, method, path},
};

use crate::{
  Assistant, ChatClient, ConsolidationQueue, Error, MediaCollector, Workflow,
  assistant::APOLOGY,
};

struct Harness {
  store:  Arc<SqliteStore>,
  server: MockServer,
  dir:    TempDir,
}

async fn harness() -> Harness {
  Harness {
    store:  Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store")),
    server: MockServer::start().await,
    dir:    tempfile::tempdir().expect("temp dir"),
  }
}

impl Harness {
  fn collector(&self) -> MediaCollector<SqliteStore> {
    let archive = ArchiveClient::new(ArchiveConfig::with_base_url(self.server.uri())).unwrap();
    MediaCollector::new(self.store.clone(), Arc::new(archive), self.dir.path().join("images"))
      .with_download_timeout(Duration::from_secs(5))
  }

  fn renderer(&self) -> Arc<PageRenderer<SqliteStore>> {
    Arc::new(PageRenderer::new(self.store.clone(), self.dir.path().join("pages")))
  }

  fn workflow(&self) -> Workflow<SqliteStore> {
    Workflow::new(self.store.clone(), self.collector(), self.renderer())
  }

  fn file_url(&self, name: &str) -> String { format!("{}/files/{name}", self.server.uri()) }

  /// Serve `images` image hits and no audio or video.
  async fn mount_archive(&self, images: &[&str]) {
    let results: Vec<Value> = images
      .iter()
      .map(|name| {
        json!({
          "title": format!("Photo {name}"),
          "url": format!("https://archive.example/item/{name}"),
          "image": { "full": self.file_url(name) }
        })
      })
      .collect();
    mount_json(&self.server, "/photos/", json!({ "results": results })).await;
    mount_json(&self.server, "/audio/", json!({ "results": [] })).await;
    mount_json(&self.server, "/film-and-videos/", json!({ "results": [] })).await;

    for name in images {
      Mock::given(method("GET"))
        .and(path(format!("/files/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .mount(&self.server)
        .await;
    }
  }
}

async fn mount_json(server: &MockServer, at: &str, body: Value) {
  Mock::given(method("GET"))
    .and(path(at))
    .respond_with(ResponseTemplate::new(200).set_body_json(body))
    .mount(server)
    .await;
}

// ─── Collector ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn collect_downloads_and_links_media() {
  let h = harness().await;
  h.mount_archive(&["a.jpg", "b.jpg"]).await;

  let collection = h
    .collector()
    .collect("Spindletop", &["spindletop".into()], "tester", None)
    .await
    .unwrap();

  assert_eq!(collection.media.len(), 2);
  let first = &collection.media[0];
  assert!(first.file_path.starts_with("/images/spindletop-photo-a-jpg-"));
  assert!(first.file_path.ends_with(".jpg"));
  assert_eq!(first.source, "Library of Congress: https://archive.example/item/a.jpg");

  let file_name = first.file_path.trim_start_matches("/images/");
  let written = std::fs::read(h.dir.path().join("images").join(file_name)).unwrap();
  assert_eq!(written, b"jpeg-bytes");

  let topic = h.store.get_researched_topic(collection.topic_id).await.unwrap().unwrap();
  assert_eq!(topic.topic, "Spindletop");
  assert_eq!(topic.user_id, "tester");
}

#[tokio::test]
async fn failed_download_drops_exactly_one_item() {
  let h = harness().await;
  // "Broken" is listed in the search results but its download fails.
  let results = json!({ "results": [
    { "title": "Photo a.jpg", "image": { "full": h.file_url("a.jpg") } },
    { "title": "Broken", "image": { "full": h.file_url("broken.jpg") } },
    { "title": "Photo c.jpg", "image": { "full": h.file_url("c.jpg") } }
  ]});
  mount_json(&h.server, "/photos/", results).await;
  mount_json(&h.server, "/audio/", json!({ "results": [] })).await;
  mount_json(&h.server, "/film-and-videos/", json!({ "results": [] })).await;
  for name in ["a.jpg", "c.jpg"] {
    Mock::given(method("GET"))
      .and(path(format!("/files/{name}")))
      .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
      .mount(&h.server)
      .await;
  }
  Mock::given(method("GET"))
    .and(path("/files/broken.jpg"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&h.server)
    .await;

  let collection = h.collector().collect("Orange", &[], "tester", None).await.unwrap();

  assert_eq!(collection.media.len(), 2);
  assert!(collection.media.iter().all(|m| m.title != "Broken"));
}

#[tokio::test]
async fn collecting_into_existing_topic_adds_media_only() {
  let h = harness().await;
  h.mount_archive(&["a.jpg"]).await;
  let collector = h.collector();

  let first = collector.collect("Beaumont", &[], "tester", None).await.unwrap();
  let second = collector
    .collect("Beaumont", &[], "tester", Some(first.topic_id))
    .await
    .unwrap();
  let third = collector
    .collect("Beaumont", &[], "tester", Some(first.topic_id))
    .await
    .unwrap();

  assert_eq!(second.topic_id, first.topic_id);
  assert_eq!(third.topic_id, first.topic_id);
  assert_eq!(h.store.list_researched_topics().await.unwrap().len(), 1);
  assert_eq!(h.store.list_media(first.topic_id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn search_failures_yield_empty_collection() {
  let h = harness().await;
  // No mocks mounted: every search answers 404.
  let collection = h.collector().collect("Vidor", &[], "tester", None).await.unwrap();
  assert!(collection.media.is_empty());
  assert!(h.store.get_researched_topic(collection.topic_id).await.unwrap().is_some());
}

#[tokio::test]
async fn media_is_capped_per_kind_and_overall() {
  let h = harness().await;
  h.mount_archive(&["1.jpg", "2.jpg", "3.jpg", "4.jpg", "5.jpg"]).await;

  let collection = h
    .collector()
    .with_max_items(3)
    .collect("Groves", &[], "tester", None)
    .await
    .unwrap();
  assert_eq!(collection.media.len(), 3);
}

#[tokio::test]
async fn same_title_hits_keep_separate_files() {
  let h = harness().await;
  let results = json!({ "results": [
    { "title": "Refinery", "image": { "full": h.file_url("one.jpg") } },
    { "title": "Refinery", "image": { "full": h.file_url("two.jpg") } }
  ]});
  mount_json(&h.server, "/photos/", results).await;
  mount_json(&h.server, "/audio/", json!({ "results": [] })).await;
  mount_json(&h.server, "/film-and-videos/", json!({ "results": [] })).await;
  for (name, body) in [("one.jpg", "ONE"), ("two.jpg", "TWO")] {
    Mock::given(method("GET"))
      .and(path(format!("/files/{name}")))
      .respond_with(ResponseTemplate::new(200).set_body_bytes(body.as_bytes().to_vec()))
      .mount(&h.server)
      .await;
  }

  for _ in 0..10 {
    let collection = h.collector().collect("Port Arthur", &[], "tester", None).await.unwrap();
    let media = &collection.media;
    assert_eq!(media.len(), 2);
    assert_ne!(media[0].file_path, media[1].file_path);

    let read = |m: &TopicMedia| {
      let name = m.file_path.trim_start_matches("/images/");
      std::fs::read(h.dir.path().join("images").join(name)).unwrap()
    };
    assert_eq!(read(&media[0]), b"ONE");
    assert_eq!(read(&media[1]), b"TWO");
  }
}

#[tokio::test]
async fn mixed_kinds_keep_order_and_caps() {
  let h = harness().await;
  let images: Vec<Value> = (1..=2)
    .map(|i| json!({ "title": format!("photo {i}"), "image": { "full": h.file_url(&format!("p{i}.jpg")) } }))
    .collect();
  let audio: Vec<Value> = (1..=4)
    .map(|i| json!({ "title": format!("song {i}"), "resources": [
      { "mime_type": "audio/mpeg", "url": h.file_url(&format!("s{i}")) }
    ]}))
    .collect();
  let video: Vec<Value> = (1..=4)
    .map(|i| json!({ "title": format!("reel {i}"), "resources": [
      { "url": h.file_url(&format!("r{i}.mp4")) }
    ]}))
    .collect();
  mount_json(&h.server, "/photos/", json!({ "results": images })).await;
  mount_json(&h.server, "/audio/", json!({ "results": audio })).await;
  mount_json(&h.server, "/film-and-videos/", json!({ "results": video })).await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload".to_vec()))
    .mount(&h.server)
    .await;

  // Six slots: both images, audio capped at three, one video.
  let collection = h
    .collector()
    .with_max_items(6)
    .collect("Orange", &[], "tester", None)
    .await
    .unwrap();

  let kinds: Vec<_> = collection.media.iter().map(|m| m.kind).collect();
  assert_eq!(kinds, vec![
    MediaKind::Image,
    MediaKind::Image,
    MediaKind::Audio,
    MediaKind::Audio,
    MediaKind::Audio,
    MediaKind::Video,
  ]);
  let titles: Vec<_> = collection.media.iter().map(|m| m.title.as_str()).collect();
  assert_eq!(titles, vec!["photo 1", "photo 2", "song 1", "song 2", "song 3", "reel 1"]);

  for m in &collection.media {
    assert!(m.file_path.ends_with(m.kind.extension()), "{}", m.file_path);
    let name = m.file_path.trim_start_matches("/images/");
    assert!(h.dir.path().join("images").join(name).exists());
  }
  assert!(collection.media[2].file_path.ends_with(".mp3"));
  assert!(collection.media[5].file_path.ends_with(".mp4"));
}

// ─── Workflow ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_without_topic_does_nothing() {
  let h = harness().await;

  let outcome = h.workflow().run("hello there", None, None).await.unwrap();

  assert!(outcome.is_none());
  let requests = h.server.received_requests().await.unwrap_or_default();
  assert!(requests.is_empty());
  assert!(h.store.list_researched_topics().await.unwrap().is_empty());
}

#[tokio::test]
async fn spindletop_end_to_end() {
  let h = harness().await;
  h.store.seed_if_empty().await.unwrap();
  h.mount_archive(&["gusher.jpg"]).await;

  let outcome = h
    .workflow()
    .run("Tell me about Spindletop", Some("visitor"), None)
    .await
    .unwrap()
    .unwrap();

  assert_eq!(outcome.topic, "Spindletop");
  assert_eq!(outcome.media_count, 1);
  assert_eq!(outcome.page_url, format!("/pages/spindletop-{}.html", outcome.topic_id));

  let page = h
    .dir
    .path()
    .join("pages")
    .join(format!("spindletop-{}.html", outcome.topic_id));
  let html = std::fs::read_to_string(page).unwrap();
  assert!(html.contains("Spindletop"));

  let facts = h.store.facts_for_topic("Spindletop", 20).await.unwrap();
  assert!(!facts.is_empty());
  for fact in facts {
    assert!(html.contains(&fact.title), "missing fact {:?}", fact.title);
  }
}

#[tokio::test]
async fn enhance_appends_and_rerenders() {
  let h = harness().await;
  h.mount_archive(&["a.jpg"]).await;
  let workflow = h.workflow();

  let first = workflow.run_topic("Port Arthur", None).await.unwrap();
  let enhanced = workflow.enhance(first.topic_id, "more photos please").await.unwrap();

  assert_eq!(enhanced.topic_id, first.topic_id);
  assert_eq!(enhanced.topic, "Port Arthur");
  assert_eq!(enhanced.page_url, first.page_url);
  assert_eq!(h.store.list_media(first.topic_id).await.unwrap().len(), 2);

  let err = workflow.enhance(first.topic_id + 100, "x").await.unwrap_err();
  assert!(matches!(err, Error::TopicNotFound(_)));
}

#[tokio::test]
async fn run_with_unknown_existing_topic_fails() {
  let h = harness().await;
  let err = h
    .workflow()
    .run("Tell me about Beaumont", None, Some(77))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::TopicNotFound(77)));
}

// ─── Consolidation queue ─────────────────────────────────────────────────────

#[tokio::test]
async fn rescheduling_coalesces_into_one_run() {
  let h = harness().await;
  h.mount_archive(&[]).await;
  h.workflow().run_topic("Spindletop", None).await.unwrap();

  let consolidator = Arc::new(Consolidator::new(h.store.clone(), h.dir.path().join("pages")));
  let queue = ConsolidationQueue::new(consolidator, Duration::from_millis(100));

  queue.schedule("spindletop");
  queue.schedule("spindletop");
  assert_eq!(queue.pending(), 1);

  tokio::time::sleep(Duration::from_millis(600)).await;
  assert_eq!(queue.pending(), 0);
  assert_eq!(h.store.list_consolidated_pages().await.unwrap().len(), 1);
}

#[tokio::test]
async fn cancelled_runs_never_fire() {
  let h = harness().await;
  h.mount_archive(&[]).await;
  h.workflow().run_topic("Hurricane Rita", None).await.unwrap();

  let consolidator = Arc::new(Consolidator::new(h.store.clone(), h.dir.path().join("pages")));
  let queue = ConsolidationQueue::new(consolidator, Duration::from_millis(100));

  queue.schedule("hurricanes");
  queue.schedule("music");
  assert!(queue.cancel("hurricanes"));
  assert!(!queue.cancel("hurricanes"));
  queue.shutdown();
  assert_eq!(queue.pending(), 0);

  tokio::time::sleep(Duration::from_millis(300)).await;
  assert!(h.store.list_consolidated_pages().await.unwrap().is_empty());
}

#[tokio::test]
async fn workflow_schedules_matching_categories() {
  let h = harness().await;
  h.mount_archive(&[]).await;

  let consolidator = Arc::new(Consolidator::new(h.store.clone(), h.dir.path().join("pages")));
  let queue = Arc::new(ConsolidationQueue::new(consolidator, Duration::from_secs(60)));
  let workflow = h.workflow().with_queue(queue.clone());

  workflow.run_topic("Janis Joplin in Port Arthur", None).await.unwrap();
  assert_eq!(queue.pending(), 2);
  queue.shutdown();
}

// ─── Assistant ───────────────────────────────────────────────────────────────

fn assistant(h: &Harness) -> Assistant<SqliteStore> {
  let chat = ChatClient::new(Some("test-key".into())).with_base_url(h.server.uri());
  Assistant::new(h.store.clone(), chat)
}

#[tokio::test]
async fn reply_uses_facts_and_stores_both_turns() {
  let h = harness().await;
  h.store.seed_if_empty().await.unwrap();
  Mock::given(method("POST"))
    .and(path("/chat/completions"))
    .and(body_string_contains("The Lucas Gusher"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "choices": [{ "message": { "role": "assistant", "content": "It blew in on January 10, 1901." } }]
    })))
    .mount(&h.server)
    .await;

  let reply = assistant(&h)
    .reply(None, "Tell me about Spindletop")
    .await
    .unwrap();

  assert_eq!(reply.reply, "It blew in on January 10, 1901.");
  assert_eq!(reply.topic.as_deref(), Some("Spindletop"));
  assert!(!reply.session_id.is_empty());

  let conversation = h.store.find_conversation(&reply.session_id).await.unwrap().unwrap();
  let messages = h.store.recent_messages(conversation.id, 10).await.unwrap();
  assert_eq!(messages.len(), 2);
  assert_eq!(messages[1].content, reply.reply);
}

#[tokio::test]
async fn chat_failure_yields_apology() {
  let h = harness().await;
  Mock::given(method("POST"))
    .and(path("/chat/completions"))
    .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
    .mount(&h.server)
    .await;

  let a = assistant(&h);
  let first = a.reply(Some("session-7"), "hello").await.unwrap();
  assert_eq!(first.reply, APOLOGY);
  assert_eq!(first.session_id, "session-7");
  assert!(first.topic.is_none());

  a.reply(Some("session-7"), "anyone there?").await.unwrap();
  let conversation = h.store.find_conversation("session-7").await.unwrap().unwrap();
  assert_eq!(h.store.recent_messages(conversation.id, 10).await.unwrap().len(), 4);
}
