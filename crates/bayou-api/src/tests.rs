//! Router tests over a seeded in-memory store and a mock archive/chat
//! server.

use std::{sync::Arc, time::Duration};

use axum::{
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
  response::Response,
};
use bayou_archive::{ArchiveClient, ArchiveConfig};
use bayou_core::store::HistoryStore;
use bayou_pages::{Consolidator, PageRenderer};
use bayou_research::{Assistant, ChatClient, MediaCollector, Workflow};
use bayou_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{method, path},
};

use crate::{ApiState, api_router};

struct TestApp {
  state:  Arc<ApiState<SqliteStore>>,
  server: MockServer,
  _dir:   TempDir,
}

async fn app() -> TestApp {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  store.seed_if_empty().await.unwrap();
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  // Every archive search comes back empty unless a test mounts more.
  for at in ["/photos/", "/audio/", "/film-and-videos/"] {
    Mock::given(method("GET"))
      .and(path(at))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
      .mount(&server)
      .await;
  }

  let archive = ArchiveClient::new(ArchiveConfig::with_base_url(server.uri())).unwrap();
  let collector = MediaCollector::new(store.clone(), Arc::new(archive), dir.path().join("images"))
    .with_download_timeout(Duration::from_secs(5));
  let renderer = Arc::new(PageRenderer::new(store.clone(), dir.path().join("pages")));
  let workflow = Arc::new(Workflow::new(store.clone(), collector, renderer));
  let chat = ChatClient::new(None).with_base_url(server.uri());
  let assistant = Arc::new(Assistant::new(store.clone(), chat));
  let consolidator = Arc::new(Consolidator::new(store.clone(), dir.path().join("pages")));

  let state = ApiState::new(store, workflow, assistant, consolidator)
    .with_category_delay(Duration::ZERO)
    .with_research_from_chat(false);

  TestApp { state: Arc::new(state), server, _dir: dir }
}

impl TestApp {
  async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    api_router(self.state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn get(&self, uri: &str) -> Response { self.send("GET", uri, None).await }

  async fn post(&self, uri: &str, body: Value) -> Response {
    self.send("POST", uri, Some(body)).await
  }
}

async fn json_body(resp: Response) -> Value {
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

// ── Reference data ───────────────────────────────────────────────────────────

#[tokio::test]
async fn lists_seeded_cities_and_finds_one() {
  let app = app().await;

  let resp = app.get("/cities").await;
  assert_eq!(resp.status(), StatusCode::OK);
  let cities = json_body(resp).await;
  let beaumont = cities
    .as_array()
    .unwrap()
    .iter()
    .find(|c| c["name"] == "Beaumont")
    .unwrap()
    .clone();

  let resp = app.get(&format!("/cities/{}", beaumont["id"])).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["name"], "Beaumont");
}

#[tokio::test]
async fn missing_city_is_404_with_error_body() {
  let app = app().await;
  let resp = app.get("/cities/9999").await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert!(json_body(resp).await["error"].as_str().unwrap().contains("9999"));
}

#[tokio::test]
async fn unparseable_id_is_rejected() {
  let app = app().await;
  let resp = app.get("/cities/beaumont").await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn facts_filter_by_text_and_limit() {
  let app = app().await;

  let resp = app.get("/facts?q=gusher&verified=true").await;
  assert_eq!(resp.status(), StatusCode::OK);
  let facts = json_body(resp).await;
  let facts = facts.as_array().unwrap();
  assert!(!facts.is_empty());
  assert!(facts.iter().any(|f| f["title"] == "The Lucas Gusher"));

  let facts = json_body(app.get("/facts?limit=2").await).await;
  assert_eq!(facts.as_array().unwrap().len(), 2);
}

// ── Conversations and chat ───────────────────────────────────────────────────

#[tokio::test]
async fn conversation_is_created_once_per_session() {
  let app = app().await;

  let first = json_body(app.post("/conversations", json!({ "session_id": "s-1" })).await).await;
  let second = json_body(app.post("/conversations", json!({ "session_id": "s-1" })).await).await;
  assert_eq!(first["id"], second["id"]);

  let generated = json_body(app.post("/conversations", json!({})).await).await;
  assert!(!generated["session_id"].as_str().unwrap().is_empty());
  assert_ne!(generated["id"], first["id"]);

  let resp = app.get("/conversations/s-1/messages").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, json!([]));

  let resp = app.get("/conversations/nobody/messages").await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chat_replies_and_records_both_turns() {
  let app = app().await;
  Mock::given(method("POST"))
    .and(path("/chat/completions"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "choices": [{ "message": { "role": "assistant", "content": "It blew in 1901." } }]
    })))
    .mount(&app.server)
    .await;

  let resp = app
    .post("/chat", json!({ "session_id": "s-2", "message": "Tell me about Spindletop" }))
    .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["reply"], "It blew in 1901.");
  assert_eq!(body["session_id"], "s-2");
  assert_eq!(body["topic"], "Spindletop");
  assert_eq!(body["research_started"], false);

  let messages = json_body(app.get("/conversations/s-2/messages").await).await;
  let roles: Vec<&str> = messages
    .as_array()
    .unwrap()
    .iter()
    .map(|m| m["role"].as_str().unwrap())
    .collect();
  assert_eq!(roles, ["user", "assistant"]);
}

#[tokio::test]
async fn empty_chat_message_is_400() {
  let app = app().await;
  let resp = app.post("/chat", json!({ "message": "   " })).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Research ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn research_requires_topic_or_message() {
  let app = app().await;

  let resp = app.post("/research", json!({})).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = app.post("/research", json!({ "message": "hello there" })).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(app.state.store.list_researched_topics().await.unwrap().is_empty());
}

#[tokio::test]
async fn research_renders_a_page_and_exposes_the_topic() {
  let app = app().await;

  let resp = app
    .post("/research", json!({ "message": "Tell me about Spindletop", "user_id": "u1" }))
    .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let outcome = json_body(resp).await;
  assert_eq!(outcome["topic"], "Spindletop");
  assert_eq!(outcome["media_count"], 0);
  let id = outcome["topic_id"].as_i64().unwrap();
  assert_eq!(outcome["page_url"], format!("/pages/spindletop-{id}.html"));

  let topics = json_body(app.get("/research/topics?q=spindle").await).await;
  assert_eq!(topics.as_array().unwrap().len(), 1);

  let detail = json_body(app.get(&format!("/research/topics/{id}")).await).await;
  assert_eq!(detail["user_id"], "u1");
  assert_eq!(detail["media"], json!([]));
  assert_eq!(detail["page_url"], outcome["page_url"]);

  let resp = app.get("/presentations?topic=spindletop").await;
  assert_eq!(resp.status(), StatusCode::OK);
  let presentation = json_body(resp).await;
  assert_eq!(presentation["url"], outcome["page_url"]);
  assert!(presentation.get("html_content").is_none());
}

#[tokio::test]
async fn enhancing_a_missing_topic_is_404() {
  let app = app().await;
  let resp = app
    .post("/research/topics/42/enhance", json!({ "query": "more about Orange" }))
    .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = app.get("/research/topics/42").await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn presentation_is_rendered_on_demand() {
  let app = app().await;
  let topic = app
    .state
    .store
    .create_topic(bayou_core::research::NewResearchedTopic {
      topic:    "Rice Farming".into(),
      keywords: vec![],
      user_id:  "u".into(),
    })
    .await
    .unwrap();

  let resp = app.get("/presentations?topic=rice").await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["url"], format!("/pages/rice-farming-{}.html", topic.id));

  let resp = app.get("/presentations?topic=zydeco").await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Consolidation ────────────────────────────────────────────────────────────

#[tokio::test]
async fn consolidation_status_codes() {
  let app = app().await;

  let resp = app.post("/consolidate/atlantis", json!({})).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = app.post("/consolidate/music", json!({})).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  app.post("/research", json!({ "topic": "Spindletop" })).await;
  let resp = app.post("/consolidate/spindletop", json!({})).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["tabs"], 1);
  assert!(body["url"].as_str().unwrap().starts_with("/pages/consolidated/spindletop-"));

  let pages = json_body(app.get("/consolidated").await).await;
  assert_eq!(pages.as_array().unwrap().len(), 1);
  assert_eq!(pages[0]["category"], "spindletop");
}

#[tokio::test]
async fn consolidate_all_is_accepted() {
  let app = app().await;
  let resp = app.send("POST", "/consolidate", None).await;
  assert_eq!(resp.status(), StatusCode::ACCEPTED);

  let categories = json_body(app.get("/categories").await).await;
  assert_eq!(categories.as_array().unwrap().len(), bayou_pages::CATEGORIES.len());
}

// ── Contributions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn contribution_review_lifecycle() {
  let app = app().await;

  let resp = app
    .post(
      "/contributions",
      json!({
        "title": "Pennsylvania Shipyards",
        "content": "Orange built destroyers during the Second World War.",
        "city_name": "orange",
        "year": 1942
      }),
    )
    .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let id = json_body(resp).await["id"].as_i64().unwrap();

  let pending = json_body(app.get("/contributions?status=pending").await).await;
  assert_eq!(pending.as_array().unwrap().len(), 1);

  let review = json!({ "approve": true, "importance": 6 });
  let resp = app.post(&format!("/contributions/{id}/review"), review.clone()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let outcome = json_body(resp).await;
  assert_eq!(outcome["contribution"]["status"], "approved");
  assert_eq!(outcome["fact"]["city_name"], "Orange");
  assert_eq!(outcome["fact"]["verified"], true);

  let resp = app.post(&format!("/contributions/{id}/review"), review.clone()).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = app.post("/contributions/9999/review", review).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_contribution_is_400() {
  let app = app().await;
  let resp = app.post("/contributions", json!({ "title": " ", "content": "x" })).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
