use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use themis_api::{app::build_router, config::Config, state::AppState};
use themis_chat::{ChatOrchestrator, CompletionRelay};
use themis_llm::OpenAIClient;
use themis_persist::{InMemoryDocumentSource, InMemoryPersistenceClient, LegalDocument, Ruling};

const CONFIG: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0

    [cors]
    enabled = false
    origins = []

    [storage]
    backend = "memory"

    [llm]
    model = "gpt-4o-mini"
    temperature = 0.3
    max_tokens = 512

    [logging]
    level = "info"
    format = "pretty"
"#;

const ANA: &str = "user_id=u1&user_email=Ana@Firm.co";
const LUIS: &str = "user_id=u2&user_email=luis@firm.co";

fn ruling_documents() -> Vec<LegalDocument> {
    vec![LegalDocument {
        id: "d1".into(),
        user_id: "u1".into(),
        rulings: vec![Ruling {
            providencia: "T-123-45".into(),
            magistrado: Some("Ana Pérez".into()),
            ..Default::default()
        }],
        ..Default::default()
    }]
}

fn test_app(base_url: &str, documents: Vec<LegalDocument>) -> Router {
    let config: Config = toml::from_str(CONFIG).unwrap();

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(base_url);
    let relay = CompletionRelay::new(Arc::new(client), config.llm.model.clone());
    let chat = ChatOrchestrator::new(
        Arc::new(InMemoryPersistenceClient::new()),
        Arc::new(InMemoryDocumentSource::new(documents)),
        relay,
        config.chat_config(),
    );

    build_router(Arc::new(AppState::new(config, chat)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create_thread(app: &Router, scenario: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/threads",
            json!({ "user_id": "u1", "user_email": "ana@firm.co", "scenario": scenario }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let thread: Value = serde_json::from_slice(&body).unwrap();
    thread["thread_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_reports_storage() {
    let server = mockito::Server::new_async().await;
    let app = test_app(&server.url(), Vec::new());

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["services"]["memory"], "connected");
}

#[tokio::test]
async fn test_thread_lifecycle_and_ownership() {
    let server = mockito::Server::new_async().await;
    let app = test_app(&server.url(), Vec::new());

    let thread_id = create_thread(&app, "jurisprudence").await;

    let (status, body) = send(&app, get(&format!("/threads/{}?{}", thread_id, ANA))).await;
    assert_eq!(status, StatusCode::OK);
    let thread: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(thread["scenario"], "jurisprudence");
    assert_eq!(thread["message_count"], 0);

    let (status, body) = send(&app, get(&format!("/threads/{}?{}", thread_id, LUIS))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["code"], "THREAD_OWNERSHIP_MISMATCH");

    let (status, body) = send(&app, get(&format!("/threads?{}&limit=5", ANA))).await;
    assert_eq!(status, StatusCode::OK);
    let list: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(list["threads"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, delete(&format!("/threads/{}?{}", thread_id, ANA))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, get(&format!("/threads?{}", ANA))).await;
    let list: Value = serde_json::from_slice(&body).unwrap();
    assert!(list["threads"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ruling_question_streams_quick_answer() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;
    let app = test_app(&server.url(), ruling_documents());
    let thread_id = create_thread(&app, "jurisprudence").await;

    let (status, body) = send(
        &app,
        post_json(
            &format!("/threads/{}/messages", thread_id),
            json!({
                "user_id": "u1",
                "user_email": "ana@firm.co",
                "text": "¿Cuál es el magistrado de T-123-45?"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = String::from_utf8(body).unwrap();
    assert!(body.contains("Ana Pérez"));
    assert!(body.contains(r#"data: {"completed":true}"#));
    mock.assert_async().await;

    let (_, body) = send(&app, get(&format!("/threads/{}/messages?{}", thread_id, ANA))).await;
    let history: Value = serde_json::from_slice(&body).unwrap();
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["sender"], "user");
    assert_eq!(messages[1]["sender"], "assistant");
}

#[tokio::test]
async fn test_completion_deltas_are_forwarded() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            "data: [DONE]\n\n",
        ))
        .create_async()
        .await;
    let app = test_app(&server.url(), Vec::new());
    let thread_id = create_thread(&app, "general").await;

    let (status, body) = send(
        &app,
        post_json(
            &format!("/threads/{}/messages", thread_id),
            json!({ "user_id": "u1", "user_email": "ana@firm.co", "text": "Hello there" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = String::from_utf8(body).unwrap();
    let content_at = body.find(r#"data: {"content":"Hi"}"#).unwrap();
    let completed_at = body.find(r#"data: {"completed":true}"#).unwrap();
    assert!(content_at < completed_at);
}

#[tokio::test]
async fn test_foreign_sender_rejected_before_streaming() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;
    let app = test_app(&server.url(), Vec::new());
    let thread_id = create_thread(&app, "general").await;

    let (status, body) = send(
        &app,
        post_json(
            &format!("/threads/{}/messages", thread_id),
            json!({ "user_id": "u2", "user_email": "luis@firm.co", "text": "hola" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["code"], "THREAD_OWNERSHIP_MISMATCH");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_message_is_bad_request() {
    let server = mockito::Server::new_async().await;
    let app = test_app(&server.url(), Vec::new());
    let thread_id = create_thread(&app, "general").await;

    let (status, body) = send(
        &app,
        post_json(
            &format!("/threads/{}/messages", thread_id),
            json!({ "user_id": "u1", "user_email": "ana@firm.co", "text": "   " }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_clear_history_keeps_thread() {
    let server = mockito::Server::new_async().await;
    let app = test_app(&server.url(), ruling_documents());
    let thread_id = create_thread(&app, "jurisprudence").await;

    send(
        &app,
        post_json(
            &format!("/threads/{}/messages", thread_id),
            json!({
                "user_id": "u1",
                "user_email": "ana@firm.co",
                "text": "¿Cuál es el magistrado de T-123-45?"
            }),
        ),
    )
    .await;

    let (status, _) = send(&app, delete(&format!("/threads/{}/messages?{}", thread_id, ANA))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, get(&format!("/threads/{}/messages?{}", thread_id, ANA))).await;
    let history: Value = serde_json::from_slice(&body).unwrap();
    assert!(history["messages"].as_array().unwrap().is_empty());

    // Owner survives the clear
    let (status, _) = send(&app, get(&format!("/threads/{}?{}", thread_id, LUIS))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&app, get(&format!("/threads/{}?{}", thread_id, ANA))).await;
    assert_eq!(status, StatusCode::OK);
    let thread: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(thread["summary"], "");
}

#[tokio::test]
async fn test_memory_facts() {
    let server = mockito::Server::new_async().await;
    let app = test_app(&server.url(), Vec::new());

    let (status, _) = send(
        &app,
        post_json(
            "/memory/facts",
            json!({ "user_id": "u1", "user_email": "ana@firm.co", "fact": "Litiga en Bogotá" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get(&format!("/memory?{}", ANA))).await;
    assert_eq!(status, StatusCode::OK);
    let memory: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(memory["user_email"], "ana@firm.co");
    assert_eq!(memory["facts"], json!(["Litiga en Bogotá"]));

    let (status, _) = send(
        &app,
        post_json(
            "/memory/facts",
            json!({ "user_id": "u1", "user_email": "ana@firm.co", "fact": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let server = mockito::Server::new_async().await;
    let app = test_app(&server.url(), Vec::new());

    let (status, body) = send(&app, get("/api/docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);

    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert!(doc["paths"]["/threads/{thread_id}/messages"].is_object());
    assert!(doc["paths"]["/memory/facts"].is_object());
}
