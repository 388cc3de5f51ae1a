//! HTTP-level tests for the full router.
//!
//! The completion provider is replaced with a scripted double so chat tests
//! can assert on call counts and never touch the network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use folio_server::chat::{ChatError, ChatMessage, CompletionProvider};
use folio_server::config::Config;
use folio_server::state::AppState;
use folio_server::storage::FileLibrary;

/// What the scripted provider should do when called.
enum Script {
    Reply(String),
    Fail(String),
}

struct ScriptedProvider {
    script: Script,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<ChatMessage>>,
}

impl ScriptedProvider {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(detail) => Err(ChatError::Api(detail.clone())),
        }
    }
}

struct TestApp {
    server: TestServer,
    provider: Arc<ScriptedProvider>,
    // Held so the upload directory outlives the test.
    upload_dir: TempDir,
}

fn test_app_with(max_upload_bytes: u64, script: Script) -> TestApp {
    let upload_dir = TempDir::new().unwrap();

    let mut config = Config::default();
    config.storage.upload_dir = upload_dir.path().to_path_buf();
    config.storage.max_upload_bytes = max_upload_bytes;

    let library = FileLibrary::new(upload_dir.path(), max_upload_bytes).unwrap();
    let provider = Arc::new(ScriptedProvider::new(script));
    let state = AppState::new(config, library, provider.clone());

    TestApp {
        server: TestServer::new(folio_server::app(state)).unwrap(),
        provider,
        upload_dir,
    }
}

fn test_app() -> TestApp {
    test_app_with(1024 * 1024, Script::Reply("ok".to_string()))
}

fn pdf_upload(name: &str, bytes: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes.to_vec())
            .file_name(name)
            .mime_type("application/pdf"),
    )
}

fn stored_files(dir: &TempDir) -> Vec<String> {
    std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

// ============================================================================
// Upload + file serving
// ============================================================================

#[tokio::test]
async fn upload_redirects_and_round_trips_bytes() {
    let app = test_app();
    let bytes = b"%PDF-1.4 round trip payload".to_vec();

    let response = app.server.post("/").multipart(pdf_upload("report.pdf", &bytes)).await;
    assert_eq!(response.status_code(), 303);

    let location = response.header("location");
    let location = location.to_str().unwrap();
    assert!(location.starts_with("/view/"));

    let stored_name = location.trim_start_matches("/view/");
    let download = app.server.get(&format!("/pdf/{}", stored_name)).await;
    assert_eq!(download.status_code(), 200);
    assert_eq!(download.header("content-type").to_str().unwrap(), "application/pdf");
    assert_eq!(download.as_bytes().as_ref(), bytes.as_slice());
}

#[tokio::test]
async fn upload_rejects_non_pdf_without_writing() {
    let app = test_app();

    let response = app
        .server
        .post("/")
        .multipart(pdf_upload("notes.txt", b"not a pdf"))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(response.text().contains("Invalid file type"));
    assert!(stored_files(&app.upload_dir).is_empty());
}

#[tokio::test]
async fn upload_rejects_missing_file_field() {
    let app = test_app();

    let response = app
        .server
        .post("/")
        .multipart(MultipartForm::new().add_text("comment", "no file here"))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(response.text().contains("No file selected"));
}

#[tokio::test]
async fn upload_rejects_oversized_without_partial_file() {
    let app = test_app_with(1024, Script::Reply("ok".to_string()));

    let response = app
        .server
        .post("/")
        .multipart(pdf_upload("big.pdf", &vec![0u8; 2048]))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(stored_files(&app.upload_dir).is_empty());
}

#[tokio::test]
async fn pdf_route_rejects_path_traversal() {
    let app = test_app();
    std::fs::write(app.upload_dir.path().join("real.pdf"), b"%PDF").unwrap();

    let response = app.server.get("/pdf/..%2F..%2Fetc%2Fpasswd").await;
    assert_eq!(response.status_code(), 404);

    let response = app.server.get("/pdf/absent.pdf").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn index_lists_uploaded_files() {
    let app = test_app();
    app.server
        .post("/")
        .multipart(pdf_upload("quarterly report.pdf", b"%PDF-1.4"))
        .await;

    let response = app.server.get("/").await;
    assert_eq!(response.status_code(), 200);
    let html = response.text();
    assert!(html.contains("Recent files"));
    // Display name strips the UUID prefix; spaces were sanitized on store.
    assert!(html.contains("quarterly_report.pdf"));
}

#[tokio::test]
async fn viewer_page_neutralizes_script_in_requested_name() {
    let app = test_app();

    // Percent-encoded "x</script><script>alert(1)</script>.pdf"; axum
    // decodes the segment before it reaches the handler.
    let response = app
        .server
        .get("/view/x%3C%2Fscript%3E%3Cscript%3Ealert(1)%3C%2Fscript%3E.pdf")
        .await;

    assert_eq!(response.status_code(), 200);
    let html = response.text();
    // The closing tag is escaped inside the inline config, so the script
    // block cannot be terminated early.
    assert!(html.contains(r#"x<\/script><script>alert(1)<\/script>.pdf"#));
    assert!(!html.contains(r#""x</script>"#));
}

#[tokio::test]
async fn viewer_page_embeds_pdf_url() {
    let app = test_app();

    let response = app.server.get("/view/abc_report.pdf").await;
    assert_eq!(response.status_code(), 200);
    let html = response.text();
    assert!(html.contains("/pdf/abc_report.pdf"));
    assert!(html.contains("pdf.worker.min.js"));
}

// ============================================================================
// Chat relay
// ============================================================================

#[tokio::test]
async fn chat_relays_message_with_context() {
    let app = test_app_with(1024, Script::Reply("Page 2 discusses X".to_string()));

    let response = app
        .server
        .post("/chat")
        .json(&json!({
            "message": "What is on page 2?",
            "context": {"currentPage": 2, "totalPages": 10}
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"response": "Page 2 discusses X"})
    );
    assert_eq!(app.provider.call_count(), 1);

    let messages = app.provider.last_messages.lock().unwrap().clone();
    assert_eq!(messages[0].role, "system");
    assert!(messages[0].content.contains("viewing page 2 of 10"));
    assert_eq!(messages.last().unwrap().content, "What is on page 2?");
}

#[tokio::test]
async fn chat_forwards_history_in_order() {
    let app = test_app();

    let response = app
        .server
        .post("/chat")
        .json(&json!({
            "message": "And then?",
            "history": [
                {"role": "user", "content": "Summarize page 1"},
                {"role": "assistant", "content": "It introduces the topic."}
            ]
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let messages = app.provider.last_messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1].content, "Summarize page 1");
    assert_eq!(messages[2].role, "assistant");
}

#[tokio::test]
async fn chat_rejects_blank_message_without_calling_provider() {
    let app = test_app();

    for body in [json!({"message": ""}), json!({"message": "   "}), json!({})] {
        let response = app.server.post("/chat").json(&body).await;
        assert_eq!(response.status_code(), 400);
    }
    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn chat_upstream_failure_is_generic_500() {
    let secret_detail = "connection refused to api.openai.com with key sk-test-123";
    let app = test_app_with(1024, Script::Fail(secret_detail.to_string()));

    let response = app
        .server
        .post("/chat")
        .json(&json!({"message": "hello"}))
        .await;

    assert_eq!(response.status_code(), 500);
    let body = response.text();
    assert!(!body.contains("sk-test-123"));
    assert!(!body.contains("connection refused"));
    assert!(body.contains("unavailable"));
    assert_eq!(app.provider.call_count(), 1);
}

#[tokio::test]
async fn chat_empty_reply_is_valid() {
    let app = test_app_with(1024, Script::Reply(String::new()));

    let response = app
        .server
        .post("/chat")
        .json(&json!({"message": "hello"}))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"response": ""})
    );
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_reports_version() {
    let app = test_app();
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
