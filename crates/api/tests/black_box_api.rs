use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use rsvp_api::app::{self, services::AppServices};
use rsvp_core::RsvpRecord;
use rsvp_infra::notifier::{
    EmailSettings, NotificationDispatcher, NotificationError, Notifier, OutboundEmail, RecordingNotifier,
};
use rsvp_infra::response_store::ResponseCollection;
use rsvp_infra::{JsonFileResponseStore, ResponseStore, StoreError};

const FRONTEND_ORIGIN: &str = "http://localhost:5173";

struct TestServer {
    base_url: String,
    replies_path: PathBuf,
    _dir: tempfile::TempDir,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(notifier: Arc<dyn Notifier>) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let replies_path = dir.path().join("assets").join("replies.json");

        let store = Arc::new(JsonFileResponseStore::new(&replies_path));
        let notifications = NotificationDispatcher::new(
            notifier,
            EmailSettings {
                organizer: Some("host@example.com".to_string()),
                ..EmailSettings::default()
            },
        )
        .with_timeout(Duration::from_secs(2));
        let services = Arc::new(AppServices::new(store, notifications));
        let (base_url, handle) = serve(services).await;

        Self {
            base_url,
            replies_path,
            _dir: dir,
            handle,
        }
    }

    async fn spawn_recording() -> (Self, Arc<RecordingNotifier>) {
        let recorder = Arc::new(RecordingNotifier::new());
        (Self::spawn(recorder.clone()).await, recorder)
    }
}

// Same router as prod, bound to an ephemeral port.
async fn serve(services: Arc<AppServices>) -> (String, tokio::task::JoinHandle<()>) {
    let app = app::router(services, &[FRONTEND_ORIGIN.to_string()]);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, handle)
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct ReadOnlyDiskStore;

#[async_trait::async_trait]
impl ResponseStore for ReadOnlyDiskStore {
    async fn append(&self, _record: RsvpRecord) -> Result<ResponseCollection, StoreError> {
        Err(StoreError::Write(std::io::Error::other("read-only file system")))
    }

    async fn read_all(&self) -> Result<ResponseCollection, StoreError> {
        Ok(Vec::new())
    }
}

struct FailingNotifier;

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _email: OutboundEmail) -> Result<(), NotificationError> {
        Err(NotificationError::Rejected {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

async fn submit(client: &reqwest::Client, base_url: &str, body: serde_json::Value) -> reqwest::Response {
    client
        .post(format!("{}/submit", base_url))
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn replies(client: &reqwest::Client, base_url: &str) -> (StatusCode, serde_json::Value) {
    let res = client
        .get(format!("{}/replies", base_url))
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

async fn sent_eventually(recorder: &RecordingNotifier, count: usize) -> Vec<OutboundEmail> {
    // Notifications are detached from the request; poll briefly until they land.
    for _ in 0..100 {
        let sent = recorder.sent();
        if sent.len() >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("expected {count} notifications within timeout");
}

#[tokio::test]
async fn health_is_ok() {
    let (srv, _) = TestServer::spawn_recording().await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn submit_then_list_scenario() {
    let (srv, recorder) = TestServer::spawn_recording().await;
    let client = reqwest::Client::new();

    let (status, body) = replies(&client, &srv.base_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "totals": { "yes": 0, "no": 0 }, "replies": [] }));

    let res = submit(
        &client,
        &srv.base_url,
        json!({ "name": "Ada", "surname": "Lovelace", "email": "a@x.com", "isComing": "yes" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Reply saved successfully!" }));

    let (status, body) = replies(&client, &srv.base_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "totals": { "yes": 1, "no": 0 },
            "replies": [{ "name": "Ada", "surname": "Lovelace", "email": "a@x.com", "isComing": "yes" }]
        })
    );

    let res = submit(
        &client,
        &srv.base_url,
        json!({ "name": "", "surname": "B", "email": "b@x.com" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Name, Surname, and Email are required." }));

    let (_, body) = replies(&client, &srv.base_url).await;
    assert_eq!(body["replies"].as_array().unwrap().len(), 1);

    // Only the accepted submission produced mail: guest echo + organizer summary.
    let sent = sent_eventually(&recorder, 2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(recorder.sent().len(), 2);
    assert!(sent.iter().any(|e| e.to == "a@x.com"));
    assert!(sent.iter().any(|e| e.to == "host@example.com" && e.attachments.len() == 1));
}

#[tokio::test]
async fn listing_twice_is_identical() {
    let (srv, _) = TestServer::spawn_recording().await;
    let client = reqwest::Client::new();

    for (name, answer) in [("Ada", "yes"), ("Alan", "no"), ("Grace", "maybe")] {
        let res = submit(
            &client,
            &srv.base_url,
            json!({ "name": name, "surname": "X", "email": "x@x.com", "isComing": answer }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let (_, first) = replies(&client, &srv.base_url).await;
    let (_, second) = replies(&client, &srv.base_url).await;
    assert_eq!(first, second);
    assert_eq!(first["totals"], json!({ "yes": 1, "no": 1 }));
    assert_eq!(first["replies"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn missing_fields_and_malformed_bodies_are_rejected() {
    let (srv, recorder) = TestServer::spawn_recording().await;
    let client = reqwest::Client::new();

    for body in [
        json!({ "surname": "Lovelace", "email": "a@x.com" }),
        json!({ "name": "Ada", "email": "a@x.com" }),
        json!({ "name": "Ada", "surname": "Lovelace" }),
        json!({ "name": "Ada", "surname": "Lovelace", "email": "" }),
        json!([1, 2, 3]),
    ] {
        let res = submit(&client, &srv.base_url, body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    let res = client
        .post(format!("{}/submit", srv.base_url))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let (_, body) = replies(&client, &srv.base_url).await;
    assert!(body["replies"].as_array().unwrap().is_empty());
    assert!(!srv.replies_path.exists());
    assert!(recorder.sent().is_empty());
}

#[tokio::test]
async fn extra_fields_are_ignored() {
    let (srv, _) = TestServer::spawn_recording().await;
    let client = reqwest::Client::new();

    let res = submit(
        &client,
        &srv.base_url,
        json!({
            "name": "Ada",
            "surname": "Lovelace",
            "email": "a@x.com",
            "isComing": "yes",
            "bringingSomeone": true,
            "plusOneName": "Charles",
            "admin": true
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&srv.replies_path).unwrap()).unwrap();
    assert_eq!(
        stored,
        json!([{
            "name": "Ada",
            "surname": "Lovelace",
            "email": "a@x.com",
            "isComing": "yes",
            "bringingSomeone": true,
            "plusOneName": "Charles"
        }])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_are_all_persisted() {
    let (srv, _) = TestServer::spawn_recording().await;
    let client = reqwest::Client::new();

    let n = 25;
    let mut handles = Vec::with_capacity(n);
    for i in 0..n {
        let client = client.clone();
        let base_url = srv.base_url.clone();
        handles.push(tokio::spawn(async move {
            submit(
                &client,
                &base_url,
                json!({ "name": format!("Guest{i}"), "surname": "Concurrent", "email": format!("g{i}@x.com"), "isComing": "yes" }),
            )
            .await
            .status()
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap(), StatusCode::OK);
    }

    let (_, body) = replies(&client, &srv.base_url).await;
    let stored = body["replies"].as_array().unwrap();
    assert_eq!(stored.len(), n);
    assert_eq!(body["totals"], json!({ "yes": n, "no": 0 }));
    for i in 0..n {
        let name = format!("Guest{i}");
        assert_eq!(stored.iter().filter(|r| r["name"] == name.as_str()).count(), 1);
    }
}

#[tokio::test]
async fn notification_failure_does_not_affect_response() {
    let srv = TestServer::spawn(Arc::new(FailingNotifier)).await;
    let client = reqwest::Client::new();

    let res = submit(
        &client,
        &srv.base_url,
        json!({ "name": "Ada", "surname": "Lovelace", "email": "a@x.com", "isComing": "no" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let (_, body) = replies(&client, &srv.base_url).await;
    assert_eq!(body["totals"], json!({ "yes": 0, "no": 1 }));
}

#[tokio::test]
async fn corrupt_document_is_reported_and_preserved() {
    let (srv, recorder) = TestServer::spawn_recording().await;
    let client = reqwest::Client::new();

    std::fs::create_dir_all(srv.replies_path.parent().unwrap()).unwrap();
    std::fs::write(&srv.replies_path, "[{\"name\": \"Ada\"").unwrap();

    let (status, body) = replies(&client, &srv.base_url).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to read data." }));

    let res = submit(
        &client,
        &srv.base_url,
        json!({ "name": "Alan", "surname": "Turing", "email": "t@x.com" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to read data." }));

    assert_eq!(
        std::fs::read_to_string(&srv.replies_path).unwrap(),
        "[{\"name\": \"Ada\""
    );
    assert!(recorder.sent().is_empty());
}

#[tokio::test]
async fn cors_preflight_allows_frontend_origin_only() {
    let (srv, _) = TestServer::spawn_recording().await;
    let client = reqwest::Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, format!("{}/submit", srv.base_url))
        .header("origin", FRONTEND_ORIGIN)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some(FRONTEND_ORIGIN)
    );
    assert_eq!(
        res.headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );

    let res = client
        .get(format!("{}/replies", srv.base_url))
        .header("origin", "https://evil.example.com")
        .send()
        .await
        .unwrap();
    assert!(res.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn optional_fields_of_unexpected_type_are_accepted_verbatim() {
    let (srv, _) = TestServer::spawn_recording().await;
    let client = reqwest::Client::new();

    let res = submit(
        &client,
        &srv.base_url,
        json!({
            "name": "Ada",
            "surname": "L",
            "email": "a@x.com",
            "isComing": true,
            "bringingSomeone": 1,
            "notes": 123
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let (_, body) = replies(&client, &srv.base_url).await;
    assert_eq!(body["totals"], json!({ "yes": 0, "no": 0 }));
    assert_eq!(
        body["replies"],
        json!([{
            "name": "Ada",
            "surname": "L",
            "email": "a@x.com",
            "isComing": true,
            "bringingSomeone": 1,
            "notes": 123
        }])
    );
}

#[tokio::test]
async fn store_write_failure_is_reported_as_save_failure() {
    let recorder = Arc::new(RecordingNotifier::new());
    let notifications = NotificationDispatcher::new(recorder.clone(), EmailSettings::default());
    let services = Arc::new(AppServices::new(Arc::new(ReadOnlyDiskStore), notifications));
    let (base_url, handle) = serve(services).await;
    let client = reqwest::Client::new();

    let res = submit(
        &client,
        &base_url,
        json!({ "name": "Ada", "surname": "Lovelace", "email": "a@x.com", "isComing": "yes" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to save reply." }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(recorder.sent().is_empty());
    handle.abort();
}
