//! Common test utilities and fixtures for integration tests

#![allow(dead_code, clippy::missing_panics_doc, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use helpdesk_core::Config;
use serde_json::{Value, json};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

/// A ticket export written to a temporary directory
pub struct TestExport {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestExport {
    /// Write `contents` as `freshdesk_tickets6.json`
    pub fn new(contents: &str) -> Self {
        let export = Self::missing();
        std::fs::write(&export.path, contents).unwrap();
        export
    }

    /// Write the given ticket objects as a JSON array
    pub fn with_tickets(tickets: &[Value]) -> Self {
        Self::new(&Value::Array(tickets.to_vec()).to_string())
    }

    /// A path where no export exists yet
    pub fn missing() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("freshdesk_tickets6.json");
        Self { dir, path }
    }

    /// Default configuration pointed at this export
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.data.path = self.path.clone();
        config
    }

    /// Router serving this export
    pub fn app(&self) -> Router {
        helpdesk_web::build_app(self.config())
    }
}

/// Builder for a single ticket record as it appears in the export
pub struct TicketFixture {
    value: Value,
}

impl TicketFixture {
    /// Open, low priority email ticket with a one-day response time
    pub fn new(subject: &str, created_at: &str) -> Self {
        Self {
            value: json!({
                "id": 1,
                "subject": subject,
                "status": 2,
                "priority": 1,
                "source": 1,
                "is_escalated": false,
                "created_at": created_at,
                "updated_at": created_at,
                "due_by": created_at,
                "type": "Question",
                "tags": []
            }),
        }
    }

    pub fn status(mut self, status: i64) -> Self {
        self.value["status"] = json!(status);
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.value["priority"] = json!(priority);
        self
    }

    pub fn source(mut self, source: i64) -> Self {
        self.value["source"] = json!(source);
        self
    }

    pub fn escalated(mut self) -> Self {
        self.value["is_escalated"] = json!(true);
        self
    }

    pub fn updated_at(mut self, updated_at: &str) -> Self {
        self.value["updated_at"] = json!(updated_at);
        self
    }

    pub fn build(self) -> Value {
        self.value
    }
}

/// The three-ticket export: statuses [2, 2, 4], escalated [true, false, false]
pub fn three_ticket_export() -> TestExport {
    TestExport::with_tickets(&[
        TicketFixture::new("Cannot log in", "2024-01-01T09:00:00Z")
            .escalated()
            .updated_at("2024-01-02T09:00:00Z")
            .build(),
        TicketFixture::new("Invoice missing", "2024-01-01T15:00:00Z")
            .priority(3)
            .source(7)
            .updated_at("2024-01-01T21:00:00Z")
            .build(),
        TicketFixture::new("Feature request", "2024-01-03T09:00:00Z")
            .status(4)
            .priority(2)
            .source(9)
            .updated_at("2024-01-05T09:00:00Z")
            .build(),
    ])
}

/// Send a request and collect status and body
pub async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// GET a page
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    send(app, Method::GET, uri).await
}

/// GET a JSON endpoint
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}
