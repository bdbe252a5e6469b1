//! Shared harness for lumicat-server integration tests
//!
//! Each `TestApp` owns a fresh SQLite file in a temporary directory and a
//! router driven in-process with `oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use lumicat_common::config::TomlConfig;
use lumicat_common::db::init_database;
use lumicat_server::{build_router, AppState};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "lumicat-test-boundary";

pub struct TestApp {
    pub app: Router,
    pub db: SqlitePool,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(TomlConfig::default()).await
    }

    pub async fn with_config(config: TomlConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let db = init_database(&dir.path().join("lumicat.db")).await.unwrap();
        let state = AppState::new(db.clone(), config).unwrap();

        Self {
            app: build_router(state),
            db,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// JSON request; returns the status and the parsed body
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.send(request).await;
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    /// Multipart upload of a single part
    pub async fn upload(
        &self,
        uri: &str,
        field: &str,
        filename: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> (StatusCode, Value) {
        let response = self
            .send(multipart_request(uri, field, filename, content_type, data))
            .await;
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }

    /// POST a luminaire and return the created record
    pub async fn create(&self, body: Value) -> Value {
        let (status, record) = self.request("POST", "/api/catalog", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", record);
        record
    }
}

pub fn multipart_request(
    uri: &str,
    field: &str,
    filename: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    if let Some(ct) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Parse a response body; empty bodies become `Null`, non-JSON a string
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
}
