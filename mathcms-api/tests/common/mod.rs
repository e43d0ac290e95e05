//! Common test utilities for integration tests
//!
//! - An in-memory application with a temporary upload directory
//! - Admin and editor tokens signed with the test secret
//! - Request helpers that return the status and the JSON body

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use mathcms_api::app::{build_router, AppState};
use mathcms_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, UploadConfig};
use mathcms_shared::auth::jwt::{create_token, Claims};
use mathcms_shared::models::user::Role;
use mathcms_shared::store::Backend;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub upload_dir: TempDir,
    pub admin_token: String,
    pub editor_token: String,
}

/// Status and decoded body of a response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// One part of a multipart body
pub struct Part {
    pub name: &'static str,
    pub filename: Option<&'static str>,
    pub content_type: Option<&'static str>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn file(content_type: &'static str, filename: &'static str, data: Vec<u8>) -> Self {
        Self {
            name: "file",
            filename: Some(filename),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'static str, value: &str) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

pub fn test_config(upload_dir: &TempDir) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://localhost/unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
            expiry_hours: 1,
        },
        uploads: UploadConfig {
            dir: upload_dir.path().to_path_buf(),
        },
        admin: None,
    }
}

pub fn token(role: Role) -> String {
    let claims = Claims::new(
        Uuid::new_v4(),
        format!("{}@math.example.org", role),
        role,
        Duration::hours(1),
    );
    create_token(&claims, SECRET).unwrap()
}

impl TestContext {
    /// Creates a fresh application over an empty in-memory store
    pub fn new() -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let state = AppState::new(Backend::memory(), test_config(&upload_dir));
        let app = build_router(state.clone());

        Self {
            app,
            state,
            upload_dir,
            admin_token: token(Role::Admin),
            editor_token: token(Role::Editor),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).to_string())
            })
        };

        TestResponse { status, body }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request("GET", uri, None, None).await
    }

    pub async fn get_as(&self, uri: &str, token: &str) -> TestResponse {
        self.request("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request("POST", uri, Some(&self.editor_token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request("PUT", uri, Some(&self.editor_token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request("DELETE", uri, Some(&self.editor_token), None).await
    }

    /// Creates a document and returns its id
    pub async fn create(&self, uri: &str, body: Value) -> String {
        let response = self.post(uri, body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn multipart(&self, uri: &str, token: Option<&str>, parts: Vec<Part>) -> TestResponse {
        let boundary = "mathcms-test-boundary";
        let mut body = Vec::new();

        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            match part.filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name).as_bytes(),
                ),
            }
            if let Some(content_type) = part.content_type {
                body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            );
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Files currently stored under `<upload_root>/<kind>`
    pub fn stored_files(&self, kind: &str) -> Vec<String> {
        match std::fs::read_dir(self.upload_dir.path().join(kind)) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
