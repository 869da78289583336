//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::body::{Body, Bytes};
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use soporte_remoto::{
    app_state::AppState, config::AppConfig, server::build_router, sessions::session_key,
};

pub const ADMIN_PASSWORD: &str = "correct-horse-battery-staple";
pub const BOUNDARY: &str = "----soporte-remoto-test-boundary";

pub const WINDOWS_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0";
pub const ANDROID_UA: &str =
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Mobile";
pub const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

/// Test application backed by a temporary storage directory.
pub struct TestApp {
    pub router: Router,
    pub config: AppConfig,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Build an app after adjusting the default test configuration.
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.storage.root = dir.path().join("downloads");
        config.security.admin_password = Some(ADMIN_PASSWORD.to_string());
        config.validate().expect("Test config should validate");
        adjust(&mut config);

        let router = build_router(
            AppState::new(config.clone()),
            MemoryStore::default(),
            session_key(None),
        )
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40_000))));

        Self {
            router,
            config,
            _dir: dir,
        }
    }

    pub fn storage_path(&self, filename: &str) -> PathBuf {
        self.config.storage.root.join(filename)
    }

    pub fn put_file(&self, filename: &str, contents: &[u8]) {
        std::fs::write(self.storage_path(filename), contents).expect("Failed to seed file");
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    pub async fn get_with_agent(&self, path: &str, user_agent: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header(header::USER_AGENT, user_agent)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post_login(&self, password: &str) -> TestResponse {
        self.post_login_via(password, None).await
    }

    /// Submit the login form as if relayed by a proxy reporting `forwarded_for`.
    pub async fn post_login_via(&self, password: &str, forwarded_for: Option<&str>) -> TestResponse {
        let mut request = Request::builder()
            .method("POST")
            .uri("/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(forwarded_for) = forwarded_for {
            request = request.header("x-forwarded-for", forwarded_for);
        }
        let request = request
            .body(Body::from(format!("password={password}")))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Log in with the configured password and return the session cookie.
    pub async fn login(&self) -> String {
        let response = self.post_login(ADMIN_PASSWORD).await;
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location(), Some("/admin/dashboard"));
        response.session_cookie().expect("Login should set a session cookie")
    }

    pub async fn post(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::builder().method("POST").uri(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    pub async fn upload(&self, filename: &str, contents: &[u8], cookie: Option<&str>) -> TestResponse {
        let mut request = Request::builder()
            .method("POST")
            .uri("/admin/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = request
            .body(Body::from(multipart_body(filename, contents)))
            .expect("Failed to build request");
        self.send(request).await
    }
}

pub fn multipart_body(filename: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Response captured from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
    }

    /// `name=value` part of the session `Set-Cookie` header, ready to send back.
    pub fn session_cookie(&self) -> Option<String> {
        self.set_cookie()
            .and_then(|value| value.split(';').next())
            .map(|pair| pair.trim().to_string())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Response body should be JSON")
    }
}
