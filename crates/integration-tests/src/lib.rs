//! Integration test harness for the portfolio site.
//!
//! Each test spawns two servers on ephemeral ports:
//!
//! - [`MockBackend`]: a scripted stand-in for the portfolio REST backend that
//!   records every request it receives
//! - [`TestSite`]: the real site router pointed at the mock backend
//!
//! Requests are driven with a cookie-storing `reqwest` client that does not
//! follow redirects, so tests can assert on `Location` headers.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p portfolio-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use portfolio_site::{
    config::SiteConfig, middleware::session::SESSION_COOKIE_NAME, profile::Profile, routes,
    state::AppState,
};
use reqwest::{Client, redirect::Policy};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

// =============================================================================
// Mock Backend
// =============================================================================

/// A request received by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    /// Parsed body, when the request was JSON.
    pub json: Option<Value>,
}

#[derive(Default)]
struct MockState {
    /// One-shot replies, consumed in order.
    scripted: Mutex<HashMap<String, VecDeque<(StatusCode, Value)>>>,
    /// Replies used once the one-shot queue is empty.
    fixed: Mutex<HashMap<String, (StatusCode, Value)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Scripted portfolio backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{method} {path}")
}

impl MockBackend {
    /// Start the mock on an ephemeral port.
    ///
    /// Unscripted routes answer `404 {"message": "not scripted"}`.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock backend failed");
        });

        Self { addr, state }
    }

    /// Base URL of the mock.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("mock backend URL")
    }

    /// Queue a one-shot reply for `method path`.
    pub fn script(&self, method: Method, path: &str, status: u16, body: Value) {
        self.state
            .scripted
            .lock()
            .expect("mock state poisoned")
            .entry(route_key(&method, path))
            .or_default()
            .push_back((status_code(status), body));
    }

    /// Answer every unscripted `method path` request with this reply.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.state
            .fixed
            .lock()
            .expect("mock state poisoned")
            .insert(route_key(&method, path), (status_code(status), body));
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .expect("mock state poisoned")
            .clone()
    }

    /// Requests received for `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == *method && r.path == path)
            .collect()
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).expect("valid status code")
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let content_type = header_text(header::CONTENT_TYPE);
    let json = content_type
        .as_deref()
        .filter(|ct| ct.starts_with("application/json"))
        .and_then(|_| serde_json::from_slice(&body).ok());

    let path = uri.path().to_string();
    let key = route_key(&method, &path);

    state
        .requests
        .lock()
        .expect("mock state poisoned")
        .push(RecordedRequest {
            method,
            path,
            authorization: header_text(header::AUTHORIZATION),
            content_type,
            json,
        });

    let scripted = state
        .scripted
        .lock()
        .expect("mock state poisoned")
        .get_mut(&key)
        .and_then(VecDeque::pop_front);
    let reply = scripted.or_else(|| {
        state
            .fixed
            .lock()
            .expect("mock state poisoned")
            .get(&key)
            .cloned()
    });

    match reply {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "not scripted"})),
        )
            .into_response(),
    }
}

// =============================================================================
// Site Under Test
// =============================================================================

/// The site router served on an ephemeral port.
pub struct TestSite {
    pub base_url: String,
    pub client: Client,
}

impl TestSite {
    /// Serve the site against `backend`.
    pub async fn start(backend: Url) -> Self {
        Self::start_with(SiteConfig::for_backend(backend)).await
    }

    /// Serve the site with an explicit configuration.
    pub async fn start_with(mut config: SiteConfig) -> Self {
        config.static_dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../site/static"));

        let profile = Profile::builtin().expect("builtin profile");
        let state = AppState::new(config, profile).expect("Failed to create application state");
        let app = routes::app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind site");
        let addr = listener.local_addr().expect("site address");
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("site failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: new_client(),
        }
    }

    /// Absolute URL for a site path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A fresh browser: same site, empty cookie jar.
    #[must_use]
    pub fn new_browser(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: new_client(),
        }
    }

    /// Submit the credential form.
    pub async fn submit_login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/admin/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("login request failed")
    }

    /// Submit the OTP form.
    pub async fn submit_otp(&self, otp: &str) -> reqwest::Response {
        self.client
            .post(self.url("/admin/otp"))
            .form(&[("otp", otp)])
            .send()
            .await
            .expect("OTP request failed")
    }

    /// GET a site path.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// POST to a site path without a body.
    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .send()
            .await
            .expect("POST request failed")
    }

    /// Complete the handshake as `a@b.com`, receiving `token`.
    pub async fn sign_in(&self, backend: &MockBackend, token: &str) {
        backend.script(Method::POST, "/api/admin/login", 200, json!({}));
        backend.script(
            Method::POST,
            "/api/admin/verify-otp",
            200,
            json!({"token": token, "name": "Site Owner"}),
        );

        let response = self.submit_login("a@b.com", "x").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let response = self.submit_otp("123456").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Start a mock backend and a site pointed at it.
pub async fn start() -> (MockBackend, TestSite) {
    let backend = MockBackend::start().await;
    let site = TestSite::start(backend.url()).await;
    (backend, site)
}

/// Value of the session cookie set by `response`, if any.
#[must_use]
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    let prefix = format!("{SESSION_COOKIE_NAME}=");
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix(&prefix))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// A backend that accepts connections but never answers.
pub async fn hung_backend() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind hung backend");
    let addr = listener.local_addr().expect("hung backend address");
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            open.push(stream);
        }
    });
    Url::parse(&format!("http://{addr}")).expect("hung backend URL")
}

/// A backend URL nothing is listening on.
pub async fn unreachable_backend() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("unreachable backend URL")
}
