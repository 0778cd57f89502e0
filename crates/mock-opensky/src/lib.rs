//! Local stand-in for the OpenSky REST API.
//!
//! Serves scripted answers per path and records every request it receives,
//! so clients can be exercised without touching the public service.
//!
//! ```text
//! GET /api/states/all   → scripted MockResponse (404 when nothing scripted)
//! GET /api/states/own   → scripted MockResponse
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::task::JoinHandle;

/// Path of the states endpoint.
pub const STATES_ALL: &str = "/api/states/all";
/// Path of the own-states endpoint.
pub const STATES_OWN: &str = "/api/states/own";

/// Canned API bodies.
pub mod fixtures {
    /// Four aircraft in extended format; the first is `ab1644` / `UAL421`.
    pub const STATES: &str = include_str!("../fixtures/states.json");
    /// The API's answer when no aircraft are available (`states: null`).
    pub const UNAVAILABLE_STATES: &str = include_str!("../fixtures/unavailable_states.json");
}

// ---------------------------------------------------------------------------
// Scripted answers
// ---------------------------------------------------------------------------

/// What the mock answers on one path.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    content_type: String,
    body: String,
    headers: Vec<(String, String)>,
    delay: Option<Duration>,
}

impl MockResponse {
    /// `200 OK` with a JSON body.
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/json".into(),
            body: body.into(),
            headers: Vec::new(),
            delay: None,
        }
    }

    /// `200 OK` with a plain text body.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/plain".into(),
            ..Self::json(body)
        }
    }

    /// An empty answer with the given status.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::text("")
        }
    }

    /// Add a response header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn render(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            headers.insert(CONTENT_TYPE, value);
        }
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
        (status, headers, self.body).into_response()
    }
}

/// A request as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Request path, e.g. `/api/states/all`.
    pub path: String,
    /// Raw query string, if any.
    pub query: Option<String>,
    /// Raw `Authorization` header, if any.
    pub authorization: Option<String>,
    /// Username decoded from a `Basic` authorization header.
    pub username: Option<String>,
    /// `User-Agent` header, if any.
    pub user_agent: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Shared state of the mock: scripted answers and the request log.
#[derive(Debug, Clone, Default)]
pub struct MockState {
    routes: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockState {
    /// State answering both states endpoints with [`fixtures::STATES`].
    pub fn with_fixtures() -> Self {
        let state = Self::default();
        state.respond(STATES_ALL, MockResponse::json(fixtures::STATES));
        state.respond(STATES_OWN, MockResponse::json(fixtures::STATES));
        state
    }

    /// Script the answer for `path`, replacing any previous one.
    pub fn respond(&self, path: &str, response: MockResponse) {
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), response);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, request: RecordedRequest) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
    }

    fn scripted(&self, path: &str) -> Option<MockResponse> {
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }
}

/// Build the mock router.
pub fn router(state: MockState) -> Router {
    Router::new().fallback(answer).with_state(state)
}

async fn answer(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let authorization = header(AUTHORIZATION);
    let request = RecordedRequest {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_owned),
        username: authorization.as_deref().and_then(basic_username),
        authorization,
        user_agent: header(USER_AGENT),
    };
    tracing::info!(path = %request.path, query = ?request.query, "request");
    state.record(request);

    if method != Method::GET {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    let Some(response) = state.scripted(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }
    response.render()
}

/// Username of a `Basic` authorization header.
fn basic_username(header: &str) -> Option<String> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    decoded.split_once(':').map(|(user, _)| user.to_string())
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A mock API listening on an ephemeral localhost port.
///
/// The server task is aborted when the value is dropped.
pub struct MockOpenSky {
    addr: SocketAddr,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockOpenSky {
    /// Start a mock without any scripted answer.
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(MockState::default()).await
    }

    /// Start a mock serving `state`.
    pub async fn start_with(state: MockState) -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "mock server stopped");
            }
        });
        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Script the answer for `path`.
    pub fn respond(&self, path: &str, response: MockResponse) {
        self.state.respond(path, response);
    }

    /// Base URL to point a client at, e.g. `http://127.0.0.1:53211/api/`.
    pub fn api_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    /// Socket address the mock listens on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests()
    }
}

impl Drop for MockOpenSky {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    #[test]
    fn fixtures_are_valid_json() {
        let states: serde_json::Value = serde_json::from_str(fixtures::STATES).unwrap();
        assert_eq!(states["time"], 1683488744);
        assert_eq!(states["states"].as_array().unwrap().len(), 4);
        let empty: serde_json::Value = serde_json::from_str(fixtures::UNAVAILABLE_STATES).unwrap();
        assert!(empty["states"].is_null());
    }

    #[test]
    fn decodes_basic_username() {
        assert_eq!(
            basic_username("Basic dGVzdDp0ZXN0").as_deref(),
            Some("test")
        );
        assert_eq!(basic_username("Bearer abc"), None);
        assert_eq!(basic_username("Basic !!!"), None);
    }

    #[tokio::test]
    async fn serves_scripted_fixture() {
        let state = MockState::with_fixtures();
        let server = TestServer::new(router(state.clone())).unwrap();

        let response = server.get(STATES_ALL).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["states"][0][0], "ab1644");

        let requests = state.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, STATES_ALL);
        assert_eq!(requests[0].authorization, None);
    }

    #[tokio::test]
    async fn records_query_string() {
        let state = MockState::with_fixtures();
        let server = TestServer::new(router(state.clone())).unwrap();

        server
            .get(STATES_ALL)
            .add_query_param("lamin", "0")
            .await;
        assert_eq!(state.requests()[0].query.as_deref(), Some("lamin=0"));
    }

    #[tokio::test]
    async fn unscripted_path_is_not_found() {
        let server = TestServer::new(router(MockState::default())).unwrap();
        let response = server.get("/api/flights/all").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn scripted_status_and_headers() {
        let state = MockState::default();
        state.respond(
            STATES_ALL,
            MockResponse::status(429).with_header("X-Rate-Limit-Retry-After-Seconds", "30"),
        );
        let server = TestServer::new(router(state)).unwrap();

        let response = server.get(STATES_ALL).await;
        assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers()["x-rate-limit-retry-after-seconds"],
            "30"
        );
    }
}
