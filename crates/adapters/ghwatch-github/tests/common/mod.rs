use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use ghwatch_core::{Feed, MemorySettings, NotificationTray};
use ghwatch_github::{Notifier, PollerConfig};

/// Canned reply for one feed endpoint.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Json(Value),
    Status(u16, String),
    Raw(String),
    /// Never answer.
    Hang,
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
}

#[derive(Clone, Default)]
struct MockState {
    responses: Arc<Mutex<HashMap<Feed, MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Local stand-in for the GitHub repository events API.
pub struct MockGitHub {
    pub addr: SocketAddr,
    state: MockState,
    _server: tokio::task::JoinHandle<()>,
}

impl MockGitHub {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .route("/repos/{owner}/{repo}/events", axum::routing::get(activity))
            .route(
                "/repos/{owner}/{repo}/issues/events",
                axum::routing::get(issue_events),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            state,
            _server: handle,
        }
    }

    pub fn api_root(&self) -> String {
        format!("http://{}/repos", self.addr)
    }

    pub fn set(&self, feed: Feed, response: MockResponse) {
        self.state.responses.lock().unwrap().insert(feed, response);
    }

    pub fn set_events(&self, feed: Feed, events: Vec<Value>) {
        self.set(feed, MockResponse::Json(Value::Array(events)));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn config(&self) -> PollerConfig {
        PollerConfig {
            api_root: self.api_root(),
            request_timeout_secs: 5,
            ..PollerConfig::default()
        }
    }

    /// A notifier pointed at this mock, with its settings and tray.
    pub fn notifier(
        &self,
        repo: &str,
        token: &str,
    ) -> (Arc<Notifier>, Arc<MemorySettings>, Arc<NotificationTray>) {
        let settings = Arc::new(MemorySettings::with_values(repo, token, false));
        let tray = Arc::new(NotificationTray::with_capacity(16));
        let notifier = Notifier::new(&self.config(), settings.clone(), tray.clone()).unwrap();
        (Arc::new(notifier), settings, tray)
    }
}

async fn activity(State(state): State<MockState>, headers: HeaderMap, uri: Uri) -> Response {
    respond(state, Feed::Activity, headers, uri).await
}

async fn issue_events(State(state): State<MockState>, headers: HeaderMap, uri: Uri) -> Response {
    respond(state, Feed::IssueEvents, headers, uri).await
}

async fn respond(state: MockState, feed: Feed, headers: HeaderMap, uri: Uri) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        headers,
    });

    let response = state
        .responses
        .lock()
        .unwrap()
        .get(&feed)
        .cloned()
        .unwrap_or(MockResponse::Json(Value::Array(vec![])));

    match response {
        MockResponse::Json(body) => (StatusCode::OK, axum::Json(body)).into_response(),
        MockResponse::Status(code, body) => {
            (StatusCode::from_u16(code).unwrap(), body).into_response()
        },
        MockResponse::Raw(body) => (StatusCode::OK, body).into_response(),
        MockResponse::Hang => std::future::pending::<Response>().await,
    }
}
