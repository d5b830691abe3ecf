//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiClient, ApiError, HttpRequest, HttpResponse, Transport};
use crate::events::NavigationBus;
use crate::session::{SessionStore, SessionUser};

/// Transport that replays queued responses in order and records requests.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(HttpResponse::json(status, &body));
    }

    pub fn push_error(&self, error: ApiError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// URLs of recorded requests with the test base URL stripped.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.url.trim_start_matches(TEST_BASE_URL).to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted response".into())))
    }
}

pub(crate) const TEST_BASE_URL: &str = "http://localhost:8080/api/v1";

/// A client wired to a scripted transport, with handles to its collaborators.
pub(crate) struct TestHarness {
    pub client: ApiClient,
    pub transport: Arc<ScriptedTransport>,
    pub session: SessionStore,
    pub navigation: NavigationBus,
}

impl TestHarness {
    pub fn new() -> Self {
        let transport = Arc::new(ScriptedTransport::default());
        let session = SessionStore::in_memory();
        let navigation = NavigationBus::new();
        let client = ApiClient::with_transport(
            TEST_BASE_URL,
            transport.clone(),
            session.clone(),
            navigation.clone(),
        );
        Self {
            client,
            transport,
            session,
            navigation,
        }
    }

    /// A harness that is already signed in.
    pub fn signed_in() -> Self {
        let harness = Self::new();
        harness.session.set("test-token", test_user());
        harness
    }
}

pub(crate) fn test_user() -> SessionUser {
    SessionUser {
        id: "u-1".to_string(),
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        role: "admin".to_string(),
    }
}

pub(crate) fn project_json(id: &str, name: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "description": "",
        "created_by": "u-1",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

pub(crate) fn issue_json(id: &str, project_id: &str, status: &str) -> Value {
    serde_json::json!({
        "id": id,
        "title": format!("Issue {id}"),
        "description": "",
        "status": status,
        "priority": "medium",
        "project_id": project_id,
        "created_by": "u-1",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}
