//! Shared fixtures for integration tests.
//!
//! `StubServer` is a [`Transport`] that answers from canned routes, optionally
//! after a delay, and records every request it sees.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use trackmybugs::api::{ApiClient, ApiError, HttpRequest, HttpResponse, Result, Transport};
use trackmybugs::events::NavigationBus;
use trackmybugs::session::{SessionStore, SessionUser};

pub const BASE_URL: &str = "http://localhost:8080/api/v1";

struct Route {
    /// Path and query the request must match exactly.
    path: String,
    status: u16,
    body: Value,
    delay: Duration,
}

#[derive(Default)]
pub struct StubServer {
    routes: Mutex<Vec<Route>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl StubServer {
    pub fn route(&self, path: &str, status: u16, body: Value) {
        self.route_delayed(path, status, body, Duration::ZERO);
    }

    pub fn route_delayed(&self, path: &str, status: u16, body: Value, delay: Duration) {
        self.routes.lock().unwrap().push(Route {
            path: path.to_string(),
            status,
            body,
            delay,
        });
    }

    /// Paths requested so far, relative to the base URL.
    pub fn paths(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.trim_start_matches(BASE_URL).to_string())
            .collect()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubServer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let path = request.url.trim_start_matches(BASE_URL).to_string();
        self.seen.lock().unwrap().push(request);

        let matched = {
            let routes = self.routes.lock().unwrap();
            routes
                .iter()
                .find(|r| r.path == path)
                .map(|r| (r.status, r.body.clone(), r.delay))
        };

        match matched {
            Some((status, body, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(HttpResponse::json(status, &body))
            }
            None => Err(ApiError::Network(format!("no route for {path}"))),
        }
    }
}

pub struct TestContext {
    pub server: Arc<StubServer>,
    pub session: SessionStore,
    pub navigation: NavigationBus,
    pub client: ApiClient,
}

impl TestContext {
    pub fn new() -> Self {
        let server = Arc::new(StubServer::default());
        let session = SessionStore::in_memory();
        let navigation = NavigationBus::new();
        let client = ApiClient::with_transport(
            BASE_URL,
            server.clone(),
            session.clone(),
            navigation.clone(),
        );
        Self {
            server,
            session,
            navigation,
            client,
        }
    }

    pub fn signed_in() -> Self {
        let ctx = Self::new();
        ctx.session.set("integration-token", user());
        ctx
    }
}

pub fn user() -> SessionUser {
    SessionUser {
        id: "u-7".to_string(),
        email: "grace@example.com".to_string(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        role: "user".to_string(),
    }
}

pub fn projects_page(names: &[&str], total: u64) -> Value {
    let projects: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "id": format!("p-{i}"),
                "name": name,
                "description": "",
                "created_by": "u-7",
                "created_at": "2024-05-01T10:00:00Z",
                "updated_at": "2024-05-01T10:00:00Z"
            })
        })
        .collect();
    json!({ "projects": projects, "total": total })
}
