//! TrackMyBugs API client implementation.
//!
//! [`ApiClient::execute`] is the single chokepoint for every network call. It
//! attaches the bearer token, encodes and decodes JSON, and turns every
//! outcome into `Result<T, ApiError>`. A 401 anywhere clears the session and
//! asks the view layer to show the login screen.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::error::{ApiError, Result};
use super::transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
use crate::events::NavigationBus;
use crate::session::SessionStore;

/// Default API base URL of a local TrackMyBugs server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// The TrackMyBugs API client.
///
/// Cheap to clone; clones share the transport, session and navigation bus.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    session: SessionStore,
    navigation: NavigationBus,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client backed by reqwest.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: SessionStore,
        navigation: NavigationBus,
    ) -> Result<Self> {
        let transport = ReqwestTransport::new(timeout)?;
        Ok(Self::with_transport(
            base_url,
            Arc::new(transport),
            session,
            navigation,
        ))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn Transport>,
        session: SessionStore,
        navigation: NavigationBus,
    ) -> Self {
        Self {
            transport,
            base_url: normalize_base_url(base_url),
            session,
            navigation,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session this client authenticates with.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The bus on which redirect requests are published.
    pub fn navigation(&self) -> &NavigationBus {
        &self.navigation
    }

    /// Perform a request and decode the JSON response body.
    ///
    /// `path` is relative to the base URL and may carry a query string.
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    pub async fn execute<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(method, path, body).await?;
        serde_json::from_slice(&response.body).map_err(|e| {
            warn!("Failed to parse response body: {}", e);
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }

    /// Perform a request whose success body is ignored (e.g. `DELETE`).
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    pub async fn execute_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, path, body).await.map(|_| ())
    }

    /// GET shorthand.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute::<T, ()>(Method::GET, path, None).await
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<HttpResponse>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let request = HttpRequest {
            method,
            url: join_url(&self.base_url, path),
            bearer: self.session.token(),
            body,
        };
        debug!(authenticated = request.bearer.is_some(), "Sending request");

        let response = self.transport.send(request).await.map_err(|e| {
            warn!("Transport failure: {}", e);
            e
        })?;

        self.classify(response)
    }

    /// Map a raw response onto the client's error taxonomy.
    fn classify(&self, response: HttpResponse) -> Result<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }

        if response.status == 401 {
            warn!("Request unauthorized, clearing session");
            self.session.clear();
            self.navigation.redirect_to_login();
            return Err(ApiError::Unauthorized);
        }

        let error = error_from_response(response.status, &response.body);
        debug!(status = response.status, "Request rejected: {}", error);
        Err(error)
    }
}

/// Build a rejection from an error response body.
///
/// The API reports failures as `{"error": "..."}`; anything else gets the
/// generic message.
fn error_from_response(status: u16, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.as_str())
                .map(str::to_string)
        });
    ApiError::rejected(status, message.as_deref())
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    // Warn if not HTTPS (but don't enforce for localhost/testing)
    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. Tokens will be sent in clear text.", url);
    }

    url.to_string()
}
