//! Authentication endpoints.
//!
//! Login and registration are anonymous calls; on success the returned token
//! and user become the current session.

use tracing::{info, instrument};

use super::client::ApiClient;
use super::error::Result;
use super::transport::Method;
use super::types::{AuthResponse, Credentials, Registration};
use crate::session::SessionUser;

impl ApiClient {
    /// Sign in with email and password.
    ///
    /// Calls `POST /auth/login` and stores the returned session.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self
            .execute(Method::POST, "/auth/login", Some(&credentials))
            .await?;
        Ok(self.establish(response))
    }

    /// Create an account and sign in.
    ///
    /// Calls `POST /auth/register` and stores the returned session.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<SessionUser> {
        let response: AuthResponse = self
            .execute(Method::POST, "/auth/register", Some(registration))
            .await?;
        Ok(self.establish(response))
    }

    /// Sign out locally. There is no server-side logout endpoint.
    pub fn logout(&self) {
        self.session().clear();
        info!("Logged out");
    }

    fn establish(&self, response: AuthResponse) -> SessionUser {
        self.session().set(response.token, response.user.clone());
        response.user
    }
}
