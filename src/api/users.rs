//! User and profile endpoints.

use tracing::instrument;

use super::client::ApiClient;
use super::error::Result;
use super::query::decode_items;
use super::transport::Method;
use super::types::{ProfileUpdate, Role, RoleUpdate, UserProfile};

impl ApiClient {
    /// List all users. Not paginated.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserProfile>> {
        let body: serde_json::Value = self.get("/users").await?;
        decode_items(body, "users")
    }

    /// Profile of the signed-in user.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<UserProfile> {
        self.get("/users/profile").await
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.execute(Method::PUT, "/users/profile", Some(update))
            .await
    }

    /// Change another user's role. Admin only.
    #[instrument(skip(self))]
    pub async fn set_user_role(&self, user_id: &str, role: Role) -> Result<UserProfile> {
        let path = format!("/users/{}/role", urlencoding::encode(user_id));
        self.execute(Method::PUT, &path, Some(&RoleUpdate { role }))
            .await
    }
}
