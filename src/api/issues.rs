//! Issue endpoints.

use tracing::{debug, instrument};

use super::client::ApiClient;
use super::error::Result;
use super::query::{decode_page, PageQuery, PageResult};
use super::transport::Method;
use super::types::{Issue, IssueUpdate, NewIssue};

const COLLECTION: &str = "issues";

/// Filter fields accepted by `GET /issues`, in query-string order.
pub const ISSUE_FILTER_FIELDS: &[&str] = &["project_id", "status", "priority", "assigned_to"];

fn issue_path(id: &str) -> String {
    format!("/issues/{}", urlencoding::encode(id))
}

impl ApiClient {
    /// List one page of issues.
    ///
    /// Without a `project_id` filter the server returns issues of all
    /// projects owned by the current user.
    #[instrument(skip(self))]
    pub async fn list_issues(&self, query: &PageQuery) -> Result<PageResult<Issue>> {
        let path = query.to_path("/issues", ISSUE_FILTER_FIELDS);
        let body: serde_json::Value = self.get(&path).await?;
        let page = decode_page(body, COLLECTION)?;
        debug!("Fetched {} issues (total: {})", page.items.len(), page.total);
        Ok(page)
    }

    #[instrument(skip(self))]
    pub async fn get_issue(&self, id: &str) -> Result<Issue> {
        self.get(&issue_path(id)).await
    }

    #[instrument(skip(self, issue), fields(project_id = %issue.project_id))]
    pub async fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
        self.execute(Method::POST, "/issues", Some(issue)).await
    }

    /// Apply a partial update.
    ///
    /// The caller decides whether to merge the change into held copies
    /// ([`Issue::apply`]) or refetch.
    #[instrument(skip(self, update))]
    pub async fn update_issue(&self, id: &str, update: &IssueUpdate) -> Result<Issue> {
        self.execute(Method::PUT, &issue_path(id), Some(update)).await
    }

    #[instrument(skip(self))]
    pub async fn delete_issue(&self, id: &str) -> Result<()> {
        self.execute_empty::<()>(Method::DELETE, &issue_path(id), None)
            .await
    }
}
