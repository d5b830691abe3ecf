//! Entity bindings for the generic list controller.

use async_trait::async_trait;

use crate::api::types::{Comment, Issue, Project};
use crate::api::{ApiClient, PageQuery, PageResult, Result};

/// Something that can fetch one page of a list.
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    async fn fetch(&self, query: &PageQuery) -> Result<PageResult<Self::Item>>;
}

/// All projects visible to the user.
#[derive(Debug, Clone)]
pub struct ProjectList {
    client: ApiClient,
}

impl ProjectList {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListSource for ProjectList {
    type Item = Project;

    async fn fetch(&self, query: &PageQuery) -> Result<PageResult<Project>> {
        self.client.list_projects(query).await
    }
}

/// Issues, optionally pinned to one project.
///
/// The project scope is applied at fetch time rather than stored as a
/// filter, so it never counts as the user narrowing the list.
#[derive(Debug, Clone)]
pub struct IssueList {
    client: ApiClient,
    project_id: Option<String>,
}

impl IssueList {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            project_id: None,
        }
    }

    pub fn for_project(client: ApiClient, project_id: impl Into<String>) -> Self {
        Self {
            client,
            project_id: Some(project_id.into()),
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

#[async_trait]
impl ListSource for IssueList {
    type Item = Issue;

    async fn fetch(&self, query: &PageQuery) -> Result<PageResult<Issue>> {
        match &self.project_id {
            Some(id) => {
                let scoped = query.clone().with_filter("project_id", id.as_str());
                self.client.list_issues(&scoped).await
            }
            None => self.client.list_issues(query).await,
        }
    }
}

/// Comments on one issue.
#[derive(Debug, Clone)]
pub struct CommentList {
    client: ApiClient,
    issue_id: String,
}

impl CommentList {
    pub fn new(client: ApiClient, issue_id: impl Into<String>) -> Self {
        Self {
            client,
            issue_id: issue_id.into(),
        }
    }

    pub fn issue_id(&self) -> &str {
        &self.issue_id
    }
}

#[async_trait]
impl ListSource for CommentList {
    type Item = Comment;

    async fn fetch(&self, query: &PageQuery) -> Result<PageResult<Comment>> {
        self.client.list_comments(&self.issue_id, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{issue_json, TestHarness};
    use serde_json::json;

    #[tokio::test]
    async fn test_issue_list_applies_project_scope() {
        let harness = TestHarness::signed_in();
        harness.transport.push_json(
            200,
            json!({ "issues": [issue_json("i-1", "p-9", "open")], "total": 1 }),
        );
        let source = IssueList::for_project(harness.client.clone(), "p-9");

        let query = PageQuery::new(10).with_filter("status", "open");
        source.fetch(&query).await.unwrap();

        assert_eq!(
            harness.transport.paths(),
            vec!["/issues?limit=10&offset=0&project_id=p-9&status=open"]
        );
        assert_eq!(query.filter("project_id"), None);
    }

    #[tokio::test]
    async fn test_comment_list_is_scoped_to_issue() {
        let harness = TestHarness::signed_in();
        harness
            .transport
            .push_json(200, json!({ "comments": [], "total": 0 }));
        let source = CommentList::new(harness.client.clone(), "i-4");

        let page = source.fetch(&PageQuery::new(5)).await.unwrap();

        assert!(page.is_empty());
        assert_eq!(
            harness.transport.paths(),
            vec!["/comments/issue/i-4?limit=5&offset=0"]
        );
    }
}
