//! Project endpoints.

use tracing::{debug, instrument, warn};

use super::client::ApiClient;
use super::error::Result;
use super::query::{decode_items, decode_page, PageQuery, PageResult};
use super::transport::Method;
use super::types::{Project, ProjectInput, ProjectOverview};

/// Collection field of project listings.
const COLLECTION: &str = "projects";

/// Projects only support free-text search.
pub const PROJECT_FILTER_FIELDS: &[&str] = &[];

fn project_path(id: &str) -> String {
    format!("/projects/{}", urlencoding::encode(id))
}

impl ApiClient {
    /// List one page of projects.
    ///
    /// Calls `GET /projects?limit=..&offset=..[&search=..]`.
    #[instrument(skip(self))]
    pub async fn list_projects(&self, query: &PageQuery) -> Result<PageResult<Project>> {
        let path = query.to_path("/projects", PROJECT_FILTER_FIELDS);
        let body: serde_json::Value = self.get(&path).await?;
        let page = decode_page(body, COLLECTION)?;
        debug!("Fetched {} projects (total: {})", page.items.len(), page.total);
        Ok(page)
    }

    /// List every project without pagination, e.g. for pickers.
    #[instrument(skip(self))]
    pub async fn all_projects(&self) -> Result<Vec<Project>> {
        let body: serde_json::Value = self.get("/projects").await?;
        decode_items(body, COLLECTION)
    }

    #[instrument(skip(self))]
    pub async fn get_project(&self, id: &str) -> Result<Project> {
        self.get(&project_path(id)).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_project(&self, input: &ProjectInput) -> Result<Project> {
        self.execute(Method::POST, "/projects", Some(input)).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_project(&self, id: &str, input: &ProjectInput) -> Result<Project> {
        self.execute(Method::PUT, &project_path(id), Some(input)).await
    }

    /// Delete a project. The server restricts this to admins.
    #[instrument(skip(self))]
    pub async fn delete_project(&self, id: &str) -> Result<()> {
        self.execute_empty::<()>(Method::DELETE, &project_path(id), None)
            .await
    }

    /// Fetch a project together with the first page of its issues.
    ///
    /// The project is the primary content: its failure is returned. The issue
    /// list is secondary: a failure there is logged and yields no issues.
    #[instrument(skip(self))]
    pub async fn project_overview(&self, id: &str, issue_limit: u64) -> Result<ProjectOverview> {
        let project = self.get_project(id).await?;

        let query = PageQuery::new(issue_limit).with_filter("project_id", id);
        let (issues, issue_total) = match self.list_issues(&query).await {
            Ok(page) => (page.items, page.total),
            Err(e) => {
                warn!("Failed to fetch issues for project {}: {}", id, e);
                (Vec::new(), 0)
            }
        };

        Ok(ProjectOverview {
            project,
            issues,
            issue_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorKind;
    use crate::test_support::{issue_json, project_json, TestHarness};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_projects_builds_query() {
        let harness = TestHarness::signed_in();
        harness.transport.push_json(
            200,
            json!({ "projects": [project_json("p-1", "Apollo")], "total": 7 }),
        );

        let query = PageQuery::new(6).with_offset(6).with_search("apo llo");
        let page = harness.client.list_projects(&query).await.unwrap();

        assert_eq!(page.total, 7);
        assert_eq!(page.items[0].name, "Apollo");
        assert_eq!(
            harness.transport.paths(),
            vec!["/projects?limit=6&offset=6&search=apo%20llo"]
        );
    }

    #[tokio::test]
    async fn test_all_projects_has_no_query() {
        let harness = TestHarness::signed_in();
        harness
            .transport
            .push_json(200, json!({ "projects": [project_json("p-1", "A"), project_json("p-2", "B")] }));

        let projects = harness.client.all_projects().await.unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(harness.transport.paths(), vec!["/projects"]);
    }

    #[tokio::test]
    async fn test_mutations_use_matching_verbs() {
        let harness = TestHarness::signed_in();
        harness.transport.push_json(201, project_json("p-3", "Gemini"));
        harness.transport.push_json(200, project_json("p-3", "Gemini II"));
        harness.transport.push_json(200, json!({ "message": "deleted" }));

        let input = ProjectInput {
            name: "Gemini".to_string(),
            description: "Two seats".to_string(),
        };
        let created = harness.client.create_project(&input).await.unwrap();
        let updated = harness
            .client
            .update_project(&created.id, &ProjectInput {
                name: "Gemini II".to_string(),
                ..input
            })
            .await
            .unwrap();
        harness.client.delete_project(&updated.id).await.unwrap();

        let methods: Vec<_> = harness
            .transport
            .requests()
            .into_iter()
            .map(|r| r.method)
            .collect();
        assert_eq!(methods, vec![Method::POST, Method::PUT, Method::DELETE]);
        assert_eq!(
            harness.transport.paths(),
            vec!["/projects", "/projects/p-3", "/projects/p-3"]
        );
    }

    #[tokio::test]
    async fn test_create_does_not_change_a_fetched_page() {
        let harness = TestHarness::signed_in();
        harness
            .transport
            .push_json(200, json!({ "projects": [project_json("p-1", "A")], "total": 1 }));
        harness.transport.push_json(201, project_json("p-2", "B"));

        let query = PageQuery::new(6);
        let page = harness.client.list_projects(&query).await.unwrap();
        harness
            .client
            .create_project(&ProjectInput {
                name: "B".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_overview_degrades_when_issue_fetch_fails() {
        let harness = TestHarness::signed_in();
        harness.transport.push_json(200, project_json("p-1", "Apollo"));
        harness
            .transport
            .push_json(500, json!({ "error": "Failed to fetch issues" }));

        let overview = harness.client.project_overview("p-1", 10).await.unwrap();

        assert_eq!(overview.project.name, "Apollo");
        assert!(overview.issues.is_empty());
        assert_eq!(overview.issue_total, 0);
        assert_eq!(
            harness.transport.paths()[1],
            "/issues?limit=10&offset=0&project_id=p-1"
        );
    }

    #[tokio::test]
    async fn test_overview_includes_issues() {
        let harness = TestHarness::signed_in();
        harness.transport.push_json(200, project_json("p-1", "Apollo"));
        harness.transport.push_json(
            200,
            json!({ "issues": [issue_json("i-1", "p-1", "open")], "total": 1 }),
        );

        let overview = harness.client.project_overview("p-1", 10).await.unwrap();

        assert_eq!(overview.issues.len(), 1);
        assert_eq!(overview.issue_total, 1);
    }

    #[tokio::test]
    async fn test_overview_fails_when_project_missing() {
        let harness = TestHarness::signed_in();
        harness
            .transport
            .push_json(404, json!({ "error": "Project not found" }));

        let err = harness.client.project_overview("nope", 10).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.to_string(), "Project not found");
        assert_eq!(harness.transport.requests().len(), 1);
    }
}
