//! Comment endpoints.

use tracing::{debug, instrument};

use super::client::ApiClient;
use super::error::Result;
use super::query::{decode_page, PageQuery, PageResult};
use super::transport::Method;
use super::types::{Comment, CommentUpdate, NewComment};

const COLLECTION: &str = "comments";

/// Comment listings take no filters; the issue is part of the path.
pub const COMMENT_FILTER_FIELDS: &[&str] = &[];

fn comment_path(id: &str) -> String {
    format!("/comments/{}", urlencoding::encode(id))
}

impl ApiClient {
    /// List one page of comments on an issue, oldest first.
    #[instrument(skip(self))]
    pub async fn list_comments(
        &self,
        issue_id: &str,
        query: &PageQuery,
    ) -> Result<PageResult<Comment>> {
        let base = format!("/comments/issue/{}", urlencoding::encode(issue_id));
        let path = query.to_path(&base, COMMENT_FILTER_FIELDS);
        let body: serde_json::Value = self.get(&path).await?;
        let page = decode_page(body, COLLECTION)?;
        debug!("Fetched {} comments (total: {})", page.items.len(), page.total);
        Ok(page)
    }

    #[instrument(skip(self, comment), fields(issue_id = %comment.issue_id))]
    pub async fn create_comment(&self, comment: &NewComment) -> Result<Comment> {
        self.execute(Method::POST, "/comments", Some(comment)).await
    }

    /// Edit a comment. Only its author may do this.
    #[instrument(skip(self, content))]
    pub async fn update_comment(&self, id: &str, content: &str) -> Result<Comment> {
        let update = CommentUpdate {
            content: content.to_string(),
        };
        self.execute(Method::PUT, &comment_path(id), Some(&update))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_comment(&self, id: &str) -> Result<()> {
        self.execute_empty::<()>(Method::DELETE, &comment_path(id), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestHarness;
    use serde_json::json;

    fn comment_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "content": "Reproduced on 1.2",
            "issue_id": "i-1",
            "user_id": "u-1",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_list_comments_uses_issue_path() {
        let harness = TestHarness::signed_in();
        harness
            .transport
            .push_json(200, json!({ "comments": [comment_json("c-1")], "total": 11 }));

        let page = harness
            .client
            .list_comments("i-1", &PageQuery::new(5).with_offset(10))
            .await
            .unwrap();

        assert_eq!(page.items[0].content, "Reproduced on 1.2");
        assert_eq!(page.total, 11);
        assert_eq!(
            harness.transport.paths(),
            vec!["/comments/issue/i-1?limit=5&offset=10"]
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_comment() {
        let harness = TestHarness::signed_in();
        harness.transport.push_json(200, comment_json("c-1"));
        harness.transport.push_json(200, json!({ "message": "Comment deleted successfully" }));

        harness.client.update_comment("c-1", "Edited").await.unwrap();
        harness.client.delete_comment("c-1").await.unwrap();

        let requests = harness.transport.requests();
        assert_eq!(requests[0].method, Method::PUT);
        assert_eq!(requests[0].body, Some(json!({ "content": "Edited" })));
        assert_eq!(requests[1].method, Method::DELETE);
        assert!(requests[1].body.is_none());
    }

    #[tokio::test]
    async fn test_forbidden_edit_surfaces_message() {
        let harness = TestHarness::signed_in();
        harness.transport.push_json(
            403,
            json!({ "error": "You can only edit your own comments" }),
        );

        let err = harness.client.update_comment("c-9", "x").await.unwrap_err();

        assert_eq!(err.to_string(), "You can only edit your own comments");
    }
}
