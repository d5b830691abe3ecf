//! Background task management for non-blocking API operations.
//!
//! List fetches run as tokio tasks and report back over an unbounded channel,
//! so the owning loop keeps handling input while requests are in flight.
//!
//! # Flow
//!
//! 1. A [`ListController`](crate::list::ListController) operation returns a
//!    [`FetchTicket`].
//! 2. The owner hands the ticket to [`TaskSpawner`], which spawns the fetch.
//! 3. When the task finishes it sends an [`ApiMessage`] carrying the ticket.
//! 4. The owner passes ticket and result to `ListController::complete`, which
//!    drops the result if a newer fetch has been issued since.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::types::{Comment, Issue, Project, ProjectOverview};
use crate::api::{ApiClient, PageResult, Result};
use crate::list::{FetchTicket, ListSource};

/// Result of one list fetch, tagged with the ticket it was issued under.
#[derive(Debug)]
pub struct ListMessage<T> {
    pub ticket: FetchTicket,
    pub result: Result<PageResult<T>>,
}

/// Messages sent from background tasks to the owning event loop.
#[derive(Debug)]
pub enum ApiMessage {
    ProjectsFetched(ListMessage<Project>),
    IssuesFetched(ListMessage<Issue>),
    CommentsFetched(ListMessage<Comment>),

    /// Project detail with its first page of issues
    ProjectOverviewFetched {
        project_id: String,
        result: Result<ProjectOverview>,
    },
}

/// Spawns background tasks that report through an [`ApiMessage`] channel.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Spawn a page fetch for any list source.
    ///
    /// `wrap` picks the message variant for the source's item type.
    pub fn spawn_page_fetch<S, F>(&self, source: Arc<S>, ticket: FetchTicket, wrap: F)
    where
        S: ListSource,
        F: FnOnce(ListMessage<S::Item>) -> ApiMessage + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.fetch(ticket.query()).await;
            debug!(
                generation = ticket.generation(),
                ok = result.is_ok(),
                "Page fetch finished"
            );
            // The receiver is gone once the owner shuts down; nothing to report to.
            let _ = tx.send(wrap(ListMessage { ticket, result }));
        });
    }

    pub fn spawn_fetch_projects<S>(&self, source: Arc<S>, ticket: FetchTicket)
    where
        S: ListSource<Item = Project>,
    {
        self.spawn_page_fetch(source, ticket, ApiMessage::ProjectsFetched);
    }

    pub fn spawn_fetch_issues<S>(&self, source: Arc<S>, ticket: FetchTicket)
    where
        S: ListSource<Item = Issue>,
    {
        self.spawn_page_fetch(source, ticket, ApiMessage::IssuesFetched);
    }

    pub fn spawn_fetch_comments<S>(&self, source: Arc<S>, ticket: FetchTicket)
    where
        S: ListSource<Item = Comment>,
    {
        self.spawn_page_fetch(source, ticket, ApiMessage::CommentsFetched);
    }

    /// Spawn a project overview fetch.
    pub fn spawn_fetch_project_overview(
        &self,
        client: &ApiClient,
        project_id: String,
        issue_limit: u64,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.project_overview(&project_id, issue_limit).await;
            let _ = tx.send(ApiMessage::ProjectOverviewFetched { project_id, result });
        });
    }
}

/// Create a task channel and a spawner that feeds it.
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}
