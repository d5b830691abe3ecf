//! Application state and message loop.
//!
//! `App` wires the active profile to a session store, an API client and the
//! background task channel. It owns one controller per open list and routes
//! [`ApiMessage`]s from finished fetches back to the controller that issued
//! them, mirroring how a screen-based UI would drive the same pieces.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::api::types::ProjectOverview;
use crate::api::{ApiClient, ApiError};
use crate::config::{Config, Profile, SessionStorage};
use crate::error::Result;
use crate::events::{NavigationBus, NavigationEvent};
use crate::list::{CommentList, FetchTicket, IssueList, ListController, ListSource, ProjectList};
use crate::session::{FileBackend, KeyringBackend, MemoryBackend, SessionBackend, SessionStore};
use crate::tasks::{create_task_channel, ApiMessage, TaskSpawner};

/// How a list should be narrowed and positioned before its first fetch.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
    /// 1-based page number.
    pub page: u64,
}

pub struct App {
    config: Config,
    profile: Profile,
    client: ApiClient,
    spawner: TaskSpawner,
    rx: mpsc::UnboundedReceiver<ApiMessage>,
    navigation_rx: broadcast::Receiver<NavigationEvent>,
    /// Fetches spawned but not yet reported back.
    in_flight: usize,
    login_required: bool,
    projects: Option<ListController<ProjectList>>,
    issues: Option<ListController<IssueList>>,
    comments: Option<ListController<CommentList>>,
    overview: Option<std::result::Result<ProjectOverview, ApiError>>,
}

impl App {
    /// Build the application for a profile, restoring its saved session.
    pub fn new(config: Config, profile: Profile) -> Result<Self> {
        let backend = session_backend(config.settings.session_storage, &profile.name)?;
        let session = SessionStore::load(backend);
        let client = ApiClient::new(
            &profile.url,
            config.settings.request_timeout(),
            session,
            NavigationBus::new(),
        )?;
        info!(profile = %profile.name, url = %client.base_url(), "Application initialized");
        Ok(Self::with_client(config, profile, client))
    }

    /// Build the application around an existing client.
    pub fn with_client(config: Config, profile: Profile, client: ApiClient) -> Self {
        let (rx, spawner) = create_task_channel();
        let navigation_rx = client.navigation().subscribe();
        Self {
            config,
            profile,
            client,
            spawner,
            rx,
            navigation_rx,
            in_flight: 0,
            login_required: false,
            projects: None,
            issues: None,
            comments: None,
            overview: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    pub fn projects(&self) -> Option<&ListController<ProjectList>> {
        self.projects.as_ref()
    }

    pub fn issues(&self) -> Option<&ListController<IssueList>> {
        self.issues.as_ref()
    }

    pub fn comments(&self) -> Option<&ListController<CommentList>> {
        self.comments.as_ref()
    }

    pub fn overview(&self) -> Option<&std::result::Result<ProjectOverview, ApiError>> {
        self.overview.as_ref()
    }

    /// True once a redirect to the login screen has been requested.
    pub fn login_required(&mut self) -> bool {
        self.drain_navigation();
        self.login_required
    }

    /// Open the project list.
    pub fn open_projects(&mut self, options: &ListOptions) {
        let mut controller = self.new_controller(ProjectList::new(self.client.clone()));
        if let Some(ticket) = start(&mut controller, options) {
            self.spawner
                .spawn_fetch_projects(controller.source().clone(), ticket);
            self.in_flight += 1;
        }
        self.projects = Some(controller);
    }

    /// Open the issue list, optionally scoped to one project.
    pub fn open_issues(&mut self, project_id: Option<String>, options: &ListOptions) {
        let source = match project_id {
            Some(id) => IssueList::for_project(self.client.clone(), id),
            None => IssueList::new(self.client.clone()),
        };
        let mut controller = self.new_controller(source);
        if let Some(ticket) = start(&mut controller, options) {
            self.spawner
                .spawn_fetch_issues(controller.source().clone(), ticket);
            self.in_flight += 1;
        }
        self.issues = Some(controller);
    }

    /// Open the comment thread of an issue.
    pub fn open_comments(&mut self, issue_id: String, options: &ListOptions) {
        let mut controller = self.new_controller(CommentList::new(self.client.clone(), issue_id));
        if let Some(ticket) = start(&mut controller, options) {
            self.spawner
                .spawn_fetch_comments(controller.source().clone(), ticket);
            self.in_flight += 1;
        }
        self.comments = Some(controller);
    }

    /// Load a project with the first page of its issues.
    pub fn open_project_overview(&mut self, project_id: String) {
        self.overview = None;
        let limit = self.config.settings.page_size;
        self.spawner
            .spawn_fetch_project_overview(&self.client, project_id, limit);
        self.in_flight += 1;
    }

    /// Wait until every spawned fetch has reported back.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.rx.recv().await {
                Some(message) => {
                    self.in_flight -= 1;
                    self.handle_message(message);
                }
                None => break,
            }
        }
        self.drain_navigation();
    }

    /// Route a finished fetch to whoever issued it.
    pub fn handle_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::ProjectsFetched(m) => deliver(&mut self.projects, m.ticket, m.result),
            ApiMessage::IssuesFetched(m) => deliver(&mut self.issues, m.ticket, m.result),
            ApiMessage::CommentsFetched(m) => deliver(&mut self.comments, m.ticket, m.result),
            ApiMessage::ProjectOverviewFetched { project_id, result } => {
                debug!(%project_id, ok = result.is_ok(), "Project overview fetched");
                self.overview = Some(result);
            }
        }
    }

    fn new_controller<S: ListSource>(&self, source: S) -> ListController<S> {
        let settings = &self.config.settings;
        ListController::new(
            source,
            self.client.session().clone(),
            self.client.navigation().clone(),
            settings.page_size,
        )
        .with_debounce(settings.search_debounce())
    }

    fn drain_navigation(&mut self) {
        loop {
            match self.navigation_rx.try_recv() {
                Ok(NavigationEvent::RedirectToLogin) => self.login_required = true,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Navigation events dropped");
                    self.login_required = true;
                }
                Err(_) => break,
            }
        }
    }
}

/// Apply list options to a fresh controller and mount it.
fn start<S: ListSource>(
    controller: &mut ListController<S>,
    options: &ListOptions,
) -> Option<FetchTicket> {
    // Not mounted yet, so these only shape the first query.
    for (field, value) in &options.filters {
        controller.set_filter(field, Some(value.clone()));
    }
    if let Some(search) = &options.search {
        controller.set_search_input(search.clone(), tokio::time::Instant::now());
        controller.submit_search();
    }
    controller.set_page(options.page.max(1));
    controller.mount()
}

fn deliver<S: ListSource>(
    controller: &mut Option<ListController<S>>,
    ticket: FetchTicket,
    result: crate::api::Result<crate::api::PageResult<S::Item>>,
) {
    match controller {
        Some(controller) => {
            controller.complete(ticket, result);
        }
        None => debug!("Dropping page for a list that is no longer open"),
    }
}

fn session_backend(
    storage: SessionStorage,
    profile: &str,
) -> Result<Arc<dyn SessionBackend>> {
    let backend: Arc<dyn SessionBackend> = match storage {
        SessionStorage::Memory => Arc::new(MemoryBackend::default()),
        SessionStorage::File => Arc::new(FileBackend::for_profile(profile)?),
        SessionStorage::Keyring => Arc::new(KeyringBackend::new(profile)),
    };
    Ok(backend)
}
