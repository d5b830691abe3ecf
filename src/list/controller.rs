//! Paginated, searchable, filterable list state machine.
//!
//! The controller never performs I/O itself. Every operation that changes the
//! query returns a [`FetchTicket`]; the owner runs the fetch (inline via
//! [`ListController::load`] or in the background via
//! [`TaskSpawner`](crate::tasks::TaskSpawner)) and hands the outcome back to
//! [`ListController::complete`]. Only the result for the newest ticket is
//! committed.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use super::debounce::Debouncer;
use super::pagination::Pagination;
use super::sources::ListSource;
use crate::api::{ApiError, PageQuery, PageResult, Result};
use crate::events::NavigationBus;
use crate::session::SessionStore;

/// Quiet period before typed search text is committed.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// Data state of a list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    /// No session; nothing is fetched until the user signs in.
    Unauthenticated,
    Loading,
    Loaded { items: Vec<T>, total: u64 },
    Error(String),
}

/// What a view should draw for the current state.
#[derive(Debug, PartialEq)]
pub enum ListView<'a, T> {
    Unauthenticated,
    Loading,
    Error(&'a str),
    /// Nothing exists yet; invite the user to create something.
    Empty,
    /// Search or filters exclude everything; invite clearing them.
    NoMatches,
    Items { items: &'a [T], total: u64 },
}

/// Identifies one issued fetch.
///
/// Carries the generation it was issued under and the query it must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: PageQuery,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }
}

pub struct ListController<S: ListSource> {
    source: Arc<S>,
    session: SessionStore,
    navigation: NavigationBus,
    query: PageQuery,
    search_input: String,
    debouncer: Debouncer<String>,
    generation: u64,
    state: ListState<S::Item>,
}

impl<S: ListSource> ListController<S> {
    pub fn new(
        source: S,
        session: SessionStore,
        navigation: NavigationBus,
        page_size: u64,
    ) -> Self {
        Self {
            source: Arc::new(source),
            session,
            navigation,
            query: PageQuery::new(page_size),
            search_input: String::new(),
            debouncer: Debouncer::new(DEFAULT_SEARCH_DEBOUNCE),
            generation: 0,
            state: ListState::Unauthenticated,
        }
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debouncer = Debouncer::new(delay);
        self
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn state(&self) -> &ListState<S::Item> {
        &self.state
    }

    /// The committed query the next fetch will use.
    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    /// Raw search text as typed, possibly not yet committed.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// When staged search text will be committed, if any is pending.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Pagination derived from the last loaded total.
    pub fn pagination(&self) -> Pagination {
        let total = match &self.state {
            ListState::Loaded { total, .. } => *total,
            _ => 0,
        };
        Pagination::new(self.query.offset(), self.query.limit(), total)
    }

    pub fn view(&self) -> ListView<'_, S::Item> {
        match &self.state {
            ListState::Unauthenticated => ListView::Unauthenticated,
            ListState::Loading => ListView::Loading,
            ListState::Error(message) => ListView::Error(message.as_str()),
            ListState::Loaded { items, .. } if items.is_empty() => {
                if self.query.is_narrowed() {
                    ListView::NoMatches
                } else {
                    ListView::Empty
                }
            }
            ListState::Loaded { items, total } => ListView::Items {
                items,
                total: *total,
            },
        }
    }

    /// Start the list. Without a session this requests the login screen.
    pub fn mount(&mut self) -> Option<FetchTicket> {
        if !self.session.is_authenticated() {
            info!("List mounted without a session, redirecting to login");
            self.state = ListState::Unauthenticated;
            self.navigation.redirect_to_login();
            return None;
        }
        Some(self.issue())
    }

    /// Re-run the current query.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.mount()
    }

    /// Record a keystroke's worth of search text. Nothing is fetched until
    /// [`tick`](Self::tick) observes the quiet period has passed.
    pub fn set_search_input(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.search_input.clone_from(&text);
        self.debouncer.schedule(text, now);
    }

    /// Commit staged search text whose quiet period has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<FetchTicket> {
        let search = self.debouncer.poll(now)?;
        self.commit_search(search)
    }

    /// Commit staged search text immediately.
    pub fn submit_search(&mut self) -> Option<FetchTicket> {
        let search = self
            .debouncer
            .flush()
            .unwrap_or_else(|| self.search_input.clone());
        self.commit_search(search)
    }

    /// Set or clear one filter. Any change returns to the first page.
    pub fn set_filter(&mut self, field: &str, value: Option<String>) -> Option<FetchTicket> {
        let mut next = self.query.clone();
        next.set_filter(field, value);
        if next.filters() == self.query.filters() {
            return None;
        }
        next.set_offset(0);
        self.query = next;
        self.fetch_if_mounted()
    }

    /// Drop the search term and every filter.
    pub fn clear_narrowing(&mut self) -> Option<FetchTicket> {
        self.debouncer.cancel();
        self.search_input.clear();
        if !self.query.is_narrowed() {
            return None;
        }
        self.query.clear_narrowing();
        self.query.set_offset(0);
        self.fetch_if_mounted()
    }

    pub fn next_page(&mut self) -> Option<FetchTicket> {
        let offset = self.pagination().next_offset()?;
        self.query.set_offset(offset);
        self.fetch_if_mounted()
    }

    pub fn prev_page(&mut self) -> Option<FetchTicket> {
        let offset = self.pagination().previous_offset()?;
        self.query.set_offset(offset);
        self.fetch_if_mounted()
    }

    /// Jump to a 1-based page number.
    pub fn set_page(&mut self, page: u64) -> Option<FetchTicket> {
        let offset = page.saturating_sub(1).saturating_mul(self.query.limit());
        if offset == self.query.offset() {
            return None;
        }
        self.query.set_offset(offset);
        self.fetch_if_mounted()
    }

    /// Apply a fetch outcome.
    ///
    /// Returns `false` when the ticket is stale and the result was dropped.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<PageResult<S::Item>>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale list response"
            );
            return false;
        }

        self.state = match result {
            Ok(page) => {
                debug!(items = page.items.len(), total = page.total, "List loaded");
                ListState::Loaded {
                    items: page.items,
                    total: page.total,
                }
            }
            Err(ApiError::Unauthorized) => ListState::Unauthenticated,
            Err(e) => ListState::Error(e.to_string()),
        };
        true
    }

    /// Run a ticket's fetch inline and apply the result.
    pub async fn load(&mut self, ticket: FetchTicket) -> bool {
        let result = self.source.fetch(ticket.query()).await;
        self.complete(ticket, result)
    }

    fn commit_search(&mut self, search: String) -> Option<FetchTicket> {
        let mut next = self.query.clone();
        next.set_search(search);
        if next.search() == self.query.search() {
            return None;
        }
        next.set_offset(0);
        self.query = next;
        self.fetch_if_mounted()
    }

    /// Query changes made before mount, or while signed out, are kept but
    /// do not fetch.
    fn fetch_if_mounted(&mut self) -> Option<FetchTicket> {
        match self.state {
            ListState::Unauthenticated => None,
            _ => Some(self.issue()),
        }
    }

    fn issue(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = ListState::Loading;
        FetchTicket {
            generation: self.generation,
            query: self.query.clone(),
        }
    }
}
