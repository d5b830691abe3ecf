//! Generic list view controller and its entity bindings.

mod controller;
mod debounce;
mod pagination;
mod sources;

pub use controller::{FetchTicket, ListController, ListState, ListView, DEFAULT_SEARCH_DEBOUNCE};
pub use debounce::Debouncer;
pub use pagination::Pagination;
pub use sources::{CommentList, IssueList, ListSource, ProjectList};
