//! TrackMyBugs API client and types.
//!
//! This module provides the interface for communicating with the TrackMyBugs
//! REST API: the request executor, typed per-entity operations and the
//! pagination query model.

mod auth;
mod client;
mod comments;
mod error;
mod issues;
mod projects;
mod query;
mod transport;
pub mod types;
mod users;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use comments::COMMENT_FILTER_FIELDS;
pub use error::{ApiError, ErrorKind, Result, GENERIC_FAILURE_MESSAGE};
pub use issues::ISSUE_FILTER_FIELDS;
pub use projects::PROJECT_FILTER_FIELDS;
pub use query::{PageQuery, PageResult, DEFAULT_PAGE_SIZE};
pub use transport::{
    HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, DEFAULT_TIMEOUT_SECS,
};
