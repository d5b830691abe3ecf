//! TrackMyBugs client library.
//!
//! A client-side data access layer for the TrackMyBugs issue tracker API:
//! session handling, a single authenticated request executor, typed resource
//! operations, and a generic paginated list controller.

pub mod api;
pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod list;
pub mod logging;
pub mod session;
pub mod tasks;

#[cfg(test)]
mod test_support;
