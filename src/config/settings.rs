//! Application settings configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// Largest page size the client will request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Longest accepted search debounce in milliseconds.
pub const MAX_SEARCH_DEBOUNCE_MS: u64 = 5000;

/// Where the signed-in session is kept between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStorage {
    /// Nothing persists; every run starts signed out.
    Memory,
    #[default]
    File,
    /// OS keychain.
    Keyring,
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The name of the default profile to use.
    pub default_profile: Option<String>,
    /// Items per list page.
    pub page_size: u64,
    /// Quiet period before typed search text is sent.
    pub search_debounce_ms: u64,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    pub session_storage: SessionStorage,
    /// Tracing filter used when `RUST_LOG` is unset, e.g. `trackmybugs=debug`.
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: Some("local".to_string()),
            page_size: crate::api::DEFAULT_PAGE_SIZE,
            search_debounce_ms: 400,
            request_timeout_secs: crate::api::DEFAULT_TIMEOUT_SECS,
            session_storage: SessionStorage::default(),
            log_filter: None,
        }
    }
}

impl Settings {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::ValidationError(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }

        if self.search_debounce_ms > MAX_SEARCH_DEBOUNCE_MS {
            return Err(ConfigError::ValidationError(format!(
                "search_debounce_ms must be at most {}, got {}",
                MAX_SEARCH_DEBOUNCE_MS, self.search_debounce_ms
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(filter) = &self.log_filter {
            if filter.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "log_filter must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
