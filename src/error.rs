//! Centralized error types for TrackMyBugs.
//!
//! This module provides a unified error hierarchy for the application with
//! user-friendly error messages. All error types use `thiserror` for
//! ergonomic error handling.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// The main application error type.
///
/// Aggregates the per-layer errors, providing user-friendly messages while
/// preserving the underlying error for logging.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Api(#[from] ApiError),

    /// Session persistence errors.
    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display.
    ///
    /// Server rejections are shown verbatim; everything else is translated
    /// into plain language.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::CreateDirError(_) => {
                    "Could not create configuration directory. Check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check the file is readable."
                        .to_string()
                }
                ConfigError::WriteError(_) | ConfigError::SerializeError(_) => {
                    "Could not save configuration. Please check file permissions.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::ProfileNotFound(name) => format!("Profile '{}' not found.", name),
            },
            AppError::Api(e) => match e {
                ApiError::Unauthorized => "Your session has ended. Please log in.".to_string(),
                ApiError::Rejected { message, .. } => message.clone(),
                ApiError::Network(_) => {
                    "Could not reach the server. Please check your connection.".to_string()
                }
                ApiError::InvalidResponse(_) => {
                    "Unexpected response from the server. Please try again.".to_string()
                }
                ApiError::InvalidUrl(_) => "Invalid server URL in configuration.".to_string(),
                ApiError::InvalidRequest(_) => "Could not encode the request.".to_string(),
            },
            AppError::Session(_) => {
                "Could not access the saved session. You may need to log in again.".to_string()
            }
            AppError::Io(_) => "A file operation failed. Please check file permissions.".to_string(),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Check if this error is critical and stops the current command.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Api(ApiError::Unauthorized)
                | AppError::Api(ApiError::InvalidUrl(_))
        )
    }

    /// Check if simply trying again may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Api(e) => e.is_retryable(),
            AppError::Session(_) => true,
            _ => false,
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::ParseError(_))
            | AppError::Config(ConfigError::ValidationError(_)) => {
                Some("Fix the configuration file or remove it to restore defaults.")
            }
            AppError::Config(ConfigError::ProfileNotFound(_)) => {
                Some("Add the profile to the configuration file or pick another with --profile.")
            }
            AppError::Api(ApiError::Unauthorized) => Some("Run 'trackmybugs login' to sign in."),
            AppError::Api(ApiError::Network(_)) | AppError::Api(ApiError::InvalidResponse(_)) => {
                Some("Check that the server is running and the profile URL is correct.")
            }
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
