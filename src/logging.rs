//! Logging configuration using the tracing ecosystem.
//!
//! Logs go to a daily-rotated file rather than the terminal so command output
//! stays clean. Each profile writes its own file, so traffic against a local
//! server and a shared one never interleaves. Token values are never recorded.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::config::Config;

/// Filter used when neither `RUST_LOG` nor the config sets one.
const DEFAULT_LOG_FILTER: &str = "trackmybugs=info,warn";

const LOG_FILE_STEM: &str = "trackmybugs";

/// What the subscriber should record and where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Directives from the `log_filter` setting.
    pub filter: Option<String>,
    /// Active profile; selects the log file.
    pub profile: Option<String>,
}

impl LogOptions {
    pub fn from_config(config: &Config, profile: &str) -> Self {
        Self {
            filter: config.settings.log_filter.clone(),
            profile: Some(profile.to_string()),
        }
    }

    /// Filter directives in effect: `RUST_LOG`, then the configured filter,
    /// then the built-in default.
    fn directives(&self, env: Option<String>) -> String {
        env.filter(|v| !v.trim().is_empty())
            .or_else(|| self.filter.clone())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }

    /// File prefix for the rolling appender, e.g. `trackmybugs-work.log`.
    fn file_prefix(&self) -> String {
        match &self.profile {
            Some(profile) => format!("{}-{}.log", LOG_FILE_STEM, profile),
            None => format!("{}.log", LOG_FILE_STEM),
        }
    }
}

/// Initialize the logging system.
///
/// Installs a subscriber writing to a daily rotating file in the user's local
/// data directory. `RUST_LOG` wins over the configured filter, e.g.
/// `RUST_LOG=trackmybugs=debug`. Unparseable directives fall back to the
/// default filter.
///
/// Log files live in:
/// - Linux: `~/.local/share/trackmybugs/logs/`
/// - macOS: `~/Library/Application Support/trackmybugs/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\trackmybugs\logs\`
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created, or
/// if a global subscriber is already set.
pub fn init(options: &LogOptions) -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, &log_dir, options.file_prefix());

    let directives = options.directives(std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let (filter, rejected) = match EnvFilter::try_new(&directives) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e)),
    };

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        profile = options.profile.as_deref().unwrap_or("-"),
        "TrackMyBugs starting up"
    );
    if let Some(e) = rejected {
        tracing::warn!(%directives, error = %e, "Invalid log filter, using default");
    }
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("trackmybugs").join("logs"))
}

/// Where log files are written, for showing to users.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}

pub fn shutdown() {
    tracing::info!("TrackMyBugs shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;

    #[test]
    fn test_log_directory_has_expected_structure() {
        let dir = log_directory().unwrap();
        assert!(dir.ends_with("trackmybugs/logs"));
    }

    #[test]
    fn test_directive_precedence() {
        let options = LogOptions {
            filter: Some("trackmybugs=debug".to_string()),
            profile: None,
        };
        assert_eq!(
            options.directives(Some("trackmybugs=trace".to_string())),
            "trackmybugs=trace"
        );
        assert_eq!(options.directives(Some("  ".to_string())), "trackmybugs=debug");
        assert_eq!(options.directives(None), "trackmybugs=debug");
        assert_eq!(LogOptions::default().directives(None), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_file_prefix_per_profile() {
        let mut config = Config::default();
        config.settings.log_filter = Some("warn".to_string());
        config.profiles.push(Profile::new("work", "https://bugs.example.com"));

        let options = LogOptions::from_config(&config, "work");

        assert_eq!(options.file_prefix(), "trackmybugs-work.log");
        assert_eq!(options.filter.as_deref(), Some("warn"));
        assert_eq!(LogOptions::default().file_prefix(), "trackmybugs.log");
    }
}
