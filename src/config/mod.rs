//! Configuration management for TrackMyBugs.
//!
//! This module handles loading, saving, and managing user configuration
//! including server profiles and application settings. The file lives at
//! `<config dir>/trackmybugs/config.toml`.

mod profile;
mod settings;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use profile::Profile;
pub use settings::{SessionStorage, Settings, MAX_PAGE_SIZE, MAX_SEARCH_DEBOUNCE_MS};

/// Overrides the active profile's API URL.
pub const API_URL_ENV: &str = "TRACKMYBUGS_API_URL";

/// Selects the active profile by name.
pub const PROFILE_ENV: &str = "TRACKMYBUGS_PROFILE";

const APP_DIR: &str = "trackmybugs";
const CONFIG_FILE: &str = "config.toml";

/// Errors raised while loading, saving, or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    #[error("Failed to create configuration directory: {0}")]
    CreateDirError(std::io::Error),

    #[error("Failed to read configuration file: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to write configuration file: {0}")]
    WriteError(std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// The complete configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    pub profiles: Vec<Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            profiles: vec![Profile::local()],
        }
    }
}

impl Config {
    /// Path of the configuration file.
    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let mut config: Config = toml::from_str(&content)?;
        if config.profiles.is_empty() {
            config.profiles.push(Profile::local());
        }
        config.validate()?;

        info!(
            path = %path.display(),
            profiles = config.profiles.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::WriteError)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !seen.insert(profile.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if let Some(default) = &self.settings.default_profile {
            if !seen.contains(default.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "default profile '{}' does not exist",
                    default
                )));
            }
        }

        Ok(())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// Pick the profile to use and apply environment overrides.
    ///
    /// Selection order: `requested`, then `TRACKMYBUGS_PROFILE`, then the
    /// configured default, then the first profile. `TRACKMYBUGS_API_URL`
    /// replaces the chosen profile's URL.
    pub fn resolve_profile(&self, requested: Option<&str>) -> Result<Profile> {
        let from_env = non_empty_env(PROFILE_ENV);
        let name = requested
            .map(str::to_string)
            .or(from_env)
            .or_else(|| self.settings.default_profile.clone());

        let mut profile = match name {
            Some(name) => self.profile(&name)?.clone(),
            None => self
                .profiles
                .first()
                .cloned()
                .unwrap_or_else(Profile::local),
        };

        if let Some(url) = non_empty_env(API_URL_ENV) {
            debug!(profile = %profile.name, "API URL overridden from environment");
            profile.url = url;
            profile.validate()?;
        }

        Ok(profile)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
