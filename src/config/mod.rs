//! Configuration file loading and parsing.
//!
//! This module handles loading the configuration file from disk and parsing
//! it into validated, type-safe structures, then layering the environment
//! on top.
//!
//! # Configuration File Locations
//!
//! The configuration file is searched in the following order:
//!
//! 1. Path given as the `CONFIG_FILE` CLI argument
//! 2. Default location:
//!    - **Linux/macOS:** `~/.basics-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.basics-mcp\config.json`
//!
//! A missing file at the default location is not an error; built-in
//! defaults are used instead.
//!
//! # Environment
//!
//! - `GOOGLE_CALENDAR_ID` overrides `calendar.calendar_id`
//! - `GOOGLE_API_KEY` or `GOOGLE_ACCESS_TOKEN` supplies the calendar credential

mod settings;

pub use settings::{CalendarConfig, Config, LoggingConfig, ToolsConfig};

use std::path::{Path, PathBuf};

use crate::calendar::Credential;
use crate::error::ConfigError;

/// Environment variable overriding the calendar ID.
pub const CALENDAR_ID_ENV: &str = "GOOGLE_CALENDAR_ID";

/// Environment variable holding a Google API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Environment variable holding an OAuth access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_ACCESS_TOKEN";

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.basics-mcp/`
/// - **Windows:** `%USERPROFILE%\.basics-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".basics-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// If `path` is `None`, uses the platform-specific default location, falling
/// back to [`Config::default`] when no file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - Required fields are missing or invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                tracing::debug!("No configuration file found, using defaults");
                return Ok(Config::default());
            }
        },
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.clone(),
        source: e,
    })?;

    // Validate the configuration
    config.validate()?;

    Ok(config)
}

/// Applies environment overrides to a loaded configuration.
///
/// `lookup` is `std::env::var(..).ok()` in production.
///
/// # Errors
///
/// Returns an error if the overridden configuration no longer validates.
pub fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(calendar_id) = non_empty(lookup(CALENDAR_ID_ENV)) {
        config.calendar.calendar_id = calendar_id;
    }
    config.validate()
}

/// Reads the calendar credential. An API key wins over an access token.
#[must_use]
pub fn credential_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<Credential> {
    non_empty(lookup(API_KEY_ENV))
        .map(Credential::ApiKey)
        .or_else(|| non_empty(lookup(ACCESS_TOKEN_ENV)).map(Credential::AccessToken))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
