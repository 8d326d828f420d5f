//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Credentials are read from the environment only (see [`super::credential_from_env`]).

use serde::Deserialize;
use url::Url;

use crate::calendar::google::DEFAULT_API_BASE_URL;
use crate::error::ConfigError;
use crate::tools::{PING_TOOL_NAME, SUM_TOOL_NAMES};

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Calendar provider settings.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Tool registration settings.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calendar.calendar_id.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "calendar.calendar_id cannot be empty".to_string(),
            });
        }

        self.calendar.api_base_url()?;

        let name = &self.tools.calendar_tool_name;
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid calendar tool name '{name}'. Tool names must be non-empty and contain no whitespace"
                ),
            });
        }
        if name == PING_TOOL_NAME || SUM_TOOL_NAMES.contains(&name.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!("Calendar tool name '{name}' collides with a built-in tool"),
            });
        }

        Ok(())
    }
}

/// Calendar provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// Calendar to query. Overridden by `GOOGLE_CALENDAR_ID`.
    /// Default: "primary"
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// Base URL of the Google Calendar v3 API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl CalendarConfig {
    /// Parses and checks the API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error unless the URL is an absolute `http` or `https` URL.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_base_url).map_err(|e| ConfigError::ValidationError {
            message: format!("Invalid calendar.api_base_url '{}': {e}", self.api_base_url),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid calendar.api_base_url '{}'. Must use http or https",
                    self.api_base_url
                ),
            });
        }

        Ok(url)
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

/// Tool registration configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Register the calendar lookup tool.
    #[serde(default = "default_true")]
    pub calendar_enabled: bool,

    /// Name the calendar lookup tool is registered under.
    #[serde(default = "default_calendar_tool_name")]
    pub calendar_tool_name: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            calendar_enabled: default_true(),
            calendar_tool_name: default_calendar_tool_name(),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_calendar_tool_name() -> String {
    "getMyCalendarDataByDate".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
