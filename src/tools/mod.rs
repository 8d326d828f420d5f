//! Tool registry and dispatch.
//!
//! The registry is built once at startup from configuration and owns
//! everything the tools need (calendar provider, clock). Each tool module
//! provides:
//!
//! - `definition(..)` — the descriptor advertised by `tools/list`
//! - `parse_args(..)` — explicit argument validation, run before the handler
//! - `run(..)` — the handler itself
//!
//! Argument validation failures are protocol errors ([`ToolError`]); failures
//! inside a handler are reported in the tool result.

pub mod calendar;
pub mod ping;
pub mod sum;

use std::sync::Arc;

use serde_json::Value;

use crate::calendar::{CalendarProvider, Clock};
use crate::config::ToolsConfig;
use crate::error::ToolError;
use crate::mcp::protocol::{ToolCallResult, ToolDefinition};

/// Name of the echo tool.
pub const PING_TOOL_NAME: &str = "ping";

/// Names the arithmetic tool is registered under.
pub const SUM_TOOL_NAMES: &[&str] = &["do_sum", "do_the_sum"];

enum Handler {
    Ping,
    Sum,
    Calendar(Arc<dyn CalendarProvider>),
}

struct RegisteredTool {
    definition: ToolDefinition,
    handler: Handler,
}

/// The set of tools exposed by the server.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    clock: Arc<dyn Clock>,
}

impl ToolRegistry {
    /// Builds the registry.
    ///
    /// The calendar tool is registered only when enabled in `config` and a
    /// provider is supplied.
    #[must_use]
    pub fn new(
        config: &ToolsConfig,
        calendar: Option<Arc<dyn CalendarProvider>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut tools = vec![RegisteredTool {
            definition: ping::definition(),
            handler: Handler::Ping,
        }];

        tools.extend(SUM_TOOL_NAMES.iter().map(|name| RegisteredTool {
            definition: sum::definition(name),
            handler: Handler::Sum,
        }));

        if let Some(provider) = calendar.filter(|_| config.calendar_enabled) {
            tools.push(RegisteredTool {
                definition: calendar::definition(&config.calendar_tool_name),
                handler: Handler::Calendar(provider),
            });
        }

        Self { tools, clock }
    }

    /// Returns the tool descriptors in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter().map(|t| &t.definition)
    }

    /// Returns `true` if a tool is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.definition.name == name)
    }

    /// Validates `arguments` for the named tool and runs it.
    ///
    /// `null` arguments are treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] if no tool has that name, or
    /// [`ToolError::InvalidArguments`] if validation fails.
    pub async fn call(&self, name: &str, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        let tool = self.find(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;

        let invalid = |message: String| ToolError::InvalidArguments {
            tool: name.to_string(),
            message,
        };

        if !(arguments.is_object() || arguments.is_null()) {
            return Err(invalid("arguments must be an object".to_string()));
        }

        match &tool.handler {
            Handler::Ping => ping::parse_args(arguments)
                .map(|args| ping::run(&args))
                .map_err(invalid),
            Handler::Sum => sum::parse_args(arguments)
                .map(|args| sum::run(&args))
                .map_err(invalid),
            Handler::Calendar(provider) => {
                let args = calendar::parse_args(arguments).map_err(invalid)?;
                Ok(calendar::run(&args, provider.as_ref(), self.clock.as_ref()).await)
            }
        }
    }
}

/// Reads an optional string field. `null` counts as absent.
fn optional_string<'a>(arguments: &'a Value, field: &str) -> Result<Option<&'a str>, String> {
    match arguments.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(format!("{field}: expected a string, got {}", kind(other))),
    }
}

/// Reads a required numeric field.
fn required_number(arguments: &Value, field: &str) -> Result<f64, String> {
    match arguments.get(field) {
        None | Some(Value::Null) => Err(format!("{field}: required")),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| format!("{field}: expected a number, got {}", kind(value))),
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
