//! `ping`: echoes text back so the host can verify the server is reachable.

use serde_json::{json, Value};

use super::{optional_string, PING_TOOL_NAME};
use crate::mcp::protocol::{ToolCallResult, ToolDefinition};

/// Validated `ping` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PingArgs {
    /// Text to echo back.
    pub text: Option<String>,
}

pub(super) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: PING_TOOL_NAME.to_string(),
        title: Some("Ping Tool".to_string()),
        description: Some(
            "Echoes the text back so the host can verify the tool is reachable.".to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Optional text to echo back"
                }
            }
        }),
        output_schema: None,
    }
}

/// Validates `ping` arguments.
///
/// # Errors
///
/// Returns a message if `text` is present but not a string.
pub fn parse_args(arguments: &Value) -> Result<PingArgs, String> {
    Ok(PingArgs {
        text: optional_string(arguments, "text")?.map(str::to_string),
    })
}

/// Builds the acknowledgement message.
#[must_use]
pub fn message(text: Option<&str>) -> String {
    match text.filter(|t| !t.is_empty()) {
        Some(text) => format!("Pong - you said: {text}"),
        None => "Pong - No text provided".to_string(),
    }
}

/// Runs `ping`.
#[must_use]
pub fn run(args: &PingArgs) -> ToolCallResult {
    ToolCallResult::text(message(args.text.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_text() {
        assert_eq!(message(None), "Pong - No text provided");
        assert_eq!(message(Some("")), "Pong - No text provided");
    }

    #[test]
    fn with_text() {
        assert_eq!(message(Some("hi")), "Pong - you said: hi");
    }

    #[test]
    fn rejects_non_string_text() {
        assert!(parse_args(&json!({"text": 42})).is_err());
    }

    #[test]
    fn run_returns_single_text_item() {
        let result = run(&parse_args(&json!({"text": "hello"})).unwrap());
        assert!(!result.is_error);
        assert_eq!(result.first_text(), Some("Pong - you said: hello"));
        assert!(result.structured_content.is_none());
    }
}
