//! `do_sum` / `do_the_sum`: adds two numbers.
//!
//! Plain `f64` addition; no overflow or precision policy.

use serde_json::{json, Number, Value};

use super::required_number;
use crate::mcp::protocol::{ToolCallResult, ToolDefinition};

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Validated sum arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SumArgs {
    /// First addend.
    pub a: f64,
    /// Second addend.
    pub b: f64,
}

pub(super) fn definition(name: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        title: Some("Add two numbers".to_string()),
        description: Some("Adds a and b and returns the numeric result as text".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "a": { "type": "number" },
                "b": { "type": "number" }
            },
            "required": ["a", "b"]
        }),
        output_schema: Some(json!({
            "type": "object",
            "properties": {
                "result": { "type": "number" }
            },
            "required": ["result"]
        })),
    }
}

/// Validates sum arguments.
///
/// # Errors
///
/// Returns a message if `a` or `b` is missing or not a number.
pub fn parse_args(arguments: &Value) -> Result<SumArgs, String> {
    Ok(SumArgs {
        a: required_number(arguments, "a")?,
        b: required_number(arguments, "b")?,
    })
}

/// Converts a float to JSON, writing integral values without a fraction.
///
/// Non-finite values become `null`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)] // guarded by the integral and range checks
pub fn json_number(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

/// Runs the sum, returning the result as structured content and as text.
#[must_use]
pub fn run(args: &SumArgs) -> ToolCallResult {
    let output = json!({ "result": json_number(args.a + args.b) });
    ToolCallResult::text(output.to_string()).with_structured(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(a: f64, b: f64) -> ToolCallResult {
        run(&SumArgs { a, b })
    }

    #[test]
    fn integers() {
        let result = sum(1.0, 2.0);
        assert_eq!(result.first_text(), Some(r#"{"result":3}"#));
        assert_eq!(result.structured_content, Some(json!({"result": 3})));
    }

    #[test]
    fn negatives_and_zero() {
        assert_eq!(sum(-5.0, 3.0).first_text(), Some(r#"{"result":-2}"#));
        assert_eq!(sum(0.0, 0.0).first_text(), Some(r#"{"result":0}"#));
        assert_eq!(sum(-0.0, -0.0).first_text(), Some(r#"{"result":0}"#));
    }

    #[test]
    fn fractions() {
        let result = sum(0.5, 0.25);
        assert_eq!(result.first_text(), Some(r#"{"result":0.75}"#));
        assert_eq!(
            result.structured_content.unwrap()["result"].as_f64(),
            Some(0.75)
        );
    }

    #[test]
    fn overflow_is_null() {
        assert_eq!(json_number(f64::MAX + f64::MAX), Value::Null);
    }

    #[test]
    fn large_values_keep_float_form() {
        assert_eq!(json_number(1e20), json!(1e20));
    }

    #[test]
    fn parse_requires_both() {
        assert!(parse_args(&json!({"a": 1})).is_err());
        assert!(parse_args(&json!({"a": 1, "b": "2"})).is_err());
        assert_eq!(
            parse_args(&json!({"a": 1, "b": 2.5})),
            Ok(SumArgs { a: 1.0, b: 2.5 })
        );
    }
}
