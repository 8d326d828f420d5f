//! Calendar day lookup: lists the meetings on one UTC calendar day.

use serde_json::{json, Value};

use super::optional_string;
use crate::calendar::{resolve_day_window, CalendarProvider, Clock, EventQuery};
use crate::mcp::protocol::{ToolCallResult, ToolDefinition};

/// Validated calendar lookup arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarArgs {
    /// Day to look up; absent means today (UTC).
    pub date: Option<String>,
}

/// Outcome of a lookup. Exactly one of the two shapes is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayLookup {
    /// `"<title> at <start>"` for each event, in start order.
    Meetings(Vec<String>),
    /// Why the lookup failed.
    Error(String),
}

impl DayLookup {
    /// The JSON shape returned to the client.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Meetings(meetings) => json!({ "meetings": meetings }),
            Self::Error(message) => json!({ "error": message }),
        }
    }
}

pub(super) fn definition(name: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        title: Some("Get my calendar data by date".to_string()),
        description: Some(
            "Lists the meetings on the given UTC calendar day, ordered by start time \
             (at most 10). Omit date to use today."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "date": {
                    "type": "string",
                    "description": "Day to look up, e.g. 2024-05-01 or 2024-05-01T09:00:00+02:00. \
                                    Date-times are converted to UTC before the day is taken."
                }
            }
        }),
        output_schema: None,
    }
}

/// Validates calendar lookup arguments.
///
/// Only the shape is checked here; whether `date` is a real date is decided
/// by the day window resolver.
///
/// # Errors
///
/// Returns a message if `date` is present but not a string.
pub fn parse_args(arguments: &Value) -> Result<CalendarArgs, String> {
    Ok(CalendarArgs {
        date: optional_string(arguments, "date")?.map(str::to_string),
    })
}

/// Resolves the day and queries the provider once.
///
/// A date that does not parse is rejected before any query is made.
pub async fn lookup(
    date: Option<&str>,
    provider: &dyn CalendarProvider,
    clock: &dyn Clock,
) -> DayLookup {
    let window = match resolve_day_window(date, clock) {
        Ok(window) => window,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected calendar date");
            return DayLookup::Error(e.to_string());
        }
    };

    match provider.list_events(&EventQuery::for_day(window)).await {
        Ok(events) => DayLookup::Meetings(events.iter().map(|e| e.meeting_summary()).collect()),
        Err(e) => {
            tracing::warn!(error = %e, "Calendar query failed");
            DayLookup::Error(e.to_string())
        }
    }
}

/// Runs the lookup and renders it as a text tool result.
pub async fn run(
    args: &CalendarArgs,
    provider: &dyn CalendarProvider,
    clock: &dyn Clock,
) -> ToolCallResult {
    let outcome = lookup(args.date.as_deref(), provider, clock).await;
    let text = outcome.to_json().to_string();

    match outcome {
        DayLookup::Meetings(_) => ToolCallResult::text(text),
        DayLookup::Error(_) => ToolCallResult::error(text),
    }
}
