//! Calendar access for the day lookup tool.
//!
//! - [`window`] resolves an optional date input into a UTC day window
//! - [`CalendarProvider`] is the seam for "list events in a window"
//! - [`google`] implements the provider against the Google Calendar v3 API

pub mod error;
pub mod google;
pub mod window;

pub use error::{CalendarError, CalendarResult, DateWindowError};
pub use google::{Credential, GoogleCalendarClient};
pub use window::{resolve_day_window, Clock, DayWindow, FixedClock, SystemClock};

use async_trait::async_trait;
use serde::Deserialize;

/// Maximum number of events requested for one day.
pub const MAX_RESULTS: u32 = 10;

/// Start of an event: a timed instant or an all-day date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    /// RFC 3339 start time for timed events.
    #[serde(default)]
    pub date_time: Option<String>,
    /// `YYYY-MM-DD` for all-day events.
    #[serde(default)]
    pub date: Option<String>,
}

/// A calendar event, reduced to the fields the tool reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CalendarEvent {
    /// Event title.
    #[serde(default)]
    pub summary: Option<String>,
    /// Event start.
    #[serde(default)]
    pub start: EventStart,
}

impl CalendarEvent {
    /// Creates a timed event.
    #[must_use]
    pub fn timed(summary: impl Into<String>, date_time: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            start: EventStart {
                date_time: Some(date_time.into()),
                date: None,
            },
        }
    }

    /// Creates an all-day event.
    #[must_use]
    pub fn all_day(summary: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            start: EventStart {
                date_time: None,
                date: Some(date.into()),
            },
        }
    }

    /// Renders the event as `"<title> at <start>"`.
    ///
    /// The start is the event's date-time when present, else its all-day date.
    #[must_use]
    pub fn meeting_summary(&self) -> String {
        let title = self
            .summary
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("(untitled)");
        let start = self
            .start
            .date_time
            .as_deref()
            .or(self.start.date.as_deref())
            .unwrap_or("unknown time");
        format!("{title} at {start}")
    }
}

/// Parameters of a single events query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
    /// Events must start inside this window.
    pub window: DayWindow,
    /// Upper bound on the number of events returned.
    pub max_results: u32,
}

impl EventQuery {
    /// Creates a query for one day, capped at [`MAX_RESULTS`].
    #[must_use]
    pub const fn for_day(window: DayWindow) -> Self {
        Self {
            window,
            max_results: MAX_RESULTS,
        }
    }
}

/// A source of calendar events.
///
/// Implementations make a single attempt per call; there is no retry.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Lists events starting within the query window, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or rejects the query.
    async fn list_events(&self, query: &EventQuery) -> CalendarResult<Vec<CalendarEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prefers_date_time() {
        let event = CalendarEvent {
            summary: Some("Standup".to_string()),
            start: EventStart {
                date_time: Some("2024-05-01T09:00:00Z".to_string()),
                date: Some("2024-05-01".to_string()),
            },
        };
        assert_eq!(event.meeting_summary(), "Standup at 2024-05-01T09:00:00Z");
    }

    #[test]
    fn summary_falls_back_to_date() {
        let event = CalendarEvent::all_day("Offsite", "2024-05-01");
        assert_eq!(event.meeting_summary(), "Offsite at 2024-05-01");
    }

    #[test]
    fn summary_without_title_or_start() {
        assert_eq!(
            CalendarEvent::default().meeting_summary(),
            "(untitled) at unknown time"
        );
    }

    #[test]
    fn decode_google_item() {
        let json = r#"{
            "id": "abc",
            "summary": "Review",
            "start": {"dateTime": "2024-05-01T14:00:00+02:00", "timeZone": "Europe/Berlin"},
            "end": {"dateTime": "2024-05-01T15:00:00+02:00"}
        }"#;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            CalendarEvent::timed("Review", "2024-05-01T14:00:00+02:00")
        );
    }
}
