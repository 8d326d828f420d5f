//! Error types for calendar operations.

use thiserror::Error;

/// Result type for calendar provider operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Errors produced while resolving the day window for a date input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateWindowError {
    /// The input could not be parsed as a date or date-time.
    #[error("Invalid date '{input}': expected an ISO-8601 date such as 2024-05-01 or 2024-05-01T09:30:00Z")]
    InvalidDate {
        /// The offending input, verbatim.
        input: String,
    },

    /// The input parsed, but the following day is not representable.
    #[error("Date '{input}' is out of the supported range")]
    OutOfRange {
        /// The offending input, verbatim.
        input: String,
    },
}

/// Errors that can occur while querying a calendar provider.
///
/// Messages never contain the API key or access token.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// Neither `GOOGLE_API_KEY` nor `GOOGLE_ACCESS_TOKEN` is set.
    #[error("Calendar credential is not configured (set GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN)")]
    MissingCredential,

    /// The events endpoint URL could not be built.
    #[error("Invalid calendar API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP request failed before a response arrived.
    #[error("Calendar request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Calendar API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the API error body, or the status reason.
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("Failed to decode calendar response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl CalendarError {
    /// Wraps a transport error with its URL removed.
    ///
    /// The request URL carries the API key as a query parameter.
    #[must_use]
    pub fn request(error: reqwest::Error) -> Self {
        Self::Request(error.without_url())
    }

    /// Wraps a body decoding error with its URL removed.
    #[must_use]
    pub fn decode(error: reqwest::Error) -> Self {
        Self::Decode(error.without_url())
    }
}
