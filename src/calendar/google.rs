//! Google Calendar v3 events client.

use std::fmt;

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Deserialize;
use url::Url;

use super::error::{CalendarError, CalendarResult};
use super::{CalendarEvent, CalendarProvider, EventQuery};

/// Default Google Calendar API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Static credential passed through to the API.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// API key, sent as the `key` query parameter.
    ApiKey(String),
    /// OAuth access token, sent as a bearer token.
    AccessToken(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Queries one calendar's events through the Google Calendar REST API.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: Url,
    calendar_id: String,
    credential: Option<Credential>,
}

impl GoogleCalendarClient {
    /// Creates a client for `calendar_id`.
    ///
    /// A missing credential is not an error here; queries will fail with
    /// [`CalendarError::MissingCredential`] instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: Url,
        calendar_id: impl Into<String>,
        credential: Option<Credential>,
    ) -> CalendarResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CalendarError::request)?;

        Ok(Self {
            http,
            base_url,
            calendar_id: calendar_id.into(),
            credential,
        })
    }

    /// Returns the calendar this client queries.
    #[must_use]
    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Builds the events URL for a query, without the credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot take path segments.
    pub fn events_url(&self, query: &EventQuery) -> CalendarResult<Url> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| CalendarError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);

        url.query_pairs_mut()
            .append_pair(
                "timeMin",
                &query
                    .window
                    .start()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .append_pair(
                "timeMax",
                &query.window.end().to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .append_pair("maxResults", &query.max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        Ok(url)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn list_events(&self, query: &EventQuery) -> CalendarResult<Vec<CalendarEvent>> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(CalendarError::MissingCredential)?;

        let mut url = self.events_url(query)?;
        let request = match credential {
            Credential::ApiKey(key) => {
                url.query_pairs_mut().append_pair("key", key);
                self.http.get(url)
            }
            Credential::AccessToken(token) => self.http.get(url).bearer_auth(token),
        };

        tracing::debug!(
            calendar_id = %self.calendar_id,
            time_min = %query.window.start(),
            time_max = %query.window.end(),
            "Querying calendar events"
        );

        let response = request.send().await.map_err(CalendarError::request)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let events: EventsResponse = response.json().await.map_err(CalendarError::decode)?;
        tracing::debug!(count = events.items.len(), "Calendar events received");

        Ok(events.items)
    }
}
