//! Client for the Google-Calendar-shaped REST endpoints: the user's
//! calendar list and per-calendar events.

use crate::error::{AppError, AppResult};
use crate::http_config::HttpConfig;
use crate::utils::retry::{retry_with_exponential_backoff, RetryConfig};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::CalendarApi;

/// Upper bound on events returned per calendar per cycle.
const MAX_RESULTS: u32 = 500;

/// One entry of the calendarList response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarListEntry {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub access_role: String,
    pub foreground_color: Option<String>,
    pub background_color: Option<String>,
    pub selected: bool,
    pub hidden: bool,
}

impl CalendarListEntry {
    pub fn is_editable(&self) -> bool {
        self.access_role == "writer" || self.access_role == "owner"
    }

    /// The server's own default for whether a calendar should show up,
    /// used only until the user expresses a preference.
    pub fn default_visible(&self) -> bool {
        self.selected && !self.hidden
    }
}

/// A start or end as the server sends it: either a date-time or a bare
/// date (all-day).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventTime {
    pub date: Option<String>,
    pub date_time: Option<String>,
}

impl EventTime {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.date_time
            .as_deref()
            .or(self.date.as_deref())
            .and_then(super::parse::parse_timestamp)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attendee {
    #[serde(rename = "self")]
    pub is_self: bool,
    #[serde(rename = "responseStatus")]
    pub response_status: Option<String>,
}

/// One entry of an events response, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub attendees: Vec<Attendee>,
    pub hangout_link: Option<String>,
    pub html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

pub struct GoogleCalendarApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    retry: RetryConfig,
}

impl GoogleCalendarApi {
    pub fn new(client: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token,
            retry: HttpConfig::calendar_api().to_retry_config(),
        }
    }

    async fn get_items<T: DeserializeOwned>(&self, url: &str) -> AppResult<Vec<T>> {
        let token = self.token.as_deref().ok_or(AppError::AuthRequired)?;

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let status = response.status();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::AuthRequired);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(AppError::fetch_failed(status.as_u16(), message));
        }

        let envelope: ItemsEnvelope<T> = response.json().await?;
        Ok(envelope.items)
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarApi {
    async fn list_calendars(&self) -> AppResult<Vec<CalendarListEntry>> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        debug!("Fetching calendar list");
        retry_with_exponential_backoff(&self.retry, || self.get_items(&url)).await
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> AppResult<Vec<RawEvent>> {
        // Calendar ids may carry '#' and '@'; percent-encode them into the path.
        let encoded_id: String =
            url::form_urlencoded::byte_serialize(calendar_id.as_bytes()).collect();
        let mut url =
            url::Url::parse(&format!("{}/calendars/{}/events", self.base_url, encoded_id))
                .map_err(|e| AppError::config(format!("Bad events URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair(
                "timeMin",
                &window_start.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .append_pair(
                "timeMax",
                &window_end.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .append_pair("maxResults", &MAX_RESULTS.to_string())
            .append_pair("orderBy", "startTime")
            .append_pair("singleEvents", "true");

        debug!("Fetching events for calendar '{}'", calendar_id);
        let url = url.to_string();
        retry_with_exponential_backoff(&self.retry, || self.get_items(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_list_entry_editable_roles() {
        let mut entry = CalendarListEntry {
            access_role: "owner".to_string(),
            ..Default::default()
        };
        assert!(entry.is_editable());
        entry.access_role = "writer".to_string();
        assert!(entry.is_editable());
        entry.access_role = "reader".to_string();
        assert!(!entry.is_editable());
    }

    #[test]
    fn test_default_visible_needs_selected_and_not_hidden() {
        let mut entry = CalendarListEntry {
            selected: true,
            hidden: false,
            ..Default::default()
        };
        assert!(entry.default_visible());
        entry.hidden = true;
        assert!(!entry.default_visible());
        entry.hidden = false;
        entry.selected = false;
        assert!(!entry.default_visible());
    }

    #[test]
    fn test_event_time_prefers_date_time() {
        let time = EventTime {
            date: Some("2026-03-14".to_string()),
            date_time: Some("2026-03-14T09:00:00Z".to_string()),
        };
        let instant = time.instant().unwrap();
        assert_eq!(instant.to_rfc3339(), "2026-03-14T09:00:00+00:00");
    }

    #[test]
    fn test_raw_event_deserializes_api_payload() {
        let json = r#"{
            "id": "abc123",
            "summary": "Planning",
            "start": {"dateTime": "2026-03-14T09:00:00Z"},
            "end": {"dateTime": "2026-03-14T10:00:00Z"},
            "attendees": [
                {"email": "other@example.com", "responseStatus": "accepted"},
                {"self": true, "responseStatus": "tentative"}
            ],
            "htmlLink": "https://calendar.example.com/event?eid=abc123"
        }"#;
        let raw: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id, "abc123");
        assert!(!raw.attendees[0].is_self);
        assert!(raw.attendees[1].is_self);
        assert_eq!(raw.html_link.as_deref(), Some("https://calendar.example.com/event?eid=abc123"));
    }

    #[test]
    fn test_items_envelope_tolerates_missing_items() {
        let envelope: ItemsEnvelope<RawEvent> = serde_json::from_str("{}").unwrap();
        assert!(envelope.items.is_empty());
    }
}
