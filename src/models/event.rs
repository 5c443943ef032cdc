use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The attending user's RSVP for an event, taken from the attendee entry
/// whose `self` flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    Accepted,
    Declined,
    Tentative,
    NeedsAction,
    None,
}

impl ResponseStatus {
    pub fn from_api(value: &str) -> Self {
        match value {
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            "tentative" => Self::Tentative,
            "needsAction" => Self::NeedsAction,
            _ => Self::None,
        }
    }
}

/// One normalized calendar occurrence. Records are immutable after
/// normalization; every fetch cycle produces fresh instances.
///
/// `start` is `None` when the server timestamp could not be parsed. Such
/// records stay displayable but never qualify as next events. After
/// normalization, `end` is always present whenever `start` is, and
/// `end >= start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    /// Owning calendar, referenced by id only.
    pub calendar_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub response_status: ResponseStatus,
    /// Deep link into the calendar's web UI.
    pub url: String,
}

impl EventRecord {
    pub fn is_declined(&self) -> bool {
        self.response_status == ResponseStatus::Declined
    }

    /// True once the event's start instant has passed. Events without a
    /// parsed start never count as started.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        matches!(self.start, Some(start) if start < now)
    }

    /// True while the event is in progress at `now`.
    pub fn is_in_progress(&self, now: DateTime<Utc>) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }
}

/// An event scraped from a web page, before it exists on any calendar.
/// Only used to build a prefilled event-creation link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// The page the event was detected on.
    pub url: String,
}
