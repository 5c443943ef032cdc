//! Event normalization: timestamp parsing, end-time inference, field
//! truncation, and the prefilled event-template link for page-detected
//! drafts.
//!
//! All times are UTC. Date-only values parse to midnight UTC and the
//! midnight check for end inference uses UTC hour/minute; see DESIGN.md
//! for the timezone decision.

use crate::models::{EventDraft, EventRecord, ResponseStatus};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use log::warn;
use url::form_urlencoded;

use super::google::RawEvent;

/// Maximum characters per string field, to keep the resulting event
/// template URL below acceptable limits.
pub const MAX_FIELD_CHARS: usize = 300;

/// Assumed duration for timed events whose source has no end.
pub const DEFAULT_EVENT_DURATION_HOURS: i64 = 2;

const EVENT_TEMPLATE_BASE: &str = "https://www.google.com/calendar/event";

/// Parses the server's date or date-time representation. Accepts RFC 3339,
/// a naive date-time (interpreted as UTC), or a bare date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

pub fn is_midnight(instant: DateTime<Utc>) -> bool {
    instant.hour() == 0 && instant.minute() == 0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedTimes {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
}

/// Infers a missing end and classifies all-day events.
///
/// A start exactly at midnight with no end is taken as a one-day all-day
/// event; any other start without an end gets the default duration. An
/// event is all-day when the source had no end, or when both instants sit
/// on a midnight boundary. An unparsable start leaves the record inert.
pub fn normalize_times(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> NormalizedTimes {
    let had_end = end.is_some();
    let start = match start {
        Some(start) => start,
        None => {
            return NormalizedTimes {
                start: None,
                end,
                all_day: false,
            }
        }
    };

    let end = end.unwrap_or_else(|| {
        if is_midnight(start) {
            start + Duration::days(1)
        } else {
            start + Duration::hours(DEFAULT_EVENT_DURATION_HOURS)
        }
    });

    let all_day = !had_end || (is_midnight(start) && is_midnight(end));

    NormalizedTimes {
        start: Some(start),
        end: Some(end),
        all_day,
    }
}

/// Collapses whitespace runs and truncates over-long fields to
/// `MAX_FIELD_CHARS - 2` characters plus a trailing ellipsis marker.
pub fn truncate_field(value: &str) -> String {
    if value.chars().count() <= MAX_FIELD_CHARS {
        return value.to_string();
    }
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut truncated: String = collapsed.chars().take(MAX_FIELD_CHARS - 2).collect();
    truncated.push(' ');
    truncated.push('…');
    truncated
}

/// Converts a raw server event into a normalized [`EventRecord`] owned by
/// `calendar_id`. Unparsable start timestamps yield `start = None`; the
/// record still renders but never qualifies as a next event.
pub fn event_from_api(raw: &RawEvent, calendar_id: &str) -> EventRecord {
    let start = raw.start.as_ref().and_then(|t| t.instant());
    let end = raw.end.as_ref().and_then(|t| t.instant());

    if raw.start.is_some() && start.is_none() {
        warn!(
            "Event '{}' in calendar '{}' has an unparsable start; excluded from next events",
            raw.id, calendar_id
        );
    }

    let times = normalize_times(start, end);

    let response_status = raw
        .attendees
        .iter()
        .find(|attendee| attendee.is_self)
        .map(|attendee| ResponseStatus::from_api(attendee.response_status.as_deref().unwrap_or("")))
        .unwrap_or(ResponseStatus::None);

    EventRecord {
        id: raw.id.clone(),
        calendar_id: calendar_id.to_string(),
        title: truncate_field(raw.summary.as_deref().unwrap_or("")),
        description: truncate_field(raw.description.as_deref().unwrap_or("")),
        location: truncate_field(raw.location.as_deref().unwrap_or("")),
        start: times.start,
        end: times.end,
        all_day: times.all_day,
        response_status,
        url: raw.html_link.clone().unwrap_or_default(),
    }
}

/// Formats an instant the way the event-template endpoint expects:
/// compact date, with the time section omitted at exact midnight so the
/// template opens as an all-day event.
fn template_date(instant: DateTime<Utc>) -> String {
    if is_midnight(instant) {
        instant.format("%Y%m%d").to_string()
    } else {
        instant.format("%Y%m%dT%H%M%S").to_string()
    }
}

/// Builds the prefilled event-creation link for a page-detected draft.
/// Blank optional fields are omitted from the query entirely rather than
/// emitted empty.
pub fn detected_event_url(draft: &EventDraft) -> String {
    let times = normalize_times(draft.start, draft.end);
    let title = truncate_field(&draft.title);
    let description = truncate_field(&draft.description);
    let location = truncate_field(&draft.location);
    let source_url = truncate_field(&draft.url);

    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("action", "TEMPLATE");
    query.append_pair("trp", "false");
    query.append_pair("ctext", &title);

    if let (Some(start), Some(end)) = (times.start, times.end) {
        query.append_pair("dates", &format!("{}/{}", template_date(start), template_date(end)));
    }

    if !location.is_empty() {
        query.append_pair("location", &location);
    }

    if !source_url.is_empty() {
        query.append_pair("sprop", &source_url);
        query.append_pair("sprop", &format!("name:{}", title));
    }

    if !description.is_empty() || !source_url.is_empty() {
        let mut details = String::new();
        if !description.is_empty() {
            details.push_str(&description);
        }
        if !source_url.is_empty() {
            if !details.is_empty() {
                details.push_str("\n\n");
            }
            details.push_str("Read more at ");
            details.push_str(&source_url);
        }
        query.append_pair("details", &details);
    }

    format!("{}?{}", EVENT_TEMPLATE_BASE, query.finish())
}
