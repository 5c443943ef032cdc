//! Badge derivation: the countdown text, color, and tooltip summarizing
//! time-until-next-event. Pure functions over cache snapshots; the UI
//! layer applies the result.

use crate::models::{Calendar, EventRecord, SyncState};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

const ERROR_COLOR: &str = "#cc1a1a";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeState {
    /// Short countdown text, empty when nothing is upcoming or the user
    /// disabled badge text.
    pub text: String,
    /// Background color, taken from the next event's calendar.
    pub color: Option<String>,
    /// Tooltip describing the next events.
    pub title: String,
}

impl BadgeState {
    pub fn auth_required() -> Self {
        Self {
            text: "×".to_string(),
            color: Some(ERROR_COLOR.to_string()),
            title: "Authorization required".to_string(),
        }
    }

    pub fn idle() -> Self {
        Self {
            text: String::new(),
            color: None,
            title: "No upcoming events".to_string(),
        }
    }
}

/// Compact relative countdown: minutes under an hour, hours under a day,
/// days beyond that. Parameterized by `now` so it never touches shared
/// formatter state.
pub fn relative_time_text(now: DateTime<Utc>, start: DateTime<Utc>) -> String {
    let delta = start - now;
    if delta.num_seconds() <= 0 {
        return "now".to_string();
    }
    let minutes = delta.num_minutes();
    if minutes < 60 {
        format!("{}m", minutes.max(1))
    } else if minutes < 60 * 24 {
        format!("{}h", delta.num_hours())
    } else {
        format!("{}d", delta.num_days())
    }
}

/// Multi-line tooltip: when the bucket starts, then one line per
/// simultaneous event with its calendar's title.
pub fn tooltip(
    next_events: &[EventRecord],
    calendars: &BTreeMap<String, Calendar>,
    now: DateTime<Utc>,
) -> String {
    let mut lines = Vec::new();
    if let Some(start) = next_events.first().and_then(|e| e.start) {
        lines.push(format!(
            "{} (in {})",
            start.format("%a %b %e, %H:%M"),
            relative_time_text(now, start)
        ));
    }
    for event in next_events {
        let calendar_title = calendars
            .get(&event.calendar_id)
            .map(|c| c.title.as_str())
            .unwrap_or("");
        lines.push(format!(" • {} ({})", event.title, calendar_title));
    }
    lines.join("\n")
}

/// Derives the full badge state from a cache snapshot.
pub fn badge_state(
    sync_state: &SyncState,
    next_events: &[EventRecord],
    calendars: &BTreeMap<String, Calendar>,
    now: DateTime<Utc>,
    text_shown: bool,
) -> BadgeState {
    if !sync_state.authenticated {
        return BadgeState::auth_required();
    }
    if next_events.is_empty() {
        return BadgeState::idle();
    }

    let first = &next_events[0];
    let text = if text_shown {
        first
            .start
            .map(|start| relative_time_text(now, start))
            .unwrap_or_default()
    } else {
        String::new()
    };

    BadgeState {
        text,
        color: calendars
            .get(&first.calendar_id)
            .and_then(|c| c.background_color.clone()),
        title: tooltip(next_events, calendars, now),
    }
}
