// Remote calendar service integration: the API seam, the REST client,
// and event normalization.

use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod google;
pub mod parse;

pub use google::{CalendarListEntry, GoogleCalendarApi, RawEvent};

/// Seam over the remote calendar service. The sync service only talks to
/// this trait, so tests can substitute a scripted implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Fetches the authoritative list of the user's calendars.
    async fn list_calendars(&self) -> AppResult<Vec<google::CalendarListEntry>>;

    /// Fetches one calendar's events within the given window.
    async fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> AppResult<Vec<google::RawEvent>>;
}
