//! Timer-driven loop that refreshes the badge every tick and decides,
//! from the time since the last successful sync, which refresh tier to
//! trigger: the full calendar-list sync, an events-only sync, or nothing.

use crate::feeds::FeedSyncService;
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Badge refresh cadence; also how often sync tiers are evaluated.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Poll the server every hour for new events, but not new calendars.
pub const EVENT_POLL_INTERVAL_SECS: i64 = 60 * 60;

/// Poll the server every 6 hours for calendars that may have been added.
pub const CALENDAR_POLL_INTERVAL_SECS: i64 = 6 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTier {
    Calendars,
    Events,
    None,
}

/// Which refresh tier a tick at `now` should trigger. Never synced means
/// a cold-start catch-up; the calendar tier subsumes the event tier.
pub fn due_tier(last_synced_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> SyncTier {
    let last = match last_synced_at {
        Some(last) => last,
        None => return SyncTier::Calendars,
    };
    let elapsed = (now - last).num_seconds();
    if elapsed > CALENDAR_POLL_INTERVAL_SECS {
        SyncTier::Calendars
    } else if elapsed > EVENT_POLL_INTERVAL_SECS {
        SyncTier::Events
    } else {
        SyncTier::None
    }
}

pub struct Scheduler {
    service: Arc<FeedSyncService>,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(service: Arc<FeedSyncService>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    /// Runs until the cancellation token fires. Does a one-time initial
    /// fetch on start, then ticks every [`TICK_INTERVAL`].
    pub async fn run(&self) {
        info!("Scheduler starting");
        self.service.sync_calendars().await;

        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The interval's first tick completes immediately; the initial
        // fetch above already covered it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.on_tick(Utc::now()).await;
                }
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping scheduler");
                    break;
                }
            }
        }
        info!("Scheduler stopped");
    }

    /// One tick: always republish the badge from the cache, then spawn
    /// the due sync tier without blocking the tick loop. The service's
    /// per-tier single-flight guards keep an in-flight sync from being
    /// doubled up by the next tick.
    pub async fn on_tick(&self, now: DateTime<Utc>) {
        self.service.refresh_ui(now).await;

        let last_synced_at = self.service.cache().get_sync_state().last_synced_at;
        match due_tier(last_synced_at, now) {
            SyncTier::Calendars => {
                let service = Arc::clone(&self.service);
                tokio::spawn(async move { service.sync_calendars().await });
            }
            SyncTier::Events => {
                let service = Arc::clone(&self.service);
                tokio::spawn(async move { service.sync_events().await });
            }
            SyncTier::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_never_synced_is_cold_start() {
        assert_eq!(due_tier(None, now()), SyncTier::Calendars);
    }

    #[test]
    fn test_recent_sync_does_nothing() {
        let last = now() - ChronoDuration::minutes(30);
        assert_eq!(due_tier(Some(last), now()), SyncTier::None);
    }

    #[test]
    fn test_stale_events_trigger_event_tier() {
        let last = now() - ChronoDuration::minutes(90);
        assert_eq!(due_tier(Some(last), now()), SyncTier::Events);
    }

    #[test]
    fn test_seven_hours_elapsed_triggers_calendar_tier() {
        // Past the 6 h calendar threshold, so the full refresh wins over
        // the events-only tier.
        let last = now() - ChronoDuration::hours(7);
        assert_eq!(due_tier(Some(last), now()), SyncTier::Calendars);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let exactly_1h = now() - ChronoDuration::seconds(EVENT_POLL_INTERVAL_SECS);
        assert_eq!(due_tier(Some(exactly_1h), now()), SyncTier::None);

        let just_past_1h = now() - ChronoDuration::seconds(EVENT_POLL_INTERVAL_SECS + 1);
        assert_eq!(due_tier(Some(just_past_1h), now()), SyncTier::Events);

        let exactly_6h = now() - ChronoDuration::seconds(CALENDAR_POLL_INTERVAL_SECS);
        assert_eq!(due_tier(Some(exactly_6h), now()), SyncTier::Events);

        let just_past_6h = now() - ChronoDuration::seconds(CALENDAR_POLL_INTERVAL_SECS + 1);
        assert_eq!(due_tier(Some(just_past_6h), now()), SyncTier::Calendars);
    }
}
