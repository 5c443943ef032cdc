//! One full synchronization cycle: calendar-list fetch and reconcile,
//! per-calendar event fan-out, cache replacement, UI notification.

use crate::badge;
use crate::calendar::{parse, CalendarApi};
use crate::config::Config;
use crate::feeds::cache::FeedCacheHandle;
use crate::feeds::registry::CalendarRegistry;
use crate::feeds::FeedEvent;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

/// Clears the in-flight flag when a sync tier finishes, however it exits.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct FeedSyncService {
    api: Arc<dyn CalendarApi>,
    registry: Arc<CalendarRegistry>,
    cache: FeedCacheHandle,
    notify: Sender<FeedEvent>,
    config: Config,
    calendars_in_flight: AtomicBool,
    events_in_flight: AtomicBool,
}

impl FeedSyncService {
    pub fn new(
        api: Arc<dyn CalendarApi>,
        registry: Arc<CalendarRegistry>,
        cache: FeedCacheHandle,
        notify: Sender<FeedEvent>,
        config: Config,
    ) -> Self {
        Self {
            api,
            registry,
            cache,
            notify,
            config,
            calendars_in_flight: AtomicBool::new(false),
            events_in_flight: AtomicBool::new(false),
        }
    }

    pub fn cache(&self) -> &FeedCacheHandle {
        &self.cache
    }

    pub fn registry(&self) -> &CalendarRegistry {
        &self.registry
    }

    /// Full refresh: fetch the calendar list, reconcile it against stored
    /// preferences, persist, then sync events. An authorization failure
    /// halts the cycle before any event fetch and surfaces a UI state;
    /// transient failures are silent (the next tick retries).
    pub async fn sync_calendars(&self) {
        let _guard = match FlightGuard::acquire(&self.calendars_in_flight) {
            Some(guard) => guard,
            None => {
                debug!("Calendar sync already in flight; skipping");
                return;
            }
        };

        info!("Syncing calendar list");
        match self.api.list_calendars().await {
            Ok(entries) => {
                self.registry.apply_server_list(&entries);
                let became_authenticated = self.cache.with_mut(|cache| {
                    let was = cache.sync_state().authenticated;
                    cache.set_authenticated(true);
                    !was
                });
                if became_authenticated {
                    self.send(FeedEvent::SyncStateChanged(self.cache.get_sync_state()))
                        .await;
                }
                self.sync_events().await;
            }
            Err(e) if e.is_auth() => {
                warn!("Authorization required; halting sync cycle");
                self.cache.with_mut(|cache| cache.set_authenticated(false));
                self.send(FeedEvent::AuthRequired).await;
                self.publish_badge(Utc::now()).await;
            }
            Err(e) => {
                warn!("Calendar list fetch failed: {}", e);
            }
        }
    }

    /// Events-only refresh: one concurrent fetch per visible calendar
    /// over the forward agenda window, joined and merged into a fresh
    /// event list. A failed calendar contributes zero events; the cycle
    /// itself always completes and notifies, even with zero visible
    /// calendars, so the UI never goes stale silently.
    pub async fn sync_events(&self) {
        let _guard = match FlightGuard::acquire(&self.events_in_flight) {
            Some(guard) => guard,
            None => {
                debug!("Event sync already in flight; skipping");
                return;
            }
        };

        let started = std::time::Instant::now();
        let window_start = Utc::now();
        let window_end = window_start + Duration::days(self.config.agenda_days);
        let visible = self.registry.visible_calendars();
        info!("Syncing events for {} visible calendars", visible.len());

        // Fan-out. join_all keeps results in fan-out order regardless of
        // completion order, which fixes the tie-break for equal starts.
        let fetches = visible.iter().map(|calendar| {
            let api = Arc::clone(&self.api);
            let calendar_id = calendar.id.clone();
            async move { api.list_events(&calendar_id, window_start, window_end).await }
        });
        let results = join_all(fetches).await;

        // Fan-in into this cycle's own accumulator; nothing is shared
        // across cycles, so a late completion cannot leak into a newer one.
        let mut all_events = Vec::new();
        for (calendar, result) in visible.iter().zip(results) {
            match result {
                Ok(raw_events) => {
                    all_events.extend(
                        raw_events
                            .iter()
                            .map(|raw| parse::event_from_api(raw, &calendar.id)),
                    );
                }
                Err(e) => {
                    warn!(
                        "Events fetch failed for '{}', contributing zero events: {}",
                        calendar.title, e
                    );
                }
            }
        }

        let total = all_events.len();
        let synced_at = Utc::now();
        self.cache
            .with_mut(|cache| cache.replace_events(all_events, synced_at));

        self.send(FeedEvent::EventsUpdated { total }).await;
        self.send(FeedEvent::SyncStateChanged(self.cache.get_sync_state()))
            .await;
        self.refresh_ui(synced_at).await;
        crate::utils::logging::log_sync_cycle(
            "events",
            visible.len(),
            total,
            started.elapsed().as_millis() as u64,
        );
    }

    /// Pure read over the cache: recompute the next-events bucket and
    /// publish the badge. No network I/O; safe to run on every tick.
    pub async fn refresh_ui(&self, now: DateTime<Utc>) {
        let changed = self.cache.with_mut(|cache| {
            cache.recompute_next_events(now, self.config.include_all_day_in_next)
        });
        if changed {
            self.send(FeedEvent::NextEventsChanged(self.cache.get_next_events()))
                .await;
        }
        self.publish_badge(now).await;
    }

    async fn publish_badge(&self, now: DateTime<Utc>) {
        let state = self.cache.get_sync_state();
        let next = self.cache.get_next_events();
        let badge = badge::badge_state(
            &state,
            &next,
            &self.registry.snapshot(),
            now,
            self.config.badge_text_shown,
        );
        self.send(FeedEvent::Badge(badge)).await;
    }

    async fn send(&self, event: FeedEvent) {
        // A closed or full channel only means no UI is listening.
        let _ = self.notify.send(event).await;
    }
}
