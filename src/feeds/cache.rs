//! In-memory store of all fetched events plus the derived "next events"
//! bucket. Replaced wholesale by each successful sync cycle, never
//! patched in place.

use crate::models::{EventRecord, SyncState};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
pub struct FeedCache {
    /// Every event from visible calendars, sorted ascending by start.
    /// Records without a parsed start sort after all dated events.
    all_events: Vec<EventRecord>,
    next_events: Vec<EventRecord>,
    last_synced_at: Option<DateTime<Utc>>,
    authenticated: bool,
}

impl FeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all_events(&self) -> &[EventRecord] {
        &self.all_events
    }

    pub fn next_events(&self) -> &[EventRecord] {
        &self.next_events
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    pub fn sync_state(&self) -> SyncState {
        SyncState {
            last_synced_at: self.last_synced_at,
            authenticated: self.authenticated,
        }
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    /// Installs a freshly fetched event list. The sort is stable, so
    /// events sharing a start keep their fan-out concatenation order and
    /// repeated syncs with identical server data stay byte-stable.
    pub fn replace_events(&mut self, mut events: Vec<EventRecord>, synced_at: DateTime<Utc>) {
        events.sort_by_key(|e| (e.start.is_none(), e.start));
        self.all_events = events;
        self.last_synced_at = Some(synced_at);
    }

    /// Recomputes the next-events bucket. Returns whether it changed.
    pub fn recompute_next_events(&mut self, now: DateTime<Utc>, include_all_day: bool) -> bool {
        let next = derive_next_events(&self.all_events, now, include_all_day);
        let changed = next != self.next_events;
        self.next_events = next;
        changed
    }
}

/// The events that will occur in the immediate future: not yet started,
/// not declined, optionally excluding all-day events, and all sharing the
/// earliest qualifying start to the exact millisecond.
pub fn derive_next_events(
    events: &[EventRecord],
    now: DateTime<Utc>,
    include_all_day: bool,
) -> Vec<EventRecord> {
    let mut qualifying = events.iter().filter(|e| {
        matches!(e.start, Some(start) if start >= now)
            && !e.is_declined()
            && (include_all_day || !e.all_day)
    });

    let first = match qualifying.next() {
        Some(event) => event,
        None => return Vec::new(),
    };

    let mut next = vec![first.clone()];
    for event in qualifying {
        if event.start == first.start {
            next.push(event.clone());
        } else {
            break;
        }
    }
    next
}

/// Shared handle to the cache. Consumers get snapshot clones; only the
/// sync service and scheduler mutate through it.
#[derive(Clone, Default)]
pub struct FeedCacheHandle {
    inner: Arc<RwLock<FeedCache>>,
}

impl FeedCacheHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events(&self) -> Vec<EventRecord> {
        self.with(|cache| cache.all_events.clone())
    }

    pub fn get_next_events(&self) -> Vec<EventRecord> {
        self.with(|cache| cache.next_events.clone())
    }

    pub fn get_sync_state(&self) -> SyncState {
        self.with(|cache| cache.sync_state())
    }

    pub fn with<R>(&self, f: impl FnOnce(&FeedCache) -> R) -> R {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut FeedCache) -> R) -> R {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResponseStatus;
    use chrono::{Duration, TimeZone};

    fn event(id: &str, start: Option<DateTime<Utc>>) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            calendar_id: "cal-1".to_string(),
            title: id.to_string(),
            description: String::new(),
            location: String::new(),
            start,
            end: start.map(|s| s + Duration::hours(1)),
            all_day: false,
            response_status: ResponseStatus::Accepted,
            url: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_next_events_share_earliest_start() {
        let t0 = now() + Duration::hours(1);
        let events = vec![
            event("a", Some(t0)),
            event("b", Some(t0)),
            event("c", Some(t0 + Duration::hours(1))),
        ];
        let next = derive_next_events(&events, now(), true);
        assert_eq!(next.len(), 2);
        assert!(next.iter().all(|e| e.start == Some(t0)));
    }

    #[test]
    fn test_past_events_are_skipped_but_exact_now_qualifies() {
        let events = vec![
            event("past", Some(now() - Duration::minutes(1))),
            event("exact", Some(now())),
        ];
        let next = derive_next_events(&events, now(), true);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, "exact");
    }

    #[test]
    fn test_declined_event_excluded_from_shared_start_bucket() {
        let t0 = now() + Duration::hours(1);
        let mut declined = event("declined", Some(t0));
        declined.response_status = ResponseStatus::Declined;
        let events = vec![declined, event("kept", Some(t0))];

        let next = derive_next_events(&events, now(), true);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, "kept");
    }

    #[test]
    fn test_all_day_filter_is_gated_by_flag() {
        let t0 = now() + Duration::hours(1);
        let mut all_day = event("allday", Some(t0));
        all_day.all_day = true;
        let timed = event("timed", Some(t0 + Duration::hours(2)));
        let events = vec![all_day.clone(), timed.clone()];

        let without = derive_next_events(&events, now(), false);
        assert_eq!(without[0].id, "timed");

        let with = derive_next_events(&events, now(), true);
        assert_eq!(with[0].id, "allday");
    }

    #[test]
    fn test_millisecond_difference_breaks_the_bucket() {
        let t0 = now() + Duration::hours(1);
        let events = vec![
            event("a", Some(t0)),
            event("b", Some(t0 + Duration::milliseconds(1))),
        ];
        let next = derive_next_events(&events, now(), true);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, "a");
    }

    #[test]
    fn test_unparsed_start_never_qualifies() {
        let events = vec![event("broken", None)];
        assert!(derive_next_events(&events, now(), true).is_empty());
    }

    #[test]
    fn test_empty_feed_yields_empty_bucket() {
        assert!(derive_next_events(&[], now(), true).is_empty());
    }

    #[test]
    fn test_replace_events_sorts_and_keeps_tie_order() {
        let t0 = now() + Duration::hours(1);
        let mut cache = FeedCache::new();
        let mut from_cal_b = event("b-first", Some(t0));
        from_cal_b.calendar_id = "cal-b".to_string();

        cache.replace_events(
            vec![
                event("later", Some(t0 + Duration::hours(3))),
                event("a-first", Some(t0)),
                from_cal_b,
                event("broken", None),
            ],
            now(),
        );

        let ids: Vec<&str> = cache.all_events().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a-first", "b-first", "later", "broken"]);
        assert_eq!(cache.last_synced_at(), Some(now()));
    }

    #[test]
    fn test_recompute_reports_changes() {
        let mut cache = FeedCache::new();
        cache.replace_events(vec![event("a", Some(now() + Duration::hours(1)))], now());
        assert!(cache.recompute_next_events(now(), true));
        assert!(!cache.recompute_next_events(now(), true));
        assert_eq!(cache.next_events().len(), 1);
    }

    #[test]
    fn test_handle_snapshots_are_clones() {
        let handle = FeedCacheHandle::new();
        handle.with_mut(|cache| {
            cache.replace_events(vec![event("a", Some(now() + Duration::hours(1)))], now())
        });
        let snapshot = handle.get_events();
        assert_eq!(snapshot.len(), 1);
        let state = handle.get_sync_state();
        assert_eq!(state.last_synced_at, Some(now()));
        assert!(!state.authenticated);
    }
}
