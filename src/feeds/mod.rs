// Feed synchronization core: cache, calendar registry, and the sync
// service that ties them to the remote API.

pub mod cache;
pub mod registry;
pub mod sync;

pub use cache::{derive_next_events, FeedCache, FeedCacheHandle};
pub use registry::{reconcile, CalendarRegistry};
pub use sync::FeedSyncService;

use crate::badge::BadgeState;
use crate::models::{EventRecord, SyncState};

/// Notifications for UI consumers (badge, popup). Fired whenever the
/// event lists or sync state change.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A sync cycle replaced the cached event list.
    EventsUpdated { total: usize },
    /// The next-events bucket changed.
    NextEventsChanged(Vec<EventRecord>),
    /// Fresh badge rendering derived from the cache.
    Badge(BadgeState),
    /// Authentication or last-sync status changed.
    SyncStateChanged(SyncState),
    /// The credential is missing or expired; user action needed.
    AuthRequired,
}
