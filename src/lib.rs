// upnext library
// Calendar feed synchronization, next-event derivation, and the polling
// scheduler behind the countdown badge.

pub mod badge;
pub mod calendar;
pub mod config;
pub mod error;
pub mod feeds;
pub mod http_config;
pub mod models;
pub mod scheduler;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use badge::BadgeState;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use feeds::{CalendarRegistry, FeedCacheHandle, FeedEvent, FeedSyncService};
pub use models::{Calendar, EventDraft, EventRecord, ResponseStatus, SyncState};
pub use scheduler::Scheduler;
pub use storage::CalendarStore;
