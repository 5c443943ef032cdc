use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the sync machinery's state, as exposed to UI consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Completion instant of the last successful fetch; `None` before the
    /// first successful sync.
    pub last_synced_at: Option<DateTime<Utc>>,
    pub authenticated: bool,
}

impl SyncState {
    pub fn initial() -> Self {
        Self {
            last_synced_at: None,
            authenticated: false,
        }
    }
}
