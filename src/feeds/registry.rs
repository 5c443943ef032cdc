//! Reconciles the server's calendar list with locally persisted
//! visibility preferences.

use crate::calendar::CalendarListEntry;
use crate::models::Calendar;
use crate::storage::CalendarStore;
use log::{error, warn};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Merges the authoritative server list with stored preferences. Pure:
/// no I/O happens here, which keeps it trivially testable.
///
/// The server wins for every presentation field. `visible` is carried
/// over verbatim from storage when present; a calendar seen for the
/// first time defaults to the server's "selected and not hidden" signal.
/// Calendars absent from the server response are dropped.
pub fn reconcile(
    server: &[CalendarListEntry],
    stored: &BTreeMap<String, Calendar>,
) -> BTreeMap<String, Calendar> {
    let mut merged = BTreeMap::new();
    for entry in server {
        let visible = stored
            .get(&entry.id)
            .map(|calendar| calendar.visible)
            .unwrap_or_else(|| entry.default_visible());

        merged.insert(
            entry.id.clone(),
            Calendar {
                id: entry.id.clone(),
                title: entry.summary.clone(),
                description: entry.description.clone().unwrap_or_default(),
                foreground_color: entry.foreground_color.clone(),
                background_color: entry.background_color.clone(),
                editable: entry.is_editable(),
                visible,
            },
        );
    }
    merged
}

/// In-memory copy of the merged calendar map, backed by the preference
/// store. The `BTreeMap` keeps fan-out order (and therefore the stable
/// sort tie-break) identical across cycles.
pub struct CalendarRegistry {
    store: Arc<CalendarStore>,
    calendars: RwLock<BTreeMap<String, Calendar>>,
}

impl CalendarRegistry {
    /// Loads whatever the store holds; a load failure starts empty and
    /// heals on the next calendar-list sync.
    pub fn load(store: Arc<CalendarStore>) -> Self {
        let calendars = match store.load() {
            Ok(calendars) => calendars,
            Err(e) => {
                warn!("Could not load calendar store: {}", e);
                BTreeMap::new()
            }
        };
        Self {
            store,
            calendars: RwLock::new(calendars),
        }
    }

    /// Applies a fresh server list: reconcile, persist, swap in memory.
    /// A persistence failure is logged but does not abort the cycle; the
    /// merged map still takes effect for this process.
    pub fn apply_server_list(&self, server: &[CalendarListEntry]) {
        let merged = reconcile(server, &self.snapshot());
        if let Err(e) = self.store.save(&merged) {
            error!("Failed to persist calendar preferences: {}", e);
        }
        *self
            .calendars
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = merged;
    }

    pub fn snapshot(&self) -> BTreeMap<String, Calendar> {
        self.calendars
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The calendars whose events get fetched, in stable id order.
    pub fn visible_calendars(&self) -> Vec<Calendar> {
        self.calendars
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|calendar| calendar.visible)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Calendar> {
        self.calendars
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
    }
}
