//! File-backed calendar preference store. Holds the merged calendar map
//! keyed by calendar id, so a calendar's `visible` choice survives
//! restarts and server-side default changes.

use crate::error::{AppError, AppResult};
use crate::models::Calendar;
use log::warn;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub struct CalendarStore {
    path: PathBuf,
}

impl CalendarStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> AppResult<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| AppError::storage("No data directory available on this platform"))?
            .join("upnext");
        fs::create_dir_all(&base)
            .map_err(|e| AppError::storage(format!("Failed to create {}: {}", base.display(), e)))?;
        Ok(Self::new(base.join("calendars.json")))
    }

    /// Loads the stored calendar map. A missing file is an empty map; a
    /// corrupt file is logged and treated as empty rather than wedging
    /// every future sync.
    pub fn load(&self) -> AppResult<BTreeMap<String, Calendar>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| AppError::storage(format!("Failed to read {}: {}", self.path.display(), e)))?;
        match serde_json::from_str(&content) {
            Ok(calendars) => Ok(calendars),
            Err(e) => {
                warn!(
                    "Calendar store at {} is corrupt ({}); starting with an empty map",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    /// Persists the merged map, replacing whatever was stored before.
    /// Writes to a sibling temp file and renames so a crash mid-write
    /// cannot leave a half-written store.
    pub fn save(&self, calendars: &BTreeMap<String, Calendar>) -> AppResult<()> {
        let json = serde_json::to_string_pretty(calendars)
            .map_err(|e| AppError::storage(format!("Failed to serialize calendars: {}", e)))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| AppError::storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::storage(format!("Failed to replace {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn calendar(id: &str, visible: bool) -> Calendar {
        Calendar {
            id: id.to_string(),
            title: format!("Calendar {}", id),
            description: String::new(),
            foreground_color: None,
            background_color: None,
            editable: true,
            visible,
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = CalendarStore::new(dir.path().join("calendars.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CalendarStore::new(dir.path().join("calendars.json"));

        let mut calendars = BTreeMap::new();
        calendars.insert("work".to_string(), calendar("work", true));
        calendars.insert("home".to_string(), calendar("home", false));
        store.save(&calendars).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, calendars);
        assert!(!loaded["home"].visible);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calendars.json");
        fs::write(&path, "{not json").unwrap();
        let store = CalendarStore::new(path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = CalendarStore::new(dir.path().join("calendars.json"));

        let mut first = BTreeMap::new();
        first.insert("old".to_string(), calendar("old", true));
        store.save(&first).unwrap();

        let second = BTreeMap::new();
        store.save(&second).unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
