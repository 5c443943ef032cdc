//! Application configuration: API endpoint, credential source, and the
//! user-facing feed preferences. Loaded from a JSON file under the
//! platform config directory, with built-in defaults for every field.

use crate::error::{AppError, AppResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable holding the bearer token for the calendar API.
/// Token acquisition itself belongs to an external identity provider.
pub const TOKEN_ENV: &str = "UPNEXT_TOKEN";

/// Overrides `api_base_url` when set, e.g. to point at a local stub.
pub const API_BASE_ENV: &str = "UPNEXT_API_BASE_URL";

fn default_api_base_url() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

fn default_agenda_days() -> i64 {
    14
}

fn default_badge_text_shown() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// Forward-looking fetch window, in days.
    pub agenda_days: i64,
    /// Whether the badge shows countdown text or only a tooltip.
    pub badge_text_shown: bool,
    /// Whether all-day events count toward the next-events bucket.
    pub include_all_day_in_next: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            agenda_days: default_agenda_days(),
            badge_text_shown: default_badge_text_shown(),
            include_all_day_in_next: false,
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("upnext").join("config.json"))
    }

    /// Loads the config file if present, otherwise returns defaults, then
    /// applies environment overrides. A malformed file is an error;
    /// silently ignoring it would mask typos.
    pub fn load() -> AppResult<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path).map_err(|e| {
                    AppError::config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                serde_json::from_str(&content).map_err(|e| {
                    AppError::config(format!("Invalid config at {}: {}", path.display(), e))
                })?
            }
            _ => {
                info!("No config file; using defaults");
                Self::default()
            }
        };
        if let Ok(base_url) = std::env::var(API_BASE_ENV) {
            config.api_base_url = base_url;
        }
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.agenda_days < 1 {
            return Err(AppError::config("agenda_days must be at least 1"));
        }
        url::Url::parse(&self.api_base_url)
            .map_err(|e| AppError::config(format!("Invalid api_base_url: {}", e)))?;
        Ok(())
    }
}
