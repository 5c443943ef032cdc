// upnext - calendar feed watcher with a countdown badge
// Wires the sync service, scheduler, and a channel consumer standing in
// for the browser UI layer.

use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use upnext::calendar::GoogleCalendarApi;
use upnext::http_config::HttpConfig;
use upnext::utils::logging;
use upnext::{
    CalendarRegistry, CalendarStore, Config, FeedCacheHandle, FeedEvent, FeedSyncService,
    Scheduler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging()?;

    let config = Config::load()?;
    config.validate()?;

    let token = std::env::var(upnext::config::TOKEN_ENV).ok();
    if token.is_none() {
        warn!(
            "{} is not set; syncs will report that authorization is required",
            upnext::config::TOKEN_ENV
        );
    }

    let client = HttpConfig::calendar_api().build_client()?;
    let api = Arc::new(GoogleCalendarApi::new(
        client,
        config.api_base_url.clone(),
        token,
    ));
    let store = Arc::new(CalendarStore::open_default()?);
    let registry = Arc::new(CalendarRegistry::load(store));
    let cache = FeedCacheHandle::new();

    let (tx, mut rx) = mpsc::channel(64);
    let service = Arc::new(FeedSyncService::new(api, registry, cache, tx, config));

    // Stand-in UI consumer: renders notifications to the log.
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                FeedEvent::Badge(badge) => {
                    info!("[Badge] '{}' - {}", badge.text, badge.title.replace('\n', " | "))
                }
                FeedEvent::EventsUpdated { total } => info!("[Feed] {} events cached", total),
                FeedEvent::NextEventsChanged(next) => {
                    info!("[Feed] next-events bucket now holds {}", next.len())
                }
                FeedEvent::SyncStateChanged(state) => info!(
                    "[Sync] authenticated={} last_synced_at={:?}",
                    state.authenticated, state.last_synced_at
                ),
                FeedEvent::AuthRequired => error!("[Sync] authorization required; please log in"),
            }
        }
    });

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            signal_token.cancel();
        }
    });

    Scheduler::new(service, shutdown).run().await;
    Ok(())
}
