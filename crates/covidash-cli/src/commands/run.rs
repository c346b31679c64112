use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};

use covidash_core::board::UpdateList;
use covidash_core::feed::{HealthApiClient, NewsApiClient};
use covidash_core::scheduler::{RefreshService, ScheduleRequest};
use covidash_core::{AppConfig, Dashboard};

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    let state = Arc::new(Dashboard::new());
    let board = Arc::new(UpdateList::new());
    let health = Arc::new(HealthApiClient::new(&config)?);
    let news = Arc::new(NewsApiClient::new(&config)?);
    let service = RefreshService::new(state, health, news, board, config.clone());

    for update in &config.updates {
        let request = ScheduleRequest {
            name: update.name.clone(),
            time_spec: update.time.clone(),
            feed: update.feed,
            recurring: update.repeat,
        };
        // A bad entry should not keep the rest of the config from running.
        if let Err(e) = service.schedule(request) {
            error!("skipping update {:?}: {}", update.name, e);
        }
    }

    for task in service.pending() {
        info!(name = %task.name, fire_at = %task.fire_at, "pending refresh");
    }

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let tick_secs = config.sync.tick_interval_secs;
    let mut interval = tokio::time::interval(Duration::from_secs(tick_secs));
    // Skip the first tick (fires immediately)
    interval.tick().await;

    info!("refresh engine started, ticking every {}s", tick_secs);

    loop {
        tokio::select! {
            result = shutdown_rx.changed() => {
                if result.is_ok() && *shutdown_rx.borrow() {
                    info!("refresh engine stopped");
                    break;
                }
            }
            _ = interval.tick() => {
                service.tick().await;
            }
        }
    }

    Ok(())
}
