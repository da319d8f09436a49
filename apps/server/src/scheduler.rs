//! Background scheduler for periodic country refreshes.
//!
//! Disabled unless `CC_REFRESH_INTERVAL_SECS` is set to a positive value.

use std::sync::Arc;
use std::time::Duration;
use tokio::{task::JoinHandle, time::interval};
use tracing::{error, info};

use crate::main_lib::AppState;

/// Starts the refresh loop. The first refresh runs after one full interval.
pub fn start_refresh_scheduler(state: Arc<AppState>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Refresh scheduler started ({}s interval)", every.as_secs());

        let mut ticker = interval(every);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_scheduled_refresh(&state).await;
        }
    })
}

async fn run_scheduled_refresh(state: &Arc<AppState>) {
    info!("Running scheduled country refresh...");
    match state.country_service.refresh().await {
        Ok(status) => info!(
            "Scheduled refresh completed: {} countries affected",
            status.total_countries
        ),
        Err(e) => error!("Scheduled refresh failed: {}", e),
    }
}
