//! Expiry sweeper
//!
//! Periodically deletes expired mappings in the background. Best effort: a failed sweep is
//! logged and simply tried again on the next tick.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::service::UrlService;
use crate::storage::Storage;

/// Default time between two sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Spawn the sweeper, running every `interval` until `shutdown` is cancelled
pub fn spawn<S: Storage>(
    service: UrlService<S>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Sweeping expired mappings every {interval:?}");

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    run_once(&service).await;
                }
            }
        }

        tracing::info!("Sweeper stopped");
    })
}

/// Sweep once
///
/// Returns the number of deleted mappings, `None` if the sweep failed
pub async fn run_once<S: Storage>(service: &UrlService<S>) -> Option<u64> {
    match service.sweep_expired().await {
        Ok(0) => {
            tracing::debug!("Sweep complete, nothing expired");
            Some(0)
        }
        Ok(count) => {
            tracing::info!("Sweep complete: {count} expired mappings deleted");
            Some(count)
        }
        Err(err) => {
            tracing::error!("Sweep failed: {err}");
            None
        }
    }
}
