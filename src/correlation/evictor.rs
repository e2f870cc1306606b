use crate::correlation::MessageCache;
use crate::logging::Timer;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Periodically evict snapshots older than `retention`
///
/// The first sweep happens one `interval` after spawning. The task runs
/// until `shutdown` is cancelled.
pub fn spawn_evictor(
    cache: Arc<MessageCache>,
    retention: Duration,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tracing::info!(
        retention_secs = retention.as_secs(),
        interval_secs = interval.as_secs(),
        "Starting message cache evictor"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // interval() fires immediately; skip it
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Message cache evictor stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let mut timer = Timer::new("evict_older_than");
                    timer.record_removed(cache.evict_older_than(retention, Utc::now()));
                    drop(timer);
                    cache.log_stats();
                }
            }
        }
    })
}
