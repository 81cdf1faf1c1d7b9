use std::time::Duration;

use picsearch_application::RateLimitService;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Periodically drops rate windows of clients idle for `idle_for`, until
/// `token` is cancelled.
pub fn spawn_rate_window_sweep(
    service: RateLimitService,
    idle_for: chrono::Duration,
    every: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = service.evict_idle(idle_for);
                    if evicted > 0 {
                        debug!(
                            evicted,
                            tracked = service.tracked_clients(),
                            "evicted idle rate windows"
                        );
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use picsearch_application::{RateLimitRule, RateLimitService, SystemClock};
    use picsearch_infrastructure::InMemoryRateWindowStore;
    use tokio_util::sync::CancellationToken;

    use super::spawn_rate_window_sweep;

    #[tokio::test(start_paused = true)]
    async fn sweep_stops_when_cancelled() {
        let service = RateLimitService::new(
            Arc::new(InMemoryRateWindowStore::new()),
            Arc::new(SystemClock),
            RateLimitRule::new("api", 20, 30),
        );
        let token = CancellationToken::new();
        let handle = spawn_rate_window_sweep(
            service,
            chrono::Duration::minutes(10),
            Duration::from_secs(60),
            token.clone(),
        );

        tokio::time::advance(Duration::from_secs(180)).await;
        assert!(!handle.is_finished());

        token.cancel();
        assert!(handle.await.is_ok());
    }
}
