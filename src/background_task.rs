use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::limiter::rate_limiter::RateLimiter;

/// Purges expired rate-limit windows on a fixed schedule, on top of the
/// probabilistic sweep done during checks.
pub async fn start_sweep_task(limiter: Arc<RateLimiter>, every: Duration) {
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        let purged = limiter.purge_expired();
        if purged > 0 {
            tracing::info!("Purged {} expired rate-limit entries", purged);
        }
    }
}
