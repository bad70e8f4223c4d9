use crate::services::rate_limiter::RateLimiter;
use std::time::Duration;
use tokio::time::Instant;

/// Periodically forgets clients whose cooldown has run out.
#[derive(Debug)]
pub struct RateLimitSweepWorker {
    limiter: RateLimiter,
    interval: Duration,
}

impl RateLimitSweepWorker {
    #[must_use]
    pub const fn new(limiter: RateLimiter, interval: Duration) -> Self {
        Self { limiter, interval }
    }

    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval.max(Duration::from_millis(1)));

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    tracing::debug_span!("rate_limit_sweep_iteration").in_scope(|| self.perform_sweep(Instant::now()));
                }
                _ = shutdown.changed() => {}
            }
        }
        tracing::info!("Rate limit sweep loop shutting down...");
    }

    /// Drops expired entries and returns how many were removed.
    pub fn perform_sweep(&self, now: Instant) -> usize {
        let removed = self.limiter.sweep(now);
        if removed > 0 {
            tracing::debug!(removed = %removed, remaining = %self.limiter.len(), "Swept expired rate limit entries");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::watch;

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_on_interval_and_stops_on_shutdown() {
        let limiter = RateLimiter::new(Duration::from_secs(30));
        assert!(limiter.admit("203.0.113.1", Instant::now()));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(RateLimitSweepWorker::new(limiter.clone(), Duration::from_secs(10)).run(rx));

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(limiter.len(), 1, "entry is still inside its window");

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(limiter.is_empty(), "entry should be swept once its window has passed");

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn test_perform_sweep_reports_removed() {
        let limiter = RateLimiter::new(Duration::from_secs(30));
        let start = Instant::now();
        assert!(limiter.admit("a", start));
        assert!(limiter.admit("b", start + Duration::from_secs(10)));

        let worker = RateLimitSweepWorker::new(limiter, Duration::from_secs(60));
        assert_eq!(worker.perform_sweep(start + Duration::from_secs(35)), 1);
        assert_eq!(worker.perform_sweep(start + Duration::from_secs(35)), 0);
    }
}
