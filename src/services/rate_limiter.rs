use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Debug)]
struct Metrics {
    decisions_total: Counter<u64>,
    evicted_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("submission-gateway");
        Self {
            decisions_total: meter
                .u64_counter("rate_limit_decisions_total")
                .with_description("Rate limit decisions (allowed/throttled)")
                .build(),
            evicted_total: meter
                .u64_counter("rate_limit_entries_evicted_total")
                .with_description("Rate limit entries dropped by the expiry sweep")
                .build(),
        }
    }
}

/// Per-client submission cooldown.
///
/// Remembers when each client identity last had a submission admitted and refuses another one
/// until `window` has elapsed. The check and the timestamp write happen under the same shard
/// lock, so concurrent submissions from one identity cannot both get through.
///
/// State is process-local. Client identities come from a header the client controls, so this is
/// abuse mitigation, not a security boundary.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    entries: Arc<DashMap<String, Instant>>,
    window: Duration,
    metrics: Metrics,
}

impl RateLimiter {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { entries: Arc::new(DashMap::new()), window, metrics: Metrics::new() }
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Admits the client and records `now` as its last submission, or returns `false` if the
    /// previous admitted submission was less than one window ago.
    pub fn admit(&self, client_id: &str, now: Instant) -> bool {
        let admitted = match self.entries.entry(client_id.to_owned()) {
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) < self.window {
                    false
                } else {
                    entry.insert(now);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        };

        let label = if admitted { "allowed" } else { "throttled" };
        self.metrics.decisions_total.add(1, &[KeyValue::new("status", label)]);
        admitted
    }

    /// Drops entries at least one window old. Returns how many were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, last| {
            let keep = now.saturating_duration_since(*last) < self.window;
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            self.metrics.evicted_total.add(u64::try_from(removed).unwrap_or(u64::MAX), &[]);
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
