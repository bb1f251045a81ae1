use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::identity::ClientIdentity;
use crate::config::DetectionConfig;
use crate::utils::{log_excessive_traffic, log_tracker_sweep};

/// Entries inspected when choosing an eviction victim at capacity
const EVICTION_SAMPLE: usize = 8;

/// Sliding-window settings for the traffic tracker
#[derive(Debug, Clone)]
pub struct TrafficConfig {
    /// Requests allowed inside one window; one more is excessive
    pub request_threshold: usize,
    /// Sliding window length
    pub window: Duration,
    /// Idle time past the window after which an identity is dropped
    pub idle_retention: Duration,
    /// Upper bound on tracked identities
    pub max_tracked_clients: usize,
    /// Run an opportunistic sweep every this many records; 0 disables it
    pub sweep_every: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self::from(&DetectionConfig::default())
    }
}

impl From<&DetectionConfig> for TrafficConfig {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            request_threshold: config.request_threshold,
            window: config.window(),
            idle_retention: config.idle_retention(),
            max_tracked_clients: config.max_tracked_clients,
            sweep_every: config.sweep_every,
        }
    }
}

/// Per-identity request history over a sliding time window.
///
/// Identities live in a sharded map; a `record` holds only the shard lock
/// for the touched identity, so append, prune and compare are atomic per
/// identity while unrelated identities proceed in parallel.
///
/// The number of identities is bounded. Idle identities are swept on a
/// cadence and by the service's background task. A new identity arriving at
/// capacity evicts the least recently active of a fixed-size sample, so the
/// cost of a record never depends on how many identities are tracked. The
/// bound is soft by the number of inserts racing on distinct new identities.
pub struct TrafficTracker {
    config: TrafficConfig,
    windows: DashMap<ClientIdentity, VecDeque<Instant>>,
    records: AtomicU64,
}

impl TrafficTracker {
    pub fn new(config: TrafficConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            records: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    /// Record a request at `now` and report whether the identity is over budget.
    ///
    /// The timestamp is appended, entries older than `now - window` are
    /// pruned, and the remaining count is compared strictly against the
    /// threshold.
    pub fn record(&self, identity: &ClientIdentity, now: Instant) -> bool {
        self.maybe_sweep(now);
        if !self.windows.contains_key(identity) {
            self.make_room();
        }

        let mut window = self.windows.entry(identity.clone()).or_default();

        // Keep the window non-decreasing even if a caller hands us a stale instant.
        let stamp = window.back().map_or(now, |last| now.max(*last));
        window.push_back(stamp);
        prune(&mut window, now, self.config.window);

        let count = window.len();
        let excessive = count > self.config.request_threshold;
        if count.checked_sub(1) == Some(self.config.request_threshold) {
            log_excessive_traffic(identity.as_str(), count, self.config.request_threshold);
        }
        excessive
    }

    /// Drop every identity idle for longer than window plus retention.
    ///
    /// Returns the number of identities removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let horizon = self.config.window + self.config.idle_retention;
        let mut removed = 0;
        self.windows.retain(|_, window| {
            let keep = window
                .back()
                .map_or(false, |last| now.saturating_duration_since(*last) <= horizon);
            if !keep {
                removed += 1;
            }
            keep
        });

        let remaining = self.windows.len();
        log_tracker_sweep(removed, remaining);
        metrics::gauge!("bot_detection_tracked_clients", remaining as f64);
        removed
    }

    /// Number of tracked identities
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Timestamps currently held for `identity`, as of its last record
    pub fn window_len(&self, identity: &ClientIdentity) -> usize {
        self.windows.get(identity).map_or(0, |window| window.len())
    }

    fn maybe_sweep(&self, now: Instant) {
        if self.config.sweep_every == 0 {
            return;
        }
        let count = self.records.fetch_add(1, Ordering::Relaxed) + 1;
        if count % self.config.sweep_every == 0 {
            self.sweep(now);
        }
    }

    fn make_room(&self) {
        if self.windows.len() < self.config.max_tracked_clients {
            return;
        }

        // Full: evict the least recently active of a small sample. Idle
        // identities are reclaimed by the sweeps, never here.
        let victim = self
            .windows
            .iter()
            .take(EVICTION_SAMPLE)
            .min_by_key(|entry| entry.value().back().copied())
            .map(|entry| entry.key().clone());
        if let Some(key) = victim {
            self.windows.remove(&key);
            tracing::debug!(ip = %key, event = "tracker_eviction");
        }
    }
}

impl Default for TrafficTracker {
    fn default() -> Self {
        Self::new(TrafficConfig::default())
    }
}

fn prune(window: &mut VecDeque<Instant>, now: Instant, span: Duration) {
    while let Some(oldest) = window.front() {
        if now.saturating_duration_since(*oldest) > span {
            window.pop_front();
        } else {
            break;
        }
    }
}
