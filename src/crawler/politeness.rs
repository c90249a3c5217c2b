//! Per-host politeness delays
//!
//! Tracks when each host may next be fetched and suspends callers until
//! their turn. The effective delay for a host is the larger of the
//! configured default and the host's robots.txt crawl-delay.

use crate::robots::RobotsCache;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Serializes fetches per host so consecutive fetch starts are spaced by at
/// least the host's delay
///
/// Callers atomically *reserve* the next fetch-start instant under one lock:
/// `reserved = max(now, previous_reservation + delay)`. Two workers
/// targeting the same host therefore can never both observe a stale
/// "already past the delay" window, no matter how the scheduler interleaves
/// them.
pub struct PolitenessController {
    default_delay: Duration,
    robots: Arc<RobotsCache>,
    next_start: Mutex<HashMap<String, Instant>>,
}

impl PolitenessController {
    pub fn new(default_delay: Duration, robots: Arc<RobotsCache>) -> Self {
        Self {
            default_delay,
            robots,
            next_start: Mutex::new(HashMap::new()),
        }
    }

    /// Effective delay for a host: `max(default, robots crawl-delay)`
    pub async fn delay_for(&self, host: &str) -> Duration {
        let rules = self.robots.resolve(host).await;
        rules
            .crawl_delay
            .map_or(self.default_delay, |robots_delay| {
                robots_delay.max(self.default_delay)
            })
    }

    /// Suspends the caller until the host's delay window has passed
    ///
    /// Returns once the caller holds the host's next fetch slot. The first
    /// caller for a host proceeds immediately.
    pub async fn wait_for_turn(&self, host: &str) {
        let delay = self.delay_for(host).await;

        let reserved = {
            let mut next_start = self.next_start.lock().unwrap();
            let now = Instant::now();
            let reserved = match next_start.get(host) {
                Some(previous) => now.max(*previous + delay),
                None => now,
            };
            next_start.insert(host.to_string(), reserved);
            reserved
        };

        let now = Instant::now();
        if reserved > now {
            tracing::trace!(
                "Politeness wait of {:?} before fetching from {}",
                reserved - now,
                host
            );
            tokio::time::sleep_until(reserved).await;
        }
    }

    /// Number of hosts with a recorded fetch slot
    pub fn tracked_hosts(&self) -> usize {
        self.next_start.lock().unwrap().len()
    }
}
