//! Process-wide request pacing
//!
//! Every outbound fetch, from every concurrent pipeline run, waits its turn
//! here. The last-fetch timestamp sits behind a single async mutex that is
//! held across the wait, so concurrent callers are served one at a time and
//! consecutive fetches are always at least `min_interval` apart.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Enforces a minimum gap between consecutive outbound fetches
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_fetch: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_fetch: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a fetch may start, then records the fetch time
    ///
    /// Dropping the returned future mid-wait (e.g., on cancellation) releases
    /// the lock without recording a fetch.
    pub async fn wait_turn(&self) {
        let mut last = self.last_fetch.lock().await;

        if let Some(delay) = Self::remaining(*last, self.min_interval, Instant::now()) {
            tracing::trace!("Pacing outbound fetch for {:?}", delay);
            tokio::time::sleep(delay).await;
        }

        *last = Some(Instant::now());
    }

    /// Time left before the next fetch is allowed, or None if it may start now
    fn remaining(last: Option<Instant>, min_interval: Duration, now: Instant) -> Option<Duration> {
        let elapsed = now.duration_since(last?);
        min_interval.checked_sub(elapsed).filter(|d| !d.is_zero())
    }
}
