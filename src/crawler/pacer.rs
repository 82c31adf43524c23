//! Run-wide request pacing
//!
//! Every outbound request, retries included, goes through one [`Pacer`], which
//! keeps the origin idle for at least the pacing interval between the end of
//! one request and the start of the next. Because the pipeline never fetches
//! in parallel, this is the only rate limiting the origin server sees.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Enforces a minimum idle interval between consecutive requests
#[derive(Debug)]
pub struct Pacer {
    /// Minimum time from the end of one request to the start of the next
    min_interval: Duration,

    /// When the most recent request finished, or started if still in flight
    last_activity: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Creates a pacer; the first request is never delayed
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_activity: Mutex::new(None),
        }
    }

    /// Returns the configured interval
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a request may start, then records it as started
    ///
    /// The wait is measured from the last [`Pacer::finish`], so a slow
    /// response does not eat into the next request's delay.
    ///
    /// # Returns
    ///
    /// The instant the caller is cleared to send its request
    pub async fn wait(&self) -> Instant {
        let mut last_activity = self.last_activity.lock().await;

        if let Some(previous) = *last_activity {
            let remaining = time_until_ready(previous, self.min_interval, Instant::now());
            if !remaining.is_zero() {
                tracing::trace!("Pacing: waiting {:?} before next request", remaining);
                tokio::time::sleep(remaining).await;
            }
        }

        let started = Instant::now();
        *last_activity = Some(started);
        started
    }

    /// Records that the request cleared by the last [`Pacer::wait`] finished
    pub async fn finish(&self) {
        *self.last_activity.lock().await = Some(Instant::now());
    }
}

/// Time left before `interval` has passed since `previous`
fn time_until_ready(previous: Instant, interval: Duration, now: Instant) -> Duration {
    (previous + interval).saturating_duration_since(now)
}
