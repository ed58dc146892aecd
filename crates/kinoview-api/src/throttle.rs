//! Minimum-interval request throttle for the TMDB client.

use std::time::{Duration, Instant};

/// Spaces consecutive requests at least `min_interval` apart.
///
/// TMDB allows roughly 40 requests per second. `TmdbClient` holds one of
/// these behind a `tokio::sync::Mutex`; identity calls are user-driven and
/// go unthrottled.
#[derive(Debug)]
pub(crate) struct RequestThrottle {
    /// Minimum interval between requests.
    min_interval: Duration,
    /// When the previous request was released.
    last_release: Option<Instant>,
}

impl RequestThrottle {
    /// Creates a throttle with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_release: None,
        }
    }

    /// Sleeps until the next request may go out, then records the release.
    pub(crate) async fn acquire(&mut self) {
        if let Some(last) = self.last_release {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval.saturating_sub(elapsed)).await;
            }
        }

        self.last_release = Some(Instant::now());
    }
}
