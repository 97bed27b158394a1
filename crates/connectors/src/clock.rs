//! Injectable time source
//!
//! Rate-limit suspension and retry backoff depend on wall-clock time; the
//! paginator takes a [`Clock`] so tests can simulate elapsed time without
//! real waiting.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Time source for the paginator and connectors
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;

    /// Sleep for a duration
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleep until an absolute instant; returns immediately if already past
pub async fn sleep_until<C: Clock>(clock: &C, until: DateTime<Utc>) {
    let now = clock.now();
    if let Ok(remaining) = (until - now).to_std() {
        clock.sleep(remaining).await;
    }
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        (**self).sleep(duration)
    }
}

/// Real wall clock backed by tokio's timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
