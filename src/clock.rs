use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type Sleep = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Time source for the simulated backend. Every delay in the store goes
/// through `sleep`, so a paused tokio clock drives the whole store in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&self, duration: Duration) -> Sleep;
}

#[derive(Debug, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) -> Sleep {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleep_follows_virtual_time() {
        let clock = TokioClock;
        let start = tokio::time::Instant::now();
        clock.sleep(Duration::from_millis(500)).await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
