//! Minimum-spacing limiter for outbound explorer calls.

use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serializes calls and keeps at least `interval` between the end of one
/// call and the start of the next.
///
/// The mutex guards the earliest instant the next call may start; it is held
/// for the whole wait-call-rearm sequence, so at most one call is in flight.
/// Waiters are served in FIFO order (tokio's mutex is fair). The deadline is
/// armed before the call starts, so a call abandoned mid-flight still holds
/// back the next one by at least `interval` from its start.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_call: Mutex<Instant>,
}

impl RateLimiter {
    /// A fresh limiter lets the first call through immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_call: Mutex::new(Instant::now()),
        }
    }

    /// Run `call` once the slot is free and the spacing has elapsed. The next
    /// deadline is armed when `call` starts and again when it completes,
    /// whatever its outcome.
    pub async fn run<F, Fut, T>(&self, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut next_call = self.next_call.lock().await;
        tokio::time::sleep_until(*next_call).await;
        *next_call = Instant::now() + self.interval;
        let out = call().await;
        *next_call = Instant::now() + self.interval;
        out
    }
}
