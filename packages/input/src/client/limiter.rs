//! Token-bucket rate limiter shared by every request of an input instance.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Gates calls at a configured steady rate with a small burst allowance.
///
/// One limiter is created per input instance and shared across all chain
/// steps and all cycles; it is never recreated per cycle. `acquire` waits,
/// it never rejects — bounding the wait is the caller's timeout's job.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Option<Duration>,
    burst: f64,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    tokens: f64,
    updated: Instant,
}

impl RateLimiter {
    /// `limit` is the steady rate in requests per second; `None` or a
    /// non-positive value disables gating. `burst` is clamped to at least 1.
    pub fn new(limit: Option<f64>, burst: u32) -> Self {
        let interval = limit
            .filter(|limit| *limit > 0.0)
            .map(|limit| Duration::from_secs_f64(1.0 / limit));
        let burst = f64::from(burst.max(1));
        Self {
            interval,
            burst,
            state: Mutex::new(State {
                tokens: burst,
                updated: Instant::now(),
            }),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None, 1)
    }

    /// Waits until a token is available, then consumes it.
    pub async fn acquire(&self) {
        let Some(interval) = self.interval else {
            return;
        };
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(state.updated);
                let refill = elapsed.as_secs_f64() / interval.as_secs_f64();
                state.tokens = (state.tokens + refill).min(self.burst);
                state.updated = now;
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                interval.mul_f64(1.0 - state.tokens)
            };
            tokio::time::sleep(wait).await;
        }
    }
}
