use std::time::Duration;

use tokio::time::Instant;

/// Token bucket pacing a single source's upstream calls.
///
/// Starts full. `capacity` 1 with a fixed refill interval degenerates to
/// plain minimum-interval pacing; larger capacities model burst windows
/// (e.g. 30 calls per 15 minutes).
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    refill_interval: Duration,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u32, refill_interval: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            refill_interval,
            tokens: capacity.max(1) as f64,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let earned = elapsed.as_secs_f64() / self.refill_interval.as_secs_f64();
        self.tokens = (self.tokens + earned).min(self.capacity as f64);
        self.last_refill = now;
    }

    /// Take one token, sleeping until one is available.
    pub async fn acquire(&mut self) {
        loop {
            self.refill();
            if self.tokens >= 1.0 {
                self.tokens -= 1.0;
                return;
            }
            let deficit = 1.0 - self.tokens;
            let wait = self.refill_interval.mul_f64(deficit);
            tokio::time::sleep(wait).await;
        }
    }
}
