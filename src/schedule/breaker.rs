use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::model::SourceKind;

const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed,
    Open { since: Instant },
    HalfOpen,
}

/// Per-source three-state circuit breaker.
///
/// Closed counts consecutive failures and opens at the threshold. Open
/// fast-fails until the reset timeout elapses on a monotonic clock, then
/// half-open admits a single probe: success closes, failure re-opens.
#[derive(Debug)]
pub struct CircuitBreaker {
    source: SourceKind,
    failure_threshold: u32,
    reset_timeout: Duration,
    failure_count: u32,
    state: BreakerState,
}

impl CircuitBreaker {
    pub fn new(source: SourceKind, failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            source,
            failure_threshold,
            reset_timeout,
            failure_count: 0,
            state: BreakerState::Closed,
        }
    }

    pub fn with_defaults(source: SourceKind) -> Self {
        Self::new(source, DEFAULT_FAILURE_THRESHOLD, DEFAULT_RESET_TIMEOUT)
    }

    /// Whether a call may proceed right now. Transitions open → half-open
    /// when the reset timeout has elapsed.
    pub fn check(&mut self) -> bool {
        match self.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open { since } => {
                if since.elapsed() >= self.reset_timeout {
                    info!(source = %self.source, "circuit breaker half-open, allowing probe");
                    self.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&mut self) {
        if self.state == BreakerState::HalfOpen {
            info!(source = %self.source, "circuit breaker closed after successful probe");
        }
        self.state = BreakerState::Closed;
        self.failure_count = 0;
    }

    pub fn record_failure(&mut self) {
        match self.state {
            BreakerState::HalfOpen => {
                warn!(source = %self.source, "probe failed, circuit breaker re-opened");
                self.state = BreakerState::Open {
                    since: Instant::now(),
                };
            }
            BreakerState::Closed => {
                self.failure_count += 1;
                if self.failure_count >= self.failure_threshold {
                    warn!(
                        source = %self.source,
                        failures = self.failure_count,
                        "failure threshold reached, circuit breaker opened"
                    );
                    self.state = BreakerState::Open {
                        since: Instant::now(),
                    };
                }
            }
            BreakerState::Open { .. } => {}
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, BreakerState::Open { .. })
    }
}
