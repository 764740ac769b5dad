use std::time::{Duration, Instant};

/// Timer gate that bounds the outgoing command rate independent of frame
/// rate.
///
/// The timestamp is an owned field and every time reference is injected, so
/// the gate is testable without a wall clock. The caller advances the gate
/// with [`record_dispatch`](DispatchThrottle::record_dispatch) after every
/// send attempt, succeeded or failed; a degraded link therefore never causes
/// an immediate retry, only a dropped command.
pub struct DispatchThrottle {
    interval: Duration,
    last_sent: Instant,
}

impl DispatchThrottle {
    /// New gate with `last_sent` initialized to `now`: the first dispatch
    /// happens one full interval after startup.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_sent: now,
        }
    }

    /// True when a full interval has elapsed since the last send attempt.
    pub fn ready(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_sent) >= self.interval
    }

    /// Advance the gate after a send attempt, regardless of its outcome.
    pub fn record_dispatch(&mut self, now: Instant) {
        self.last_sent = now;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
