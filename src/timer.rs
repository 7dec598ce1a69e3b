//! Fall timer: a one-shot deadline the app loop waits on.

use std::time::{Duration, Instant};

/// One-shot timer. `reset` reschedules and discards any pending fire; firing disarms it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallTimer {
    deadline: Option<Instant>,
}

impl FallTimer {
    pub const fn stopped() -> Self {
        Self { deadline: None }
    }

    pub fn reset(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the timer fires; `None` while stopped.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// If the deadline has passed, disarm and return true.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
