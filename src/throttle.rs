//! Time-windowed admission gate for filter text.
//!
//! [`Throttle`] is a plain state machine: it never sleeps or spawns.  Callers
//! ask it what to emit *now* and when to come back.  Time comes from a
//! [`Clock`], so the async driver in [`crate::filter`] uses tokio's clock
//! (controllable with `tokio::time::pause`) while unit tests use a manual one.

use std::time::Duration;

use tokio::time::Instant;

/// Default spacing between two filter values reaching the pipeline.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);

/// Source of "now" for time-based operators.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Tokio's clock.  Honours `tokio::time::pause` / `advance` in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Passes at most one value per `interval`.
///
/// The first value after a quiet period goes straight through.  Values that
/// arrive too soon replace one another, and the latest is released once the
/// interval since the previous emission has elapsed.
#[derive(Debug)]
pub struct Throttle<T, C = TokioClock> {
    interval: Duration,
    clock: C,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T, C: Clock> Throttle<T, C> {
    pub fn new(interval: Duration, clock: C) -> Self {
        Self {
            interval,
            clock,
            last_emit: None,
            pending: None,
        }
    }

    /// Submit a value.  Returns it if it may be emitted right away.
    pub fn offer(&mut self, value: T) -> Option<T> {
        let now = self.clock.now();
        match self.last_emit {
            Some(last) if now < last + self.interval => {
                self.pending = Some(value);
                None
            }
            _ => {
                self.pending = None;
                self.last_emit = Some(now);
                Some(value)
            }
        }
    }

    /// When the pending value becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        match (&self.pending, self.last_emit) {
            (Some(_), Some(last)) => Some(last + self.interval),
            _ => None,
        }
    }

    /// Release the pending value if its deadline has passed.
    pub fn poll_due(&mut self) -> Option<T> {
        let deadline = self.deadline()?;
        let now = self.clock.now();
        if now < deadline {
            return None;
        }
        self.last_emit = Some(now);
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
