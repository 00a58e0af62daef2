//! Caller-driven save coalescing.
//!
//! The debouncer owns no thread or timer. Callers pass the current
//! [`Instant`] in and poll for due values, which keeps it deterministic under
//! test.

use std::time::{Duration, Instant};

/// Idle delay used by project sessions.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(500);

/// Holds at most one pending value until it has been idle for `delay`.
#[derive(Debug, Clone)]
pub struct SaveDebouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Default for SaveDebouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DELAY)
    }
}

impl<T> SaveDebouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value and restarts the delay from `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Takes the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// The pending value once its deadline has passed, left in place.
    ///
    /// Callers that may fail to persist it peek here and [`cancel`] only
    /// after the write succeeded.
    ///
    /// [`cancel`]: SaveDebouncer::cancel
    pub fn due(&self, now: Instant) -> Option<&T> {
        match &self.pending {
            Some((value, deadline)) if now >= *deadline => Some(value),
            _ => None,
        }
    }

    /// The pending value regardless of its deadline, left in place.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }

    /// Drops the pending value. Returns whether one was dropped.
    ///
    /// Safe to call repeatedly and after the value already fired.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}
