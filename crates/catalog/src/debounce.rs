//! Search input debounce gate.
//!
//! Keystrokes are recorded with [`SearchDebouncer::input`]; only the most
//! recent term fires, once the input has been quiet for the debounce delay.
//! Timekeeping is passed in so the gate stays deterministic; async callers
//! drive it with their runtime clock.

use std::time::{Duration, Instant};

/// Quiet period before a search term is committed.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingSearch {
    term: String,
    deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<PendingSearch>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record new input, superseding any pending term and restarting the timer.
    pub fn input(&mut self, term: impl Into<String>, now: Instant) {
        self.pending = Some(PendingSearch {
            term: term.into(),
            deadline: now + self.delay,
        });
    }

    /// When the pending term becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending term if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some(p) if p.deadline <= now => self.pending.take().map(|p| p.term),
            _ => None,
        }
    }

    /// Take the pending term immediately (e.g. the user pressed "search").
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|p| p.term)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
