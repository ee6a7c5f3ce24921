//! Trailing-edge debounce for re-synthesis notifications.
//!
//! Structural edits come in bursts; collaborators that consume the HTML
//! form only need the state after the last edit of a burst. Scheduling
//! supersedes any earlier pending notification, so intermediate states are
//! discarded without ever being synthesized. Single-threaded and
//! caller-pumped: nothing fires on its own.

use std::time::{Duration, Instant};

/// Delay between the last scheduled edit and the notification firing.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Trailing-edge debounce over explicit instants.
pub struct ResynthDebounce {
    delay: Duration,
    pending_since: Option<Instant>,
}

impl ResynthDebounce {
    /// Debounce with the default delay.
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_DELAY)
    }

    /// Debounce with a custom delay.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            pending_since: None,
        }
    }

    /// Schedule a notification, superseding any pending one.
    pub fn schedule(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    /// True when a notification is scheduled but has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Consume the pending notification if its delay has elapsed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.duration_since(since) >= self.delay => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending notification without firing it.
    pub fn cancel(&mut self) {
        self.pending_since = None;
    }
}

impl Default for ResynthDebounce {
    fn default() -> Self {
        Self::new()
    }
}
