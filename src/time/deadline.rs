//! Cancellable Deadline Handles
//!
//! Every deferred action in the engine (dwell delay, hesitation check,
//! cooldown expiry, highlight auto-clear) is an explicit named `Deadline`
//! stored in the owning component's state. A state transition that
//! invalidates a timer must cancel its deadline in the same transition;
//! a stale deadline that fires anyway is the ghost-trigger bug class.

use super::instant::{Duration, Timestamp};

/// A named, cancellable deferred-callback handle.
///
/// A `Deadline` holds at most one pending fire time. Arming replaces any
/// previous fire time; cancelling clears it. `expire` is the single
/// consuming check: it disarms the handle and reports true exactly once
/// per armed period.
#[derive(Debug, Clone)]
pub struct Deadline {
    label: &'static str,
    fire_at: Option<Timestamp>,
}

impl Deadline {
    /// Create a disarmed deadline. The label identifies the timer in logs.
    pub const fn new(label: &'static str) -> Self {
        Self {
            label,
            fire_at: None,
        }
    }

    /// Timer label for diagnostics.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Arm (or re-arm) the deadline to fire `delay` after `now`.
    pub fn arm(&mut self, now: Timestamp, delay: Duration) {
        self.fire_at = Some(now + delay);
    }

    /// Cancel any pending fire.
    pub fn cancel(&mut self) {
        self.fire_at = None;
    }

    /// Whether a fire time is set (due or not).
    pub fn is_armed(&self) -> bool {
        self.fire_at.is_some()
    }

    /// Whether the deadline is armed and strictly in the future.
    pub fn is_pending(&self, now: Timestamp) -> bool {
        matches!(self.fire_at, Some(at) if at.is_after(now))
    }

    /// The pending fire time, if armed.
    pub fn fire_at(&self) -> Option<Timestamp> {
        self.fire_at
    }

    /// Consume the deadline if due: disarms and returns true when
    /// `now >= fire_at`, otherwise leaves the deadline armed.
    pub fn expire(&mut self, now: Timestamp) -> bool {
        match self.fire_at {
            Some(at) if !at.is_after(now) => {
                self.fire_at = None;
                true
            }
            _ => false,
        }
    }
}
