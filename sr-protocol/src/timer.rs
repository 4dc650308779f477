//! Retransmission timer policy
//!
//! A sender owns exactly one timer. It is bound to the oldest unacknowledged
//! packet: armed when the window goes from empty to non-empty, restarted with
//! the full timeout after every new acknowledgment while packets remain
//! outstanding, and re-armed once per timeout batch. The remaining time of a
//! running timer is never carried over to the new oldest packet.

use crate::context::Context;
use std::time::Duration;

/// Tracks the state of the single timer a [`crate::Sender`] may hold
#[derive(Debug, Clone)]
pub struct RetransmitTimer {
    timeout: Duration,
    armed: bool,
}

impl RetransmitTimer {
    /// Create an idle timer
    pub fn new(timeout: Duration) -> Self {
        RetransmitTimer {
            timeout,
            armed: false,
        }
    }

    /// Timeout used every time the timer is armed
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether a timer is currently outstanding
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Arm the timer if it is idle
    ///
    /// Returns `false` if a timer was already outstanding; a second one is
    /// never started.
    pub fn arm(&mut self, ctx: &mut dyn Context) -> bool {
        if self.armed {
            return false;
        }
        ctx.start_timer(self.timeout);
        self.armed = true;
        true
    }

    /// Disarm the timer; no-op when idle
    pub fn disarm(&mut self, ctx: &mut dyn Context) {
        if self.armed {
            ctx.stop_timer();
            self.armed = false;
        }
    }

    /// Stop any outstanding timer and, if `outstanding`, start a fresh one
    pub fn restart(&mut self, ctx: &mut dyn Context, outstanding: bool) {
        self.disarm(ctx);
        if outstanding {
            self.arm(ctx);
        }
    }

    /// Record that the outstanding timer fired
    ///
    /// The environment has already discarded it, so no stop is issued.
    pub fn expired(&mut self) {
        self.armed = false;
    }

    /// Forget any outstanding timer without touching the environment
    pub fn reset(&mut self) {
        self.armed = false;
    }
}
