//! Virtual time for the emulator
//!
//! Simulated time only advances when the event loop pops the next event.
//! One emulator time unit is one millisecond.

use serde::Serialize;
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// Length of one emulator time unit
pub const TIME_UNIT: Duration = Duration::from_millis(1);

/// Convert a (fractional) number of time units to a Duration
#[inline]
pub fn units(n: f64) -> Duration {
    TIME_UNIT.mul_f64(n)
}

/// Point in simulated time, measured from the start of the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SimTime(Duration);

impl SimTime {
    /// Start of the simulation
    pub const ZERO: SimTime = SimTime(Duration::ZERO);

    /// Create a time from an offset since the start of the run
    #[inline]
    pub fn from_duration(since_start: Duration) -> Self {
        SimTime(since_start)
    }

    /// Offset since the start of the run
    #[inline]
    pub fn since_start(&self) -> Duration {
        self.0
    }

    /// Time in emulator units
    #[inline]
    pub fn as_units(&self) -> f64 {
        self.0.as_secs_f64() / TIME_UNIT.as_secs_f64()
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.as_units())
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, duration: Duration) -> SimTime {
        SimTime(self.0 + duration)
    }
}

impl Sub for SimTime {
    type Output = Duration;

    fn sub(self, other: SimTime) -> Duration {
        self.0.saturating_sub(other.0)
    }
}
