//! Sequence Number Handling
//!
//! Selective Repeat numbers packets in a small modulo space of size `MAX_SEQ`.
//! A [`SeqSpace`] carries the modulus together with the window size and
//! answers the window-membership questions both peers need. Sequence numbers
//! are never compared with plain integer ordering, only by their distance
//! inside the space.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence number within a [`SeqSpace`]
///
/// The raw value is always in `[0, max_seq)` of the space that produced it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SeqNumber(u32);

impl SeqNumber {
    /// Initial sequence number of both roles
    pub const ZERO: SeqNumber = SeqNumber(0);

    /// Get the raw sequence number value
    #[inline]
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Value as carried in the `seqnum`/`acknum` wire fields
    #[inline]
    pub fn as_wire(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Debug for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeqNumber({})", self.0)
    }
}

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SeqNumber> for u32 {
    fn from(seq: SeqNumber) -> u32 {
        seq.0
    }
}

/// Modulo sequence space shared by a sender and receiver pair
///
/// Requires `max_seq >= 2 * window` so that a sequence number that has wrapped
/// can never be mistaken for one that is still legitimately outstanding.
/// [`crate::ProtocolConfig::validate`] enforces this before a space is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqSpace {
    max_seq: u32,
    window: u32,
}

impl SeqSpace {
    /// Create a sequence space
    ///
    /// # Panics
    /// Panics if `window` is zero or `max_seq < 2 * window`
    pub fn new(max_seq: u32, window: u32) -> Self {
        assert!(window > 0, "window size must be positive");
        assert!(
            max_seq >= window.saturating_mul(2),
            "sequence space {} is smaller than twice the window {}",
            max_seq,
            window
        );
        SeqSpace { max_seq, window }
    }

    /// Size of the sequence space (`MAX_SEQ`)
    #[inline]
    pub fn max_seq(&self) -> u32 {
        self.max_seq
    }

    /// Window size (`WINDOWSIZE`)
    #[inline]
    pub fn window(&self) -> u32 {
        self.window
    }

    /// Build a sequence number, reducing the value into the space
    #[inline]
    pub fn seq(&self, value: u32) -> SeqNumber {
        SeqNumber(value % self.max_seq)
    }

    /// Interpret a wire field as a sequence number of this space
    ///
    /// Returns `None` for negative values (including `NOTINUSE`) and values
    /// outside `[0, max_seq)`.
    pub fn from_wire(&self, value: i32) -> Option<SeqNumber> {
        u32::try_from(value)
            .ok()
            .filter(|&v| v < self.max_seq)
            .map(SeqNumber)
    }

    /// The sequence number following `seq`
    #[inline]
    pub fn next(&self, seq: SeqNumber) -> SeqNumber {
        self.add(seq, 1)
    }

    /// The sequence number preceding `seq`
    #[inline]
    pub fn prev(&self, seq: SeqNumber) -> SeqNumber {
        SeqNumber((seq.0 + self.max_seq - 1) % self.max_seq)
    }

    /// Advance `seq` by `n` steps
    #[inline]
    pub fn add(&self, seq: SeqNumber, n: u32) -> SeqNumber {
        SeqNumber(((seq.0 as u64 + n as u64) % self.max_seq as u64) as u32)
    }

    /// Forward distance from `from` to `to`, in `[0, max_seq)`
    #[inline]
    pub fn offset(&self, from: SeqNumber, to: SeqNumber) -> u32 {
        (to.0 + self.max_seq - from.0) % self.max_seq
    }

    /// Check whether `seq` lies in `[base, base + len)` modulo `max_seq`
    #[inline]
    pub fn in_range(&self, base: SeqNumber, len: u32, seq: SeqNumber) -> bool {
        self.offset(base, seq) < len
    }

    /// Check whether `seq` lies in the window `[base, base + WINDOWSIZE)`
    #[inline]
    pub fn in_window(&self, base: SeqNumber, seq: SeqNumber) -> bool {
        self.in_range(base, self.window, seq)
    }

    /// Check whether `seq` lies in the window just behind `base`,
    /// `[base - WINDOWSIZE, base)`
    pub fn in_previous_window(&self, base: SeqNumber, seq: SeqNumber) -> bool {
        let offset = self.offset(seq, base);
        offset >= 1 && offset <= self.window
    }
}
