//! Sender window manager
//!
//! Holds up to `WINDOWSIZE` in-flight packets in a ring of slots. Slot
//! positions are counted from a head index that moves with the window base,
//! so the ring works for any `MAX_SEQ >= 2 * WINDOWSIZE`, not only multiples
//! of the window size.
//!
//! Acknowledgments are selective: any outstanding slot may be marked acked,
//! but the base only advances over a contiguous run of acked slots starting
//! at the oldest one. On timeout only the slots that are still unacked are
//! sent again.

use crate::config::{ConfigError, ProtocolConfig};
use crate::context::Context;
use crate::packet::{Message, Packet};
use crate::sequence::{SeqNumber, SeqSpace};
use crate::stats::SenderStats;
use crate::timer::RetransmitTimer;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to the application by [`Sender::admit`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    #[error("Send window is full")]
    WindowFull,
}

/// What [`Sender::on_ack`] did with an acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// Checksum mismatch, dropped
    Corrupted,
    /// Ack number names no outstanding packet
    OutOfWindow,
    /// The packet was already marked acked
    Duplicate(SeqNumber),
    /// The packet was marked acked; `released` slots were freed from the base
    New { seq: SeqNumber, released: u32 },
}

#[derive(Debug, Clone)]
struct SenderSlot {
    packet: Packet,
    sent: bool,
    acked: bool,
}

/// Sending half of a Selective Repeat pair
pub struct Sender {
    space: SeqSpace,
    /// Ring storage, `WINDOWSIZE` entries
    slots: Vec<Option<SenderSlot>>,
    /// Ring index of the slot holding `base`
    first: usize,
    /// Oldest unacknowledged sequence number
    base: SeqNumber,
    /// Next sequence number to assign
    next: SeqNumber,
    /// Occupied slots
    count: u32,
    timer: RetransmitTimer,
    stats: SenderStats,
}

impl Sender {
    /// Create a sender from a validated configuration
    pub fn new(config: &ProtocolConfig) -> Result<Self, ConfigError> {
        Ok(Sender::with_space(config.seq_space()?, config.timeout()))
    }

    /// Create a sender over an existing sequence space
    pub fn with_space(space: SeqSpace, timeout: Duration) -> Self {
        Sender {
            space,
            slots: vec![None; space.window() as usize],
            first: 0,
            base: SeqNumber::ZERO,
            next: SeqNumber::ZERO,
            count: 0,
            timer: RetransmitTimer::new(timeout),
            stats: SenderStats::default(),
        }
    }

    /// Reset to sequence number 0 with an empty window
    ///
    /// Any outstanding timer is forgotten; the caller restarts the
    /// environment alongside.
    pub fn init(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.first = 0;
        self.base = SeqNumber::ZERO;
        self.next = SeqNumber::ZERO;
        self.count = 0;
        self.timer.reset();
        self.stats = SenderStats::default();
    }

    #[inline]
    fn index(&self, offset: u32) -> usize {
        (self.first + offset as usize) % self.slots.len()
    }

    /// Accept a message from the application and transmit it
    ///
    /// Fails with [`SendError::WindowFull`] without any I/O when `WINDOWSIZE`
    /// packets are already outstanding. The message is not queued.
    pub fn admit(
        &mut self,
        ctx: &mut dyn Context,
        message: &Message,
    ) -> Result<SeqNumber, SendError> {
        if self.is_window_full() {
            self.stats.window_full += 1;
            tracing::debug!(base = %self.base, count = self.count, "send window is full");
            return Err(SendError::WindowFull);
        }

        let seq = self.next;
        let packet = Packet::data(seq, message);
        let idx = self.index(self.count);
        self.slots[idx] = Some(SenderSlot {
            packet,
            sent: true,
            acked: false,
        });

        tracing::debug!(seq = %seq, "sending packet");
        ctx.transmit(packet);
        self.stats.packets_sent += 1;

        self.count += 1;
        self.next = self.space.next(seq);

        if self.count == 1 {
            self.timer.arm(ctx);
        }

        Ok(seq)
    }

    /// Process an acknowledgment arriving from the receiver
    pub fn on_ack(&mut self, ctx: &mut dyn Context, packet: &Packet) -> AckOutcome {
        if packet.is_corrupted() {
            self.stats.corrupted_acks += 1;
            tracing::debug!("corrupted ack received, ignoring");
            return AckOutcome::Corrupted;
        }
        self.stats.acks_received += 1;

        let seq = match self.space.from_wire(packet.acknum) {
            Some(seq) if self.space.in_range(self.base, self.count, seq) => seq,
            _ => {
                self.stats.stale_acks += 1;
                tracing::trace!(ack = packet.acknum, base = %self.base, "ack outside window");
                return AckOutcome::OutOfWindow;
            }
        };

        let idx = self.index(self.space.offset(self.base, seq));
        let slot = match self.slots[idx].as_mut() {
            Some(slot) => slot,
            None => {
                self.stats.stale_acks += 1;
                return AckOutcome::OutOfWindow;
            }
        };

        if slot.acked {
            self.stats.duplicate_acks += 1;
            tracing::debug!(ack = %seq, "duplicate ack");
            return AckOutcome::Duplicate(seq);
        }

        slot.acked = true;
        self.stats.new_acks += 1;
        tracing::debug!(ack = %seq, "new ack");

        let released = self.slide();
        self.timer.restart(ctx, self.count > 0);

        AckOutcome::New { seq, released }
    }

    /// Free acked slots from the base and advance the window
    fn slide(&mut self) -> u32 {
        let mut released = 0;
        while self.count > 0 {
            match &self.slots[self.first] {
                Some(slot) if slot.acked => {}
                _ => break,
            }
            self.slots[self.first] = None;
            self.first = (self.first + 1) % self.slots.len();
            self.base = self.space.next(self.base);
            self.count -= 1;
            released += 1;
        }
        if released > 0 {
            tracing::trace!(base = %self.base, count = self.count, "window slid");
        }
        released
    }

    /// Handle expiry of the retransmission timer
    ///
    /// Resends every slot in `[base, base + count)` that was sent but not
    /// acked, then arms one timer for the batch. Returns the number of
    /// packets resent.
    pub fn on_timeout(&mut self, ctx: &mut dyn Context) -> usize {
        self.timer.expired();
        self.stats.timeouts += 1;
        tracing::debug!(base = %self.base, count = self.count, "timeout, resending unacked packets");

        let mut resent = 0;
        for offset in 0..self.count {
            let idx = self.index(offset);
            if let Some(slot) = &self.slots[idx] {
                if slot.sent && !slot.acked {
                    tracing::debug!(seq = slot.packet.seqnum, "resending packet");
                    ctx.transmit(slot.packet);
                    self.stats.packets_resent += 1;
                    resent += 1;
                }
            }
        }

        if resent > 0 {
            self.timer.arm(ctx);
        }
        resent
    }

    /// Oldest unacknowledged sequence number
    pub fn base(&self) -> SeqNumber {
        self.base
    }

    /// Sequence number the next admitted message will get
    pub fn next_seq(&self) -> SeqNumber {
        self.next
    }

    /// Number of occupied window slots
    pub fn in_flight(&self) -> u32 {
        self.count
    }

    pub fn is_window_full(&self) -> bool {
        self.count as usize == self.slots.len()
    }

    /// Whether `seq` is outstanding and marked acked
    ///
    /// Returns `None` if `seq` is not in `[base, base + count)`.
    pub fn is_acked(&self, seq: SeqNumber) -> Option<bool> {
        if !self.space.in_range(self.base, self.count, seq) {
            return None;
        }
        let idx = self.index(self.space.offset(self.base, seq));
        self.slots[idx].as_ref().map(|slot| slot.acked)
    }

    /// Whether the retransmission timer is outstanding
    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }

    pub fn space(&self) -> SeqSpace {
        self.space
    }
}
