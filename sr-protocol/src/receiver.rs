//! Receiver reorder buffer
//!
//! Buffers packets that arrive ahead of `expected` inside the receive window
//! `[expected, expected + WINDOWSIZE)` and hands payloads to the application
//! strictly in sequence order as gaps fill. Every accepted packet is
//! acknowledged individually so the sender can mark it selectively.

use crate::config::{ConfigError, ProtocolConfig};
use crate::context::Context;
use crate::packet::Packet;
use crate::sequence::{SeqNumber, SeqSpace};
use crate::stats::ReceiverStats;

/// What [`Receiver::on_packet`] did with a data packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Checksum mismatch; `expected - 1` was re-acknowledged
    Corrupted,
    /// Sequence number outside the receive window and the one behind it;
    /// `expected - 1` was re-acknowledged
    OutOfWindow,
    /// Already delivered; acknowledged again in case the first ack was lost
    Stale(SeqNumber),
    /// Already buffered; acknowledged again
    Duplicate(SeqNumber),
    /// Stored out of order, awaiting earlier packets
    Buffered(SeqNumber),
    /// `seq` was the expected packet; `count` payloads were delivered in total
    Delivered { seq: SeqNumber, count: u32 },
}

/// Receiving half of a Selective Repeat pair
pub struct Receiver {
    space: SeqSpace,
    /// Ring storage, `WINDOWSIZE` entries; `Some` means valid and undelivered
    slots: Vec<Option<Packet>>,
    /// Ring index of the slot for `expected`
    first: usize,
    /// Next in-order sequence number to deliver
    expected: SeqNumber,
    stats: ReceiverStats,
}

impl Receiver {
    /// Create a receiver from a validated configuration
    pub fn new(config: &ProtocolConfig) -> Result<Self, ConfigError> {
        Ok(Receiver::with_space(config.seq_space()?))
    }

    /// Create a receiver over an existing sequence space
    pub fn with_space(space: SeqSpace) -> Self {
        Receiver {
            space,
            slots: vec![None; space.window() as usize],
            first: 0,
            expected: SeqNumber::ZERO,
            stats: ReceiverStats::default(),
        }
    }

    /// Reset to expecting sequence number 0 with no buffered packets
    pub fn init(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.first = 0;
        self.expected = SeqNumber::ZERO;
        self.stats = ReceiverStats::default();
    }

    /// Process a data packet arriving from the sender
    pub fn on_packet(&mut self, ctx: &mut dyn Context, packet: &Packet) -> ReceiveOutcome {
        if packet.is_corrupted() {
            self.stats.corrupted += 1;
            tracing::debug!("corrupted packet received, re-acking last delivered");
            self.ack_last_delivered(ctx);
            return ReceiveOutcome::Corrupted;
        }

        let seq = match self.space.from_wire(packet.seqnum) {
            Some(seq) => seq,
            None => {
                self.stats.out_of_window += 1;
                self.ack_last_delivered(ctx);
                return ReceiveOutcome::OutOfWindow;
            }
        };
        self.stats.packets_received += 1;

        if !self.space.in_window(self.expected, seq) {
            if self.space.in_previous_window(self.expected, seq) {
                self.stats.duplicates += 1;
                tracing::debug!(seq = %seq, expected = %self.expected, "already delivered, re-acking");
                self.send_ack(ctx, seq);
                return ReceiveOutcome::Stale(seq);
            }
            self.stats.out_of_window += 1;
            tracing::debug!(seq = %seq, expected = %self.expected, "packet outside receive window");
            self.ack_last_delivered(ctx);
            return ReceiveOutcome::OutOfWindow;
        }

        let offset = self.space.offset(self.expected, seq);
        let outcome = if offset == 0 {
            tracing::debug!(seq = %seq, "packet received in order");
            self.deliver_head(ctx, *packet);
            let count = 1 + self.drain(ctx);
            ReceiveOutcome::Delivered { seq, count }
        } else {
            let idx = (self.first + offset as usize) % self.slots.len();
            if self.slots[idx].is_some() {
                self.stats.duplicates += 1;
                tracing::debug!(seq = %seq, "duplicate buffered packet");
                ReceiveOutcome::Duplicate(seq)
            } else {
                tracing::debug!(seq = %seq, expected = %self.expected, "buffering out-of-order packet");
                self.slots[idx] = Some(*packet);
                ReceiveOutcome::Buffered(seq)
            }
        };

        self.send_ack(ctx, seq);
        outcome
    }

    /// Deliver the packet for `expected` and advance the window by one
    fn deliver_head(&mut self, ctx: &mut dyn Context, packet: Packet) {
        ctx.deliver(packet.message());
        self.stats.packets_delivered += 1;
        self.slots[self.first] = None;
        self.first = (self.first + 1) % self.slots.len();
        self.expected = self.space.next(self.expected);
    }

    /// Deliver the contiguous buffered run now starting at `expected`
    fn drain(&mut self, ctx: &mut dyn Context) -> u32 {
        let mut delivered = 0;
        while let Some(packet) = self.slots[self.first].take() {
            tracing::trace!(seq = packet.seqnum, "delivering buffered packet");
            self.deliver_head(ctx, packet);
            delivered += 1;
        }
        delivered
    }

    fn send_ack(&mut self, ctx: &mut dyn Context, seq: SeqNumber) {
        ctx.transmit(Packet::ack(seq));
        self.stats.acks_sent += 1;
    }

    fn ack_last_delivered(&mut self, ctx: &mut dyn Context) {
        let last = self.space.prev(self.expected);
        self.send_ack(ctx, last);
    }

    /// Next in-order sequence number to deliver
    pub fn expected(&self) -> SeqNumber {
        self.expected
    }

    /// Number of packets buffered out of order
    pub fn buffered(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn stats(&self) -> &ReceiverStats {
        &self.stats
    }

    pub fn space(&self) -> SeqSpace {
        self.space
    }
}
