//! Per-role protocol counters
//!
//! Counters are pure observation; nothing in the sender or receiver reads
//! them back to make a decision.

use serde::Serialize;

/// Sender statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SenderStats {
    /// Original transmissions of new packets
    pub packets_sent: u64,
    /// Retransmissions triggered by timeouts
    pub packets_resent: u64,
    /// Uncorrupted acknowledgments received
    pub acks_received: u64,
    /// Acknowledgments that marked a packet for the first time
    pub new_acks: u64,
    /// Acknowledgments for packets already marked
    pub duplicate_acks: u64,
    /// Acknowledgments outside the outstanding window
    pub stale_acks: u64,
    /// Acknowledgments dropped because of a checksum mismatch
    pub corrupted_acks: u64,
    /// Application messages rejected because the window was full
    pub window_full: u64,
    /// Timer expiries handled
    pub timeouts: u64,
}

/// Receiver statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReceiverStats {
    /// Uncorrupted data packets received, duplicates included
    pub packets_received: u64,
    /// Payloads handed to the application
    pub packets_delivered: u64,
    /// Packets already buffered or already delivered
    pub duplicates: u64,
    /// Packets outside both the receive window and the one behind it
    pub out_of_window: u64,
    /// Packets dropped because of a checksum mismatch
    pub corrupted: u64,
    /// Acknowledgments transmitted
    pub acks_sent: u64,
}
