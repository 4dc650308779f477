//! Packet Structures, Checksum and Serialization
//!
//! A packet carries a sequence number, an acknowledgment number, an additive
//! checksum and a fixed 20-byte payload. Data packets leave `acknum` set to
//! [`NOT_IN_USE`]; acknowledgments leave `seqnum` set to it.
//!
//! Wire layout (32 bytes, big-endian):
//!
//! | Offset | Field    | Type     |
//! |--------|----------|----------|
//! | 0      | seqnum   | i32      |
//! | 4      | acknum   | i32      |
//! | 8      | checksum | i32      |
//! | 12     | payload  | [u8; 20] |

use crate::sequence::SeqNumber;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use thiserror::Error;

/// Size of the application payload carried by every packet
pub const PAYLOAD_SIZE: usize = 20;

/// Size of an encoded packet in bytes
pub const PACKET_SIZE: usize = 12 + PAYLOAD_SIZE;

/// Reserved `seqnum`/`acknum` value meaning "this field carries nothing"
pub const NOT_IN_USE: i32 = -1;

/// Filler byte for the payload of pure acknowledgments
const ACK_FILLER: u8 = b'0';

/// Packet decoding errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PacketError {
    #[error("Packet too short: expected 32 bytes, got {0}")]
    Truncated(usize),

    #[error("Trailing data after packet: {0} extra bytes")]
    TrailingData(usize),
}

/// Application message: exactly [`PAYLOAD_SIZE`] opaque bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Message([u8; PAYLOAD_SIZE]);

impl Message {
    /// Wrap a payload
    pub fn new(data: [u8; PAYLOAD_SIZE]) -> Self {
        Message(data)
    }

    /// Build a message from a slice, truncating or zero-padding to size
    pub fn from_slice(data: &[u8]) -> Self {
        let mut payload = [0u8; PAYLOAD_SIZE];
        let len = data.len().min(PAYLOAD_SIZE);
        payload[..len].copy_from_slice(&data[..len]);
        Message(payload)
    }

    /// Message whose payload is one byte repeated
    pub fn filled(byte: u8) -> Self {
        Message([byte; PAYLOAD_SIZE])
    }

    /// Get the payload bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; PAYLOAD_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl From<[u8; PAYLOAD_SIZE]> for Message {
    fn from(data: [u8; PAYLOAD_SIZE]) -> Self {
        Message(data)
    }
}

/// Compute the additive checksum of the given fields
///
/// Sum of `seqnum`, `acknum` and every payload byte taken as an unsigned
/// value. Wrapping arithmetic keeps arbitrary (possibly damaged) field values
/// from overflowing.
pub fn checksum(seqnum: i32, acknum: i32, payload: &[u8; PAYLOAD_SIZE]) -> i32 {
    payload
        .iter()
        .fold(seqnum.wrapping_add(acknum), |sum, &b| sum.wrapping_add(b as i32))
}

/// A data or acknowledgment packet
///
/// Fields are public so that the channel can damage them; a packet built by
/// [`Packet::data`] or [`Packet::ack`] always carries a matching checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub seqnum: i32,
    pub acknum: i32,
    pub checksum: i32,
    pub payload: [u8; PAYLOAD_SIZE],
}

impl Packet {
    /// Build a checksummed packet from raw field values
    pub fn new(seqnum: i32, acknum: i32, payload: [u8; PAYLOAD_SIZE]) -> Self {
        Packet {
            seqnum,
            acknum,
            checksum: checksum(seqnum, acknum, &payload),
            payload,
        }
    }

    /// Build a data packet carrying `message`
    pub fn data(seq: SeqNumber, message: &Message) -> Self {
        Packet::new(seq.as_wire(), NOT_IN_USE, *message.as_bytes())
    }

    /// Build a pure acknowledgment for `ack`
    pub fn ack(ack: SeqNumber) -> Self {
        Packet::new(NOT_IN_USE, ack.as_wire(), [ACK_FILLER; PAYLOAD_SIZE])
    }

    /// Recompute the checksum over the current field values
    #[inline]
    pub fn compute_checksum(&self) -> i32 {
        checksum(self.seqnum, self.acknum, &self.payload)
    }

    /// Check whether the stored checksum disagrees with the fields
    #[inline]
    pub fn is_corrupted(&self) -> bool {
        self.checksum != self.compute_checksum()
    }

    /// Payload as an application message
    #[inline]
    pub fn message(&self) -> Message {
        Message(self.payload)
    }

    /// Serialize to the 32-byte wire format
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(PACKET_SIZE);
        buf.put_i32(self.seqnum);
        buf.put_i32(self.acknum);
        buf.put_i32(self.checksum);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Deserialize from the wire format
    ///
    /// The checksum is carried through untouched; use [`Packet::is_corrupted`]
    /// to validate it.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() < PACKET_SIZE {
            return Err(PacketError::Truncated(data.len()));
        }
        if data.len() > PACKET_SIZE {
            return Err(PacketError::TrailingData(data.len() - PACKET_SIZE));
        }

        let mut buf = data;
        let seqnum = buf.get_i32();
        let acknum = buf.get_i32();
        let checksum = buf.get_i32();
        let mut payload = [0u8; PAYLOAD_SIZE];
        buf.copy_to_slice(&mut payload);

        Ok(Packet {
            seqnum,
            acknum,
            checksum,
            payload,
        })
    }
}
