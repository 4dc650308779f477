//! Selective Repeat Protocol Core
//!
//! This crate implements the data-transfer engine of Selective-Repeat ARQ:
//! the packet checksum and wire format, the modulo sequence space, the
//! sender's window with selective acknowledgment and retransmission, the
//! receiver's reorder buffer, and the retransmission timer policy.
//!
//! Both roles are plain state machines. They perform no I/O of their own and
//! talk to the link, the timer facility and the application only through a
//! [`Context`].

pub mod config;
pub mod context;
pub mod packet;
pub mod receiver;
pub mod sender;
pub mod sequence;
pub mod stats;
pub mod timer;

pub use config::{ConfigError, ProtocolConfig};
pub use context::{Action, Context, Recorder};
pub use packet::{Message, Packet, PacketError, NOT_IN_USE, PACKET_SIZE, PAYLOAD_SIZE};
pub use receiver::{ReceiveOutcome, Receiver};
pub use sender::{AckOutcome, SendError, Sender};
pub use sequence::{SeqNumber, SeqSpace};
pub use stats::{ReceiverStats, SenderStats};
pub use timer::RetransmitTimer;
