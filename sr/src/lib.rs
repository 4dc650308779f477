//! Selective Repeat ARQ
//!
//! High-level crate bundling the protocol engine and the network emulator.

pub use sr_protocol as protocol;
pub use sr_sim as sim;

// Re-export commonly used types
pub use protocol::{Message, Packet, ProtocolConfig, Receiver, SeqNumber, Sender};
pub use sim::{NetworkConfig, Simulation, SimulationReport};
