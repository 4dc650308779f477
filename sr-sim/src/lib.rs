//! Selective Repeat network emulator
//!
//! A deterministic discrete-event environment for the protocol engine in
//! `sr-protocol`: a virtual clock, an unreliable link that loses, corrupts,
//! delays and optionally reorders frames, one-shot timers per role, and an
//! application message source.

pub mod clock;
pub mod network;
pub mod simulation;

pub use clock::{SimTime, TIME_UNIT};
pub use network::{DirectionStats, NetworkConfig, NetworkError};
pub use simulation::{LinkStats, Role, SimError, Simulation, SimulationReport};
