//! Selective Repeat CLI Library
//!
//! Shared functionality for the simulator command-line tool.

pub mod config;
pub mod stats;

pub use config::{Config, ConfigError};
pub use stats::{display_report, format_percent, format_sim_time};
