//! Protocol configuration

use crate::sequence::SeqSpace;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default window size (`WINDOWSIZE`)
pub const DEFAULT_WINDOW_SIZE: u32 = 6;

/// Default sequence space size (`MAX_SEQ`)
pub const DEFAULT_MAX_SEQ: u32 = 16;

/// Default retransmission timeout, 16 time units of simulated time
pub const DEFAULT_TIMEOUT_MS: u64 = 16;

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Window size must be at least 1")]
    ZeroWindow,

    #[error("Sequence space {max_seq} must be at least twice the window size {window_size}")]
    SequenceSpaceTooSmall { max_seq: u32, window_size: u32 },

    #[error("Sequence space {0} does not fit the 32-bit wire fields")]
    SequenceSpaceTooLarge(u32),

    #[error("Retransmission timeout must be positive")]
    ZeroTimeout,
}

/// Window and timer parameters shared by a sender and receiver pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Maximum number of outstanding (sender) or buffered (receiver) packets
    pub window_size: u32,
    /// Size of the sequence number space
    pub max_seq: u32,
    /// Retransmission timeout in milliseconds of simulated time
    pub timeout_ms: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig {
            window_size: DEFAULT_WINDOW_SIZE,
            max_seq: DEFAULT_MAX_SEQ,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ProtocolConfig {
    /// Check the invariants the protocol relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.max_seq < self.window_size.saturating_mul(2) {
            return Err(ConfigError::SequenceSpaceTooSmall {
                max_seq: self.max_seq,
                window_size: self.window_size,
            });
        }
        if self.max_seq > i32::MAX as u32 {
            return Err(ConfigError::SequenceSpaceTooLarge(self.max_seq));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Validate and build the sequence space described by this configuration
    pub fn seq_space(&self) -> Result<SeqSpace, ConfigError> {
        self.validate()?;
        Ok(SeqSpace::new(self.max_seq, self.window_size))
    }

    /// Retransmission timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
