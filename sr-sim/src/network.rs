//! Unreliable link model
//!
//! Every packet handed to the link is encoded to its wire frame and then put
//! through a fault model:
//!
//! | Fault      | Description                                              |
//! |------------|----------------------------------------------------------|
//! | Loss       | Drop the frame with probability `loss`.                  |
//! | Corruption | Damage one field with probability `corrupt`.             |
//! | Delay      | Arrive `1 + 9 * U(0, 1)` time units later.               |
//! | Reordering | Unless `reorder` is set, never overtake the previous     |
//! |            | frame in the same direction.                             |

use crate::clock::{units, SimTime};
use bytes::{Bytes, BytesMut};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sr_protocol::PACKET_SIZE;
use thiserror::Error;

/// Value written over a damaged sequence or acknowledgment field
const DAMAGED_FIELD: i32 = 999_999;

/// Byte written over the first payload byte of a damaged frame
const DAMAGED_BYTE: u8 = b'Z';

/// Payload offset inside a wire frame
const PAYLOAD_OFFSET: usize = 12;

/// Network configuration errors
#[derive(Error, Debug, PartialEq)]
pub enum NetworkError {
    #[error("Probability {name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("Mean time between messages must be positive, got {0}")]
    InvalidLambda(f64),

    #[error("Time limit must be positive, got {0}")]
    InvalidMaxTime(f64),
}

/// Parameters of the emulated network and application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Number of application messages to generate
    pub messages: u64,
    /// Probability that a frame is lost
    pub loss: f64,
    /// Probability that a frame is corrupted
    pub corrupt: f64,
    /// Mean time between application messages, in time units
    pub lambda: f64,
    /// Allow frames to overtake each other
    pub reorder: bool,
    /// RNG seed
    pub seed: u64,
    /// Stop the run once simulated time passes this many time units
    pub max_time: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            messages: 20,
            loss: 0.0,
            corrupt: 0.0,
            lambda: 10.0,
            reorder: false,
            seed: 1234,
            max_time: 1_000_000.0,
        }
    }
}

impl NetworkConfig {
    /// Check probabilities and timing parameters
    pub fn validate(&self) -> Result<(), NetworkError> {
        for (name, value) in [("loss", self.loss), ("corrupt", self.corrupt)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(NetworkError::InvalidProbability { name, value });
            }
        }
        if !(self.lambda > 0.0) || !self.lambda.is_finite() {
            return Err(NetworkError::InvalidLambda(self.lambda));
        }
        if !(self.max_time > 0.0) || !self.max_time.is_finite() {
            return Err(NetworkError::InvalidMaxTime(self.max_time));
        }
        Ok(())
    }
}

/// Counters for one direction of the link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectionStats {
    pub frames: u64,
    pub lost: u64,
    pub corrupted: u64,
}

/// One direction of the emulated link
#[derive(Debug, Default)]
pub struct Direction {
    last_arrival: SimTime,
    stats: DirectionStats,
}

impl Direction {
    pub fn stats(&self) -> &DirectionStats {
        &self.stats
    }

    /// Put a frame through the fault model
    ///
    /// Returns the arrival time and the (possibly damaged) frame, or `None`
    /// if the frame was lost.
    pub fn carry<R: Rng>(
        &mut self,
        rng: &mut R,
        config: &NetworkConfig,
        now: SimTime,
        frame: Bytes,
    ) -> Option<(SimTime, Bytes)> {
        self.stats.frames += 1;

        if rng.gen::<f64>() < config.loss {
            self.stats.lost += 1;
            tracing::debug!("link: frame lost");
            return None;
        }

        let frame = if rng.gen::<f64>() < config.corrupt {
            self.stats.corrupted += 1;
            tracing::debug!("link: frame corrupted");
            damage(rng, &frame)
        } else {
            frame
        };

        let start = if config.reorder {
            now
        } else {
            now.max(self.last_arrival)
        };
        let arrival = start + units(1.0 + 9.0 * rng.gen::<f64>());
        self.last_arrival = self.last_arrival.max(arrival);

        Some((arrival, frame))
    }
}

/// Damage one field of a frame the way the classic emulator does
fn damage<R: Rng>(rng: &mut R, frame: &Bytes) -> Bytes {
    let mut damaged = BytesMut::from(&frame[..]);
    if damaged.len() < PACKET_SIZE {
        return frame.clone();
    }

    let x: f64 = rng.gen();
    if x < 0.75 {
        damaged[PAYLOAD_OFFSET] = DAMAGED_BYTE;
    } else {
        let offset = if x < 0.875 { 0 } else { 4 };
        damaged[offset..offset + 4].copy_from_slice(&DAMAGED_FIELD.to_be_bytes());
    }
    damaged.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sr_protocol::{Message, Packet, ProtocolConfig};

    fn frame() -> Bytes {
        let space = ProtocolConfig::default().seq_space().unwrap();
        Packet::data(space.seq(3), &Message::filled(b'd')).to_bytes()
    }

    #[test]
    fn test_default_config_valid() {
        assert!(NetworkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_probability() {
        let config = NetworkConfig {
            loss: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(NetworkError::InvalidProbability {
                name: "loss",
                value: 1.5
            })
        );
    }

    #[test]
    fn test_invalid_lambda() {
        let config = NetworkConfig {
            lambda: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(NetworkError::InvalidLambda(0.0)));
    }

    #[test]
    fn test_lossless_delay_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = NetworkConfig {
            reorder: true,
            ..Default::default()
        };
        let mut direction = Direction::default();

        for _ in 0..100 {
            let (arrival, carried) = direction
                .carry(&mut rng, &config, SimTime::ZERO, frame())
                .unwrap();
            assert_eq!(carried, frame());
            assert!(arrival.as_units() >= 1.0 && arrival.as_units() <= 10.0);
        }
        assert_eq!(direction.stats().frames, 100);
    }

    #[test]
    fn test_fifo_without_reorder() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = NetworkConfig::default();
        let mut direction = Direction::default();

        let mut last = SimTime::ZERO;
        for _ in 0..50 {
            let (arrival, _) = direction
                .carry(&mut rng, &config, SimTime::ZERO, frame())
                .unwrap();
            assert!(arrival >= last);
            last = arrival;
        }
    }

    #[test]
    fn test_total_loss() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = NetworkConfig {
            loss: 1.0,
            ..Default::default()
        };
        let mut direction = Direction::default();

        assert!(direction
            .carry(&mut rng, &config, SimTime::ZERO, frame())
            .is_none());
        assert_eq!(direction.stats().lost, 1);
    }

    #[test]
    fn test_corruption_is_detected() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = NetworkConfig {
            corrupt: 1.0,
            ..Default::default()
        };
        let mut direction = Direction::default();

        for _ in 0..50 {
            let (_, carried) = direction
                .carry(&mut rng, &config, SimTime::ZERO, frame())
                .unwrap();
            assert!(Packet::from_bytes(&carried).unwrap().is_corrupted());
        }
        assert_eq!(direction.stats().corrupted, 50);
    }
}
