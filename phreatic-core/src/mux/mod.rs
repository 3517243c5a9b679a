//! Analog multiplexer
//!
//! Eight sensor wires share a single ADC input through a 3-bit analog
//! multiplexer (CD4051-style). A channel is routed by driving the three
//! select lines with its binary encoding.

pub mod average;
pub mod multiplexer;

pub use average::MovingAverage;
pub use multiplexer::{ChannelMultiplexer, DEFAULT_SETTLE_MS};

use core::fmt;

use crate::config::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of multiplexed sensor channels
pub const CHANNEL_COUNT: usize = 8;

/// Number of multiplexer select lines
pub const SELECT_LINES: usize = 3;

/// Multiplexed sensor channel (0-7)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Channel(u8);

impl Channel {
    /// Create a channel, or `None` if out of range
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < CHANNEL_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Channel number (0-7)
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Select line levels for this channel
    ///
    /// Element `i` is bit `i` of the channel number: `[A, B, C]`.
    pub const fn select_bits(self) -> [bool; SELECT_LINES] {
        [
            self.0 & 0b001 != 0,
            self.0 & 0b010 != 0,
            self.0 & 0b100 != 0,
        ]
    }

    /// Iterate over all channels in order
    pub fn all() -> impl Iterator<Item = Channel> {
        (0..CHANNEL_COUNT as u8).map(Channel)
    }
}

impl TryFrom<u8> for Channel {
    type Error = ConfigError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Channel::new(index).ok_or(ConfigError::InvalidChannel(index))
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_range() {
        assert!(Channel::new(0).is_some());
        assert!(Channel::new(7).is_some());
        assert!(Channel::new(8).is_none());
        assert_eq!(Channel::try_from(9), Err(ConfigError::InvalidChannel(9)));
    }

    #[test]
    fn test_select_bits() {
        assert_eq!(Channel::new(0).unwrap().select_bits(), [false, false, false]);
        assert_eq!(Channel::new(1).unwrap().select_bits(), [true, false, false]);
        assert_eq!(Channel::new(2).unwrap().select_bits(), [false, true, false]);
        assert_eq!(Channel::new(5).unwrap().select_bits(), [true, false, true]);
        assert_eq!(Channel::new(7).unwrap().select_bits(), [true, true, true]);
    }

    #[test]
    fn test_all_channels() {
        let mut count = 0;
        for (i, channel) in Channel::all().enumerate() {
            assert_eq!(channel.index() as usize, i);
            count += 1;
        }
        assert_eq!(count, CHANNEL_COUNT);
    }
}
