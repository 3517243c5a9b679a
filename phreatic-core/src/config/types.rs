//! Configuration type definitions
//!
//! These types describe the board wiring and the irrigation zones. They
//! are built by the text parser in [`super::parse`] and checked as a whole
//! by [`IrrigationConfig::validate`] before the controller uses them.

use core::str::FromStr;

use heapless::{String, Vec};

use super::error::ConfigError;
use crate::mux::{Channel, CHANNEL_COUNT, DEFAULT_SETTLE_MS, SELECT_LINES};
use crate::pump::{PumpLine, MAX_PUMP_LINES};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum zone name length
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum device instance name length
pub const MAX_INSTANCE_LEN: usize = 32;

/// Maximum zones per config
pub const MAX_ZONES: usize = 8;

/// Maximum pump lines driven by one zone
pub const MAX_ZONE_LINES: usize = 4;

/// Maximum moving-average window
pub const MAX_AVERAGE_SAMPLES: u8 = 10;

/// Water level at or below which the reservoir counts as empty
pub const DEFAULT_MIN_WATER: u16 = 50;

/// Default system-stats reporting period (10 minutes)
pub const DEFAULT_STATS_PERIOD_MS: u64 = 600_000;

/// Number of GPIOs on the RP2040
pub const GPIO_COUNT: u8 = 30;

/// Zone name
pub type Label = String<MAX_LABEL_LEN>;

/// How several moisture readings combine into one watering decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TriggerMode {
    /// Water when any channel reads dry
    #[default]
    Any,
    /// Water only when every channel reads dry
    All,
}

impl TriggerMode {
    /// Name as written in the configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::Any => "any",
            TriggerMode::All => "all",
        }
    }
}

impl FromStr for TriggerMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" | "Any" | "ANY" => Ok(TriggerMode::Any),
            "all" | "All" | "ALL" => Ok(TriggerMode::All),
            _ => Err(ConfigError::UnknownTriggerMode),
        }
    }
}

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }

    /// Parse a pin string like "gpio11", "!gpio12", "^gpio4"
    ///
    /// `!` marks the pin active-low and `^` enables the pull-up; both may
    /// be combined in either order.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let mut config = PinConfig::default();
        let mut s = value;

        loop {
            if let Some(rest) = s.strip_prefix('!') {
                config.inverted = true;
                s = rest;
            } else if let Some(rest) = s.strip_prefix('^') {
                config.pull_up = true;
                s = rest;
            } else {
                break;
            }
        }

        let number = s.strip_prefix("gpio").ok_or(ConfigError::InvalidPin)?;
        config.pin = number.parse().map_err(|_| ConfigError::InvalidPin)?;
        if config.pin >= GPIO_COUNT {
            return Err(ConfigError::InvalidPin);
        }
        Ok(config)
    }

    /// Pump line driven by this pin
    pub const fn line(&self) -> PumpLine {
        PumpLine(self.pin)
    }
}

/// Shared analog multiplexer wiring
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MultiplexerConfig {
    /// Select lines A, B, C
    pub select_pins: [PinConfig; SELECT_LINES],
    /// GPIO carrying the multiplexer output (26-29)
    pub adc_pin: u8,
    /// Wait between channel selection and sampling (ms)
    pub settle_ms: u32,
    /// Moving-average window; 1 disables averaging
    pub samples: u8,
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self {
            select_pins: [PinConfig::new(2), PinConfig::new(3), PinConfig::new(4)],
            adc_pin: 26,
            settle_ms: DEFAULT_SETTLE_MS,
            samples: 1,
        }
    }
}

/// Irrigation zone configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneConfig {
    /// Zone name, used as the metric group
    pub name: Label,
    /// How moisture readings combine
    pub trigger: TriggerMode,
    /// Reservoir level sensor
    pub water_channel: Channel,
    /// Soil moisture sensors
    pub moisture_channels: Vec<Channel, CHANNEL_COUNT>,
    /// Pump outputs switched together
    pub pump_lines: Vec<PumpLine, MAX_ZONE_LINES>,
    /// Readings below this count as dry
    pub min_moisture: u16,
    /// Water level at or below this stops the pump
    pub min_water: u16,
    /// Maximum pump run per start (seconds)
    pub pump_secs: u32,
    /// Period between moisture evaluations (ms)
    pub moisture_check_period_ms: u64,
    /// Period between water level reports (ms)
    pub water_check_period_ms: u64,
    /// Period between pump-safety checks (ms)
    pub pump_check_period_ms: u64,
    /// Optional push button starting the pump by hand
    pub button: Option<PinConfig>,
}

impl ZoneConfig {
    /// Create a zone with default thresholds and periods
    pub fn new(name: Label, water_channel: Channel) -> Self {
        Self {
            name,
            trigger: TriggerMode::Any,
            water_channel,
            moisture_channels: Vec::new(),
            pump_lines: Vec::new(),
            min_moisture: 500,
            min_water: DEFAULT_MIN_WATER,
            pump_secs: 30,
            moisture_check_period_ms: 60_000,
            water_check_period_ms: 60_000,
            pump_check_period_ms: 1_000,
            button: None,
        }
    }

    /// Maximum pump run per start (ms)
    pub fn pump_run_ms(&self) -> u64 {
        u64::from(self.pump_secs) * 1000
    }
}

/// Complete controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IrrigationConfig {
    /// Device instance name reported with metrics
    pub instance: String<MAX_INSTANCE_LEN>,
    /// Period between system-stats reports (ms)
    pub system_stats_period_ms: u64,
    /// Multiplexer wiring
    pub multiplexer: MultiplexerConfig,
    /// Pump-capable output lines on the board
    pub pumps: Vec<PinConfig, MAX_PUMP_LINES>,
    /// Irrigation zones, in evaluation order
    pub zones: Vec<ZoneConfig, MAX_ZONES>,
    /// LED lit while any zone is pumping
    pub status_led: Option<PinConfig>,
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Set of GPIO numbers, used to detect double assignment
#[derive(Default)]
struct PinSet(u32);

impl PinSet {
    fn insert(&mut self, pin: u8) -> Result<(), ConfigError> {
        if pin >= GPIO_COUNT {
            return Err(ConfigError::InvalidPin);
        }
        let bit = 1u32 << pin;
        if self.0 & bit != 0 {
            return Err(ConfigError::PinConflict(pin));
        }
        self.0 |= bit;
        Ok(())
    }

    fn contains(&self, pin: u8) -> bool {
        pin < GPIO_COUNT && self.0 & (1u32 << pin) != 0
    }
}

impl IrrigationConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self {
            instance: String::new(),
            system_stats_period_ms: DEFAULT_STATS_PERIOD_MS,
            multiplexer: MultiplexerConfig::default(),
            pumps: Vec::new(),
            zones: Vec::new(),
            status_led: None,
        }
    }

    /// Find a zone by name
    pub fn zone(&self, name: &str) -> Option<&ZoneConfig> {
        self.zones.iter().find(|z| z.name.as_str() == name)
    }

    /// Pump line for a board pin, if the pin is a pump output
    pub fn pump(&self, line: PumpLine) -> Option<&PinConfig> {
        self.pumps.iter().find(|p| p.line() == line)
    }

    /// Check the configuration as a whole
    ///
    /// Rejects duplicate zone names, pump lines the board does not have,
    /// pump lines shared between zones, and any GPIO assigned to more than
    /// one function.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mux = &self.multiplexer;
        if !(26..=29).contains(&mux.adc_pin) {
            return Err(ConfigError::InvalidAdcPin(mux.adc_pin));
        }
        if mux.samples == 0 || mux.samples > MAX_AVERAGE_SAMPLES {
            return Err(ConfigError::InvalidSamples(mux.samples));
        }

        let mut pins = PinSet::default();
        for select in &mux.select_pins {
            pins.insert(select.pin)?;
        }
        pins.insert(mux.adc_pin)?;
        for pump in &self.pumps {
            pins.insert(pump.pin)?;
        }
        if let Some(led) = &self.status_led {
            pins.insert(led.pin)?;
        }

        let mut claimed = PinSet::default();
        for (i, zone) in self.zones.iter().enumerate() {
            if self.zones[..i].iter().any(|z| z.name == zone.name) {
                return Err(ConfigError::DuplicateZone(zone.name.clone()));
            }

            for &line in &zone.pump_lines {
                if self.pump(line).is_none() {
                    return Err(ConfigError::UnknownPumpLine {
                        zone: zone.name.clone(),
                        line: line.number(),
                    });
                }
                if claimed.contains(line.number()) {
                    return Err(ConfigError::PumpLineInUse {
                        zone: zone.name.clone(),
                        line: line.number(),
                    });
                }
                claimed.insert(line.number())?;
            }

            if let Some(button) = &zone.button {
                pins.insert(button.pin)?;
            }
        }

        Ok(())
    }
}
