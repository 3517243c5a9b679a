//! Configuration errors

use core::fmt;

use super::types::Label;

/// Reason a configuration was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Section header is malformed or unknown
    InvalidSection { line: u32 },
    /// Value could not be parsed for its key
    InvalidValue { line: u32 },
    /// Sensor channel outside 0-7
    InvalidChannel(u8),
    /// Trigger mode is neither `any` nor `all`
    UnknownTriggerMode,
    /// Pin string is not `gpioN` with optional `!`/`^` modifiers
    InvalidPin,
    /// ADC input must be one of GPIO26-29
    InvalidAdcPin(u8),
    /// Averaging window outside the supported range
    InvalidSamples(u8),
    /// Zone references a pump line the board does not provide
    UnknownPumpLine { zone: Label, line: u8 },
    /// Pump line assigned to more than one zone
    PumpLineInUse { zone: Label, line: u8 },
    /// GPIO used by more than one function
    PinConflict(u8),
    /// Two zones share a name
    DuplicateZone(Label),
    /// Zone section lacks a required key
    MissingField { zone: Label, field: &'static str },
    /// A name does not fit the label length
    NameTooLong,
    /// A list exceeded its capacity
    TooManyItems,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSection { line } => {
                write!(f, "line {}: invalid section header", line)
            }
            ConfigError::InvalidValue { line } => write!(f, "line {}: invalid value", line),
            ConfigError::InvalidChannel(channel) => {
                write!(f, "invalid channel {} (expected 0-7)", channel)
            }
            ConfigError::UnknownTriggerMode => {
                write!(f, "unknown trigger mode (expected \"any\" or \"all\")")
            }
            ConfigError::InvalidPin => write!(f, "invalid pin (expected gpioN)"),
            ConfigError::InvalidAdcPin(pin) => {
                write!(f, "gpio{} is not an ADC input (expected gpio26-29)", pin)
            }
            ConfigError::InvalidSamples(samples) => {
                write!(f, "invalid sample count {}", samples)
            }
            ConfigError::UnknownPumpLine { zone, line } => {
                write!(f, "zone '{}': unknown pump line {}", zone, line)
            }
            ConfigError::PumpLineInUse { zone, line } => {
                write!(f, "zone '{}': pump line {} already in use", zone, line)
            }
            ConfigError::PinConflict(pin) => write!(f, "gpio{} assigned twice", pin),
            ConfigError::DuplicateZone(name) => write!(f, "duplicate zone '{}'", name),
            ConfigError::MissingField { zone, field } => {
                write!(f, "zone '{}': missing '{}'", zone, field)
            }
            ConfigError::NameTooLong => write!(f, "name too long"),
            ConfigError::TooManyItems => write!(f, "too many items"),
        }
    }
}
