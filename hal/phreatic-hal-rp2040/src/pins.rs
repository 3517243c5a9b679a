//! Dynamic pin allocation for config-driven hardware setup
//!
//! Provides a way to get GPIO pins by number at runtime, so pin numbers
//! come from `irrigation.toml` rather than being hardcoded.

use core::fmt;

use embassy_rp::adc::Channel as AdcChannel;
use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::peripherals::{ADC, PIN_26, PIN_27, PIN_28, PIN_29};
use embassy_rp::{Peri, Peripherals};
use phreatic_core::config::PinConfig;

use crate::gpio::{RpButton, RpOutput};

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// First pin wired to the ADC
const FIRST_ADC_PIN: u8 = 26;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// Pin has no ADC input (only 26-29 do)
    NotAnalog,
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinError::InvalidPin => write!(f, "pin number out of range"),
            PinError::AlreadyTaken => write!(f, "pin already taken"),
            PinError::NotAnalog => write!(f, "pin has no ADC input"),
        }
    }
}

/// The analog-capable pins keep their concrete types so they can still
/// become ADC channels
struct AnalogPins {
    pin26: Option<Peri<'static, PIN_26>>,
    pin27: Option<Peri<'static, PIN_27>>,
    pin28: Option<Peri<'static, PIN_28>>,
    pin29: Option<Peri<'static, PIN_29>>,
}

/// Pin bank that holds all GPIO pins and allows taking them by number
pub struct PinBank {
    digital: [Option<Peri<'static, AnyPin>>; FIRST_ADC_PIN as usize],
    analog: AnalogPins,
}

/// Non-GPIO peripherals that remain after creating the [`PinBank`]
pub struct RemainingPeripherals {
    pub adc: Peri<'static, ADC>,
}

impl PinBank {
    /// Split the peripherals into a pin bank and everything else
    ///
    /// After this call, pins must be obtained through the bank.
    pub fn split(p: Peripherals) -> (Self, RemainingPeripherals) {
        let bank = Self {
            digital: [
                Some(p.PIN_0.into()),
                Some(p.PIN_1.into()),
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
            ],
            analog: AnalogPins {
                pin26: Some(p.PIN_26),
                pin27: Some(p.PIN_27),
                pin28: Some(p.PIN_28),
                pin29: Some(p.PIN_29),
            },
        };
        (bank, RemainingPeripherals { adc: p.ADC })
    }

    /// Take a pin by number for digital use
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        let taken = match pin_num {
            0..=25 => self.digital[pin_num as usize].take(),
            26 => self.analog.pin26.take().map(Into::into),
            27 => self.analog.pin27.take().map(Into::into),
            28 => self.analog.pin28.take().map(Into::into),
            29 => self.analog.pin29.take().map(Into::into),
            _ => return Err(PinError::InvalidPin),
        };
        taken.ok_or(PinError::AlreadyTaken)
    }

    /// Check if a pin is available
    pub fn is_available(&self, pin_num: u8) -> bool {
        match pin_num {
            0..=25 => self.digital[pin_num as usize].is_some(),
            26 => self.analog.pin26.is_some(),
            27 => self.analog.pin27.is_some(),
            28 => self.analog.pin28.is_some(),
            29 => self.analog.pin29.is_some(),
            _ => false,
        }
    }

    /// Take an analog pin as an ADC channel
    ///
    /// The pad is left floating; sensor boards bring their own bias.
    pub fn take_adc_channel(&mut self, pin_num: u8) -> Result<AdcChannel<'static>, PinError> {
        let channel = match pin_num {
            26 => self.analog.pin26.take().map(|p| AdcChannel::new_pin(p, Pull::None)),
            27 => self.analog.pin27.take().map(|p| AdcChannel::new_pin(p, Pull::None)),
            28 => self.analog.pin28.take().map(|p| AdcChannel::new_pin(p, Pull::None)),
            29 => self.analog.pin29.take().map(|p| AdcChannel::new_pin(p, Pull::None)),
            n if (n as usize) < GPIO_COUNT => return Err(PinError::NotAnalog),
            _ => return Err(PinError::InvalidPin),
        };
        channel.ok_or(PinError::AlreadyTaken)
    }

    /// Take a pin as an output that starts at its idle level
    ///
    /// Active-low outputs idle high, so a relay board never sees a pulse
    /// between allocation and the first command.
    pub fn output(&mut self, config: &PinConfig) -> Result<RpOutput, PinError> {
        let idle = if config.inverted {
            Level::High
        } else {
            Level::Low
        };
        let pin = self.take(config.pin)?;
        Ok(RpOutput::new(Output::new(pin, idle)))
    }

    /// Take a pin as a push-button input
    ///
    /// `^` (pull-up) buttons short to ground and are active-low; the rest
    /// get a pull-down and are active-high.
    pub fn button(&mut self, config: &PinConfig) -> Result<RpButton, PinError> {
        let pull = if config.pull_up { Pull::Up } else { Pull::Down };
        let pin = self.take(config.pin)?;
        Ok(RpButton::new(Input::new(pin, pull), config.pull_up))
    }
}
