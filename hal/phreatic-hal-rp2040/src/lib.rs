//! RP2040-specific HAL for the irrigation controller firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `phreatic-hal` traits, plus the board plumbing the firmware needs:
//!
//! - Dynamic pin allocation for config-driven setup
//! - GPIO outputs and push-button inputs
//! - ADC channel on one of the analog-capable pins (GPIO26-29)

#![no_std]

pub mod adc;
pub mod gpio;
pub mod pins;

pub use adc::RpAnalogInput;
pub use gpio::{RpButton, RpOutput};
pub use pins::{PinBank, PinError, RemainingPeripherals};
