//! Phreatic Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the irrigation core
//! is written against. Chip-specific HALs (RP2040 today) implement them so
//! the control loop can be tested on the host with mock pins and a scripted
//! ADC.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (phreatic-firmware)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  phreatic-core / phreatic-drivers       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  phreatic-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ phreatic-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - multiplexer select lines and pump outputs
//! - [`adc::AnalogInput`] - the single shared analog input

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use adc::{AdcError, AnalogInput};
pub use gpio::OutputPin;
