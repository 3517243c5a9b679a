//! Hardware driver and metric backend implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in phreatic-core:
//!
//! - Pump outputs on a GPIO pin (direct, relay or MOSFET)
//! - Metric sinks: fan-out, bounded queue, pump indicator, defmt console

#![no_std]
#![deny(unsafe_code)]

pub mod pump;
pub mod sink;
