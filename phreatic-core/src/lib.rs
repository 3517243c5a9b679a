//! Board-agnostic core logic for the irrigation controller firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Cooperative timer used for every periodic check
//! - Analog multiplexer channel selection and settled reads
//! - Per-zone watering state machine and pump-safety interlock
//! - Controller pass loop and system health reporting
//! - Configuration types, parser and validation
//! - Metric events emitted to the logging backends

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod metrics;
pub mod mux;
pub mod pump;
pub mod timer;
pub mod traits;
pub mod zone;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{parse_config, ConfigError, IrrigationConfig, TriggerMode, ZoneConfig};
pub use controller::{Controller, TriggerError};
pub use metrics::{Metric, MetricRecord, StackWatermark, SystemStats};
pub use mux::{Channel, ChannelMultiplexer, MovingAverage};
pub use pump::{PumpBank, PumpLine};
pub use timer::CooperativeTimer;
pub use zone::{Zone, ZoneState};
