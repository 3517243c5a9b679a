//! Pump output implementations

pub mod gpio;

pub use gpio::GpioPump;
