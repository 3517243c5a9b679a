//! Analog input abstraction
//!
//! The board has a single ADC input shared by all sensors through an
//! analog multiplexer. Conversions are asynchronous so the executor can
//! run other tasks while the converter is busy.

use core::future::Future;

/// Errors from an analog conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// The converter reported a conversion failure
    Conversion,
    /// The converter did not complete in time
    Timeout,
}

/// Single-ended analog input
pub trait AnalogInput {
    /// Largest raw value the converter can return
    ///
    /// 1023 for a 10-bit converter, 4095 for a 12-bit converter.
    fn full_scale(&self) -> u16;

    /// Take one raw sample
    fn sample(&mut self) -> impl Future<Output = Result<u16, AdcError>>;
}
