//! Analog sensor traits

use core::future::Future;

use phreatic_hal::AdcError;

use crate::mux::Channel;

/// Errors that can occur reading a sensor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The analog conversion failed
    Adc(AdcError),
}

impl From<AdcError> for SensorError {
    fn from(e: AdcError) -> Self {
        SensorError::Adc(e)
    }
}

/// Source of per-channel sensor readings
///
/// Readings are normalized so that higher values mean wetter soil or a
/// fuller reservoir. Implemented by the multiplexer itself and by filters
/// layered on top of it.
pub trait AnalogSource {
    /// Read one channel
    ///
    /// Takes `&mut self` because a read drives the shared select lines and
    /// converter; holding the borrow across the whole read keeps channel
    /// selection and sampling from interleaving.
    fn read(&mut self, channel: Channel) -> impl Future<Output = Result<u16, SensorError>>;
}
