//! ADC input for the multiplexer common line

use embassy_rp::adc::{Adc, Async, Channel};
use phreatic_hal::{AdcError, AnalogInput};

/// Full scale of the RP2040's 12-bit converter
pub const ADC_FULL_SCALE: u16 = 4095;

/// One ADC channel with exclusive use of the converter
pub struct RpAnalogInput {
    adc: Adc<'static, Async>,
    channel: Channel<'static>,
}

impl RpAnalogInput {
    pub fn new(adc: Adc<'static, Async>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AnalogInput for RpAnalogInput {
    fn full_scale(&self) -> u16 {
        ADC_FULL_SCALE
    }

    async fn sample(&mut self) -> Result<u16, AdcError> {
        self.adc
            .read(&mut self.channel)
            .await
            .map_err(|_| AdcError::Conversion)
    }
}
