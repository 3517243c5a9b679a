//! Multiplexed channel reads
//!
//! A read is one unit: select the channel, let the multiplexer and ADC
//! input settle, then sample. The settle wait is asynchronous so the rest
//! of the firmware keeps running, while the `&mut` borrow keeps any other
//! read from touching the select lines until the sample is taken.

use embedded_hal_async::delay::DelayNs;
use phreatic_hal::{AnalogInput, OutputPin};

use super::{Channel, SELECT_LINES};
use crate::traits::{AnalogSource, SensorError};

/// Default settling time between channel selection and sampling (ms)
pub const DEFAULT_SETTLE_MS: u32 = 50;

/// Shared analog input behind a 3-bit multiplexer
///
/// Readings are inverted against the converter's full scale: the sensors
/// read a high voltage when dry or empty, so after inversion a higher
/// value always means wetter soil or more water.
pub struct ChannelMultiplexer<S, A, D> {
    /// Select lines A, B, C (bit 0, 1, 2 of the channel number)
    select: [S; SELECT_LINES],
    adc: A,
    delay: D,
    settle_ms: u32,
    selected: Channel,
}

impl<S: OutputPin, A: AnalogInput, D: DelayNs> ChannelMultiplexer<S, A, D> {
    /// Create a multiplexer and route channel 0
    ///
    /// # Arguments
    /// - `select`: select lines in bit order `[A, B, C]`
    /// - `adc`: the shared analog input
    /// - `delay`: async delay used for the settle wait
    pub fn new(select: [S; SELECT_LINES], adc: A, delay: D) -> Self {
        let mut mux = Self {
            select,
            adc,
            delay,
            settle_ms: DEFAULT_SETTLE_MS,
            selected: Channel(0),
        };
        mux.select(Channel(0));
        mux
    }

    /// Override the settle time
    pub fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    /// Route `channel` to the analog input
    pub fn select(&mut self, channel: Channel) {
        for (line, high) in self.select.iter_mut().zip(channel.select_bits()) {
            line.set_state(high);
        }
        self.selected = channel;
    }

    /// Currently routed channel
    pub fn selected(&self) -> Channel {
        self.selected
    }

    /// Settle time in milliseconds
    pub fn settle_ms(&self) -> u32 {
        self.settle_ms
    }

    /// Select lines, for inspection
    pub fn select_lines(&self) -> &[S; SELECT_LINES] {
        &self.select
    }

    /// Select, settle and sample one channel
    ///
    /// Every call re-selects and re-samples; nothing is cached.
    pub async fn read_channel(&mut self, channel: Channel) -> Result<u16, SensorError> {
        self.select(channel);
        self.delay.delay_ms(self.settle_ms).await;

        let raw = self.adc.sample().await?;
        Ok(self.adc.full_scale().saturating_sub(raw))
    }
}

impl<S: OutputPin, A: AnalogInput, D: DelayNs> AnalogSource for ChannelMultiplexer<S, A, D> {
    async fn read(&mut self, channel: Channel) -> Result<u16, SensorError> {
        self.read_channel(channel).await
    }
}
