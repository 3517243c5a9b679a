//! Moving-average filter over an analog source

use super::{Channel, CHANNEL_COUNT};
use crate::traits::{AnalogSource, SensorError};

/// Per-channel moving average of the last `window` reads
///
/// `N` is the storage capacity per channel; the active window can be set
/// anywhere from 1 (pass-through) to `N` at runtime. Until a channel has
/// seen `window` reads the mean covers only the reads taken so far. Failed
/// reads are passed through and do not enter the window.
pub struct MovingAverage<S, const N: usize> {
    inner: S,
    window: usize,
    slots: [[u16; N]; CHANNEL_COUNT],
    filled: [usize; CHANNEL_COUNT],
    next: [usize; CHANNEL_COUNT],
}

impl<S: AnalogSource, const N: usize> MovingAverage<S, N> {
    /// Wrap `inner` with a window of `N` reads
    pub fn new(inner: S) -> Self {
        Self::with_window(inner, N)
    }

    /// Wrap `inner` with a window of `window` reads, clamped to `1..=N`
    pub fn with_window(inner: S, window: usize) -> Self {
        Self {
            inner,
            window: window.clamp(1, N.max(1)),
            slots: [[0; N]; CHANNEL_COUNT],
            filled: [0; CHANNEL_COUNT],
            next: [0; CHANNEL_COUNT],
        }
    }

    /// Active window length
    pub fn window(&self) -> usize {
        self.window
    }

    /// Forget the history of one channel
    pub fn reset(&mut self, channel: Channel) {
        let i = channel.index() as usize;
        self.filled[i] = 0;
        self.next[i] = 0;
    }

    /// Access the wrapped source
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwrap the filter
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn push(&mut self, channel: Channel, sample: u16) -> u16 {
        if N == 0 || self.window <= 1 {
            return sample;
        }

        let i = channel.index() as usize;
        self.slots[i][self.next[i]] = sample;
        self.next[i] = (self.next[i] + 1) % self.window;
        if self.filled[i] < self.window {
            self.filled[i] += 1;
        }

        let sum: u32 = self.slots[i][..self.filled[i]]
            .iter()
            .map(|&v| u32::from(v))
            .sum();
        // Mean of u16 values always fits in u16
        (sum / self.filled[i] as u32) as u16
    }
}

impl<S: AnalogSource, const N: usize> AnalogSource for MovingAverage<S, N> {
    async fn read(&mut self, channel: Channel) -> Result<u16, SensorError> {
        let sample = self.inner.read(channel).await?;
        Ok(self.push(channel, sample))
    }
}
