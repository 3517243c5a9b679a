//! Test doubles shared by the unit tests

extern crate std;

use core::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use phreatic_hal::{AdcError, AnalogInput, OutputPin};

use crate::metrics::{Metric, MetricRecord};
use crate::mux::{Channel, ChannelMultiplexer, CHANNEL_COUNT, SELECT_LINES};
use crate::traits::{AnalogSource, MetricSink, PumpOutput, SensorError, SystemProbe};

/// Output pin backed by a shared cell
pub struct CellPin<'a>(pub &'a Cell<bool>);

impl OutputPin for CellPin<'_> {
    fn set_high(&mut self) {
        self.0.set(true);
    }

    fn set_low(&mut self) {
        self.0.set(false);
    }

    fn is_set_high(&self) -> bool {
        self.0.get()
    }
}

/// ADC that returns the raw value of whichever channel the select lines
/// currently route
pub struct BenchAdc<'a> {
    bench: &'a MuxBench,
}

impl AnalogInput for BenchAdc<'_> {
    fn full_scale(&self) -> u16 {
        1023
    }

    async fn sample(&mut self) -> Result<u16, AdcError> {
        self.bench.samples.set(self.bench.samples.get() + 1);
        if self.bench.fail.get() {
            return Err(AdcError::Conversion);
        }
        let levels = self.bench.levels();
        let index = levels
            .iter()
            .enumerate()
            .fold(0usize, |acc, (bit, &high)| acc | (usize::from(high) << bit));
        Ok(self.bench.raw[index])
    }
}

/// Delay that returns immediately and records what was asked of it
#[derive(Default)]
pub struct RecordingDelay {
    pub calls: u32,
    pub total_ms: u32,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ms += ns / 1_000_000;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += ms;
    }
}

/// Select lines plus a fake converter wired behind them
pub struct MuxBench {
    pub lines: [Cell<bool>; SELECT_LINES],
    pub raw: [u16; CHANNEL_COUNT],
    pub samples: Cell<u32>,
    pub fail: Cell<bool>,
}

impl MuxBench {
    pub fn new(raw: [u16; CHANNEL_COUNT]) -> Self {
        Self {
            lines: Default::default(),
            raw,
            samples: Cell::new(0),
            fail: Cell::new(false),
        }
    }

    pub fn levels(&self) -> [bool; SELECT_LINES] {
        [self.lines[0].get(), self.lines[1].get(), self.lines[2].get()]
    }

    pub fn multiplexer(&self) -> ChannelMultiplexer<CellPin<'_>, BenchAdc<'_>, RecordingDelay> {
        let [a, b, c] = &self.lines;
        ChannelMultiplexer::new(
            [CellPin(a), CellPin(b), CellPin(c)],
            BenchAdc { bench: self },
            RecordingDelay::default(),
        )
    }
}

/// Per-channel scripted sensor source
///
/// Each channel replays its script in order and then keeps returning the
/// last value. Unscripted channels read 0.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: [VecDeque<u16>; CHANNEL_COUNT],
    failing: [bool; CHANNEL_COUNT],
    reads: [u32; CHANNEL_COUNT],
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a channel's script
    pub fn script(&mut self, channel: Channel, values: &[u16]) {
        let i = channel.index() as usize;
        self.scripts[i] = values.iter().copied().collect();
        self.failing[i] = false;
    }

    /// Make a channel read a constant value
    pub fn set(&mut self, channel: Channel, value: u16) {
        self.script(channel, &[value]);
    }

    /// Make every read of a channel fail
    pub fn fail(&mut self, channel: Channel) {
        self.failing[channel.index() as usize] = true;
    }

    /// Reads issued for a channel
    pub fn reads(&self, channel: Channel) -> u32 {
        self.reads[channel.index() as usize]
    }
}

impl AnalogSource for ScriptedSource {
    async fn read(&mut self, channel: Channel) -> Result<u16, SensorError> {
        let i = channel.index() as usize;
        self.reads[i] += 1;
        if self.failing[i] {
            return Err(SensorError::Adc(AdcError::Timeout));
        }
        let script = &mut self.scripts[i];
        let value = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().copied()
        };
        Ok(value.unwrap_or(0))
    }
}

/// Observable state of every mock pump handed out
#[derive(Clone, Default)]
pub struct PumpProbe {
    lines: Rc<[Cell<bool>; 32]>,
}

impl PumpProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pump(&self, line: u8) -> MockPump {
        MockPump {
            line,
            probe: self.clone(),
        }
    }

    pub fn is_on(&self, line: u8) -> bool {
        self.lines[line as usize].get()
    }
}

/// Pump output that reports to a [`PumpProbe`]
pub struct MockPump {
    line: u8,
    probe: PumpProbe,
}

impl PumpOutput for MockPump {
    fn set_on(&mut self, on: bool) {
        self.probe.lines[self.line as usize].set(on);
    }

    fn is_on(&self) -> bool {
        self.probe.is_on(self.line)
    }
}

/// Metric sink that keeps everything it is given
#[derive(Default)]
pub struct RecordingSink {
    records: Vec<MetricRecord>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    pub fn count(&self, name: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.as_metric().name() == name)
            .count()
    }

    pub fn find(&self, name: &str) -> Option<&MetricRecord> {
        self.records.iter().find(|r| r.as_metric().name() == name)
    }

    pub fn contains(&self, record: &MetricRecord) -> bool {
        self.records.contains(record)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl MetricSink for RecordingSink {
    fn emit(&mut self, metric: &Metric<'_>) {
        self.records.push(MetricRecord::from(metric));
    }
}

/// Fixed health counters
pub struct FixedProbe {
    pub ram_free: u32,
    pub stack_peak: u32,
    pub dropped: u32,
}

impl SystemProbe for FixedProbe {
    fn ram_free(&self) -> u32 {
        self.ram_free
    }

    fn stack_peak(&self) -> u32 {
        self.stack_peak
    }

    fn metrics_dropped(&self) -> u32 {
        self.dropped
    }
}
