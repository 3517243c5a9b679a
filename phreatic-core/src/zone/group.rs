//! Irrigation zone ("sensor group")
//!
//! A zone owns three independent cooperative timers and does at most
//! three things per tick, each gated by its own timer:
//!
//! 1. Moisture check (only while idle): read every moisture channel,
//!    decide whether the soil is dry, and start the pump if the reservoir
//!    has water.
//! 2. Water-level report: read and report the reservoir level.
//! 3. Pump-safety check (only while pumping): stop the pump when its run
//!    time is up or the reservoir is empty.
//!
//! A failed sensor read never starts a pump. A failed moisture read
//! counts as "not dry"; a failed water read counts as "no water".

use heapless::Vec;

use super::state::{ZoneEvent, ZoneState};
use crate::config::{Label, TriggerMode, ZoneConfig, MAX_ZONE_LINES};
use crate::metrics::Metric;
use crate::mux::{Channel, CHANNEL_COUNT};
use crate::pump::{PumpBank, PumpLine};
use crate::timer::CooperativeTimer;
use crate::traits::{AnalogSource, MetricSink, PumpOutput};

/// One irrigation zone and its pump-safety interlock
pub struct Zone {
    name: Label,
    trigger: TriggerMode,
    water_channel: Channel,
    moisture_channels: Vec<Channel, CHANNEL_COUNT>,
    pump_lines: Vec<PumpLine, MAX_ZONE_LINES>,
    min_moisture: u16,
    min_water: u16,
    pump_run_ms: u64,
    moisture_period_ms: u64,
    water_period_ms: u64,
    pump_period_ms: u64,

    state: ZoneState,
    /// Set while pumping (ms since boot)
    pump_stop_deadline: Option<u64>,
    moisture_timer: CooperativeTimer,
    water_timer: CooperativeTimer,
    pump_timer: CooperativeTimer,
    sensor_faults: u32,
}

impl Zone {
    /// Create an idle zone from its configuration
    ///
    /// The zone does not claim its pump lines; the controller does that
    /// when it registers the zone.
    pub fn new(config: &ZoneConfig) -> Self {
        Self {
            name: config.name.clone(),
            trigger: config.trigger,
            water_channel: config.water_channel,
            moisture_channels: config.moisture_channels.clone(),
            pump_lines: config.pump_lines.clone(),
            min_moisture: config.min_moisture,
            min_water: config.min_water,
            pump_run_ms: config.pump_run_ms(),
            moisture_period_ms: config.moisture_check_period_ms,
            water_period_ms: config.water_check_period_ms,
            pump_period_ms: config.pump_check_period_ms,
            state: ZoneState::Idle,
            pump_stop_deadline: None,
            moisture_timer: CooperativeTimer::new(),
            water_timer: CooperativeTimer::new(),
            pump_timer: CooperativeTimer::new(),
            sensor_faults: 0,
        }
    }

    /// Zone name, also the metric group
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Current pump state
    pub fn state(&self) -> ZoneState {
        self.state
    }

    /// When the running pump will be stopped (ms since boot)
    pub fn pump_stop_deadline(&self) -> Option<u64> {
        self.pump_stop_deadline
    }

    /// Pump lines switched by this zone
    pub fn pump_lines(&self) -> &[PumpLine] {
        &self.pump_lines
    }

    /// Moisture sensor channels
    pub fn moisture_channels(&self) -> &[Channel] {
        &self.moisture_channels
    }

    /// Reservoir level channel
    pub fn water_channel(&self) -> Channel {
        self.water_channel
    }

    /// Failed sensor reads since the last [`Zone::take_sensor_faults`]
    pub fn sensor_faults(&self) -> u32 {
        self.sensor_faults
    }

    /// Return and reset the sensor fault count
    pub fn take_sensor_faults(&mut self) -> u32 {
        core::mem::take(&mut self.sensor_faults)
    }

    /// Run whichever periodic checks are due
    ///
    /// Never blocks beyond the sensor reads it issues.
    pub async fn tick<S, P, M>(
        &mut self,
        now_ms: u64,
        source: &mut S,
        pumps: &mut PumpBank<P>,
        sink: &mut M,
    ) where
        S: AnalogSource,
        P: PumpOutput,
        M: MetricSink,
    {
        if self.moisture_timer.has_elapsed(now_ms) {
            if !self.state.is_pumping() {
                let alarm = self.needs_watering(source, sink).await;
                sink.emit(&Metric::MoistureAlarmStatus {
                    group: self.name.as_str(),
                    status: alarm,
                });

                if alarm && self.has_water(source).await {
                    self.start_pumping(now_ms, pumps, sink);
                }
            }
            self.moisture_timer.arm(now_ms, self.moisture_period_ms);
        }

        if self.water_timer.has_elapsed(now_ms) {
            if let Some(level) = self.read(source, self.water_channel).await {
                sink.emit(&Metric::Water {
                    group: self.name.as_str(),
                    level,
                });
            }
            self.water_timer.arm(now_ms, self.water_period_ms);
        }

        if self.pump_timer.has_elapsed(now_ms) {
            if self.state.is_pumping() {
                self.is_pumping(now_ms, source, pumps, sink).await;
            }
            self.pump_timer.arm(now_ms, self.pump_period_ms);
        }
    }

    /// Read every moisture channel and apply the trigger mode
    ///
    /// Emits one `moisture` metric per successful read. A zone without
    /// moisture channels never needs watering.
    pub async fn needs_watering<S, M>(&mut self, source: &mut S, sink: &mut M) -> bool
    where
        S: AnalogSource,
        M: MetricSink,
    {
        if self.moisture_channels.is_empty() {
            return false;
        }

        let mut any_dry = false;
        let mut all_dry = true;

        for i in 0..self.moisture_channels.len() {
            let channel = self.moisture_channels[i];
            let dry = match self.read(source, channel).await {
                Some(level) => {
                    sink.emit(&Metric::Moisture {
                        group: self.name.as_str(),
                        channel,
                        level,
                        min_level: self.min_moisture,
                    });
                    level < self.min_moisture
                }
                None => false,
            };
            any_dry |= dry;
            all_dry &= dry;
        }

        match self.trigger {
            TriggerMode::Any => any_dry,
            TriggerMode::All => all_dry,
        }
    }

    /// Check whether the reservoir is above the minimum level
    pub async fn has_water<S: AnalogSource>(&mut self, source: &mut S) -> bool {
        self.read(source, self.water_channel)
            .await
            .is_some_and(|level| level > self.min_water)
    }

    /// Switch the pump on for the configured run time
    ///
    /// Does nothing if the zone is already pumping, so the stop deadline
    /// is never pushed back.
    pub fn start_pumping<P, M>(&mut self, now_ms: u64, pumps: &mut PumpBank<P>, sink: &mut M)
    where
        P: PumpOutput,
        M: MetricSink,
    {
        if self.state.is_pumping() {
            return;
        }

        self.state = self.state.transition(ZoneEvent::StartPumping);
        self.pump_stop_deadline = Some(now_ms.saturating_add(self.pump_run_ms));
        pumps.set(&self.pump_lines, true);
        sink.emit(&Metric::PumpStatus {
            group: self.name.as_str(),
            status: true,
        });
    }

    /// Apply the pump-safety interlock and report whether still pumping
    ///
    /// A running pump is stopped once `now_ms` reaches the stop deadline
    /// or the reservoir is at or below its minimum level.
    pub async fn is_pumping<S, P, M>(
        &mut self,
        now_ms: u64,
        source: &mut S,
        pumps: &mut PumpBank<P>,
        sink: &mut M,
    ) -> bool
    where
        S: AnalogSource,
        P: PumpOutput,
        M: MetricSink,
    {
        if !self.state.is_pumping() {
            return false;
        }

        let deadline = self.pump_stop_deadline.unwrap_or(now_ms);
        if now_ms >= deadline {
            self.stop(ZoneEvent::RunTimeElapsed, pumps, sink);
        } else if !self.has_water(source).await {
            self.stop(ZoneEvent::WaterExhausted, pumps, sink);
        }

        self.state.is_pumping()
    }

    /// Force the pump off and give the lines back to the bank
    ///
    /// No metric is emitted: the zone is going away.
    pub fn release<P: PumpOutput>(&mut self, pumps: &mut PumpBank<P>) {
        self.state = self.state.transition(ZoneEvent::Released);
        self.pump_stop_deadline = None;
        pumps.release(&self.pump_lines);
    }

    fn stop<P, M>(&mut self, event: ZoneEvent, pumps: &mut PumpBank<P>, sink: &mut M)
    where
        P: PumpOutput,
        M: MetricSink,
    {
        self.state = self.state.transition(event);
        self.pump_stop_deadline = None;
        pumps.set(&self.pump_lines, false);
        sink.emit(&Metric::PumpStatus {
            group: self.name.as_str(),
            status: false,
        });
    }

    async fn read<S: AnalogSource>(&mut self, source: &mut S, channel: Channel) -> Option<u16> {
        match source.read(channel).await {
            Ok(level) => Some(level),
            Err(_) => {
                self.sensor_faults = self.sensor_faults.saturating_add(1);
                None
            }
        }
    }
}
