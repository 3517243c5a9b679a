//! Controller pass loop
//!
//! The controller owns the zones and the pump bank. One pass ticks every
//! zone in registration order, then reports system health when its own
//! timer is due. Operator commands and configuration changes are applied
//! between passes by the caller, never in the middle of one.

use core::fmt;

use heapless::Vec;

use crate::config::{ConfigError, IrrigationConfig, ZoneConfig, DEFAULT_STATS_PERIOD_MS, MAX_ZONES};
use crate::metrics::{Metric, SystemStats};
use crate::pump::{PumpBank, PumpError};
use crate::timer::CooperativeTimer;
use crate::traits::{AnalogSource, MetricSink, PumpOutput, SystemProbe};
use crate::zone::Zone;

/// Reasons an operator pump trigger was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerError {
    /// No zone with that name
    UnknownZone,
    /// Reservoir at or below the minimum level
    NoWater,
}

impl fmt::Display for TriggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerError::UnknownZone => write!(f, "unknown zone"),
            TriggerError::NoWater => write!(f, "no water"),
        }
    }
}

/// Irrigation controller
pub struct Controller<P: PumpOutput> {
    zones: Vec<Zone, MAX_ZONES>,
    pumps: PumpBank<P>,
    stats_timer: CooperativeTimer,
    stats_period_ms: u64,
    passes: u32,
    sensor_faults: u32,
}

impl<P: PumpOutput> Controller<P> {
    /// Create a controller with no zones
    ///
    /// Every line in `pumps` is already off (see [`PumpBank::add`]).
    pub fn new(pumps: PumpBank<P>) -> Self {
        Self {
            zones: Vec::new(),
            pumps,
            stats_timer: CooperativeTimer::new(),
            stats_period_ms: DEFAULT_STATS_PERIOD_MS,
            passes: 0,
            sensor_faults: 0,
        }
    }

    /// Override the system-stats period
    pub fn with_stats_period_ms(mut self, period_ms: u64) -> Self {
        self.stats_period_ms = period_ms;
        self
    }

    /// Registered zones in pass order
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Find a zone by name
    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name() == name)
    }

    /// Pump outputs
    pub fn pumps(&self) -> &PumpBank<P> {
        &self.pumps
    }

    /// Passes completed since boot
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Failed sensor reads since boot, across all zones ever registered
    pub fn sensor_faults(&self) -> u32 {
        self.sensor_faults
    }

    /// Check whether any zone is pumping
    ///
    /// Observational: no interlock is evaluated.
    pub fn is_pumping(&self) -> bool {
        self.zones.iter().any(|z| z.state().is_pumping())
    }

    /// Add a zone and claim its pump lines
    ///
    /// Fails without side effects if the name is taken, a line is unknown
    /// or already claimed, or the zone table is full.
    pub fn register_zone(&mut self, config: &ZoneConfig) -> Result<(), ConfigError> {
        if self.zone(&config.name).is_some() {
            return Err(ConfigError::DuplicateZone(config.name.clone()));
        }
        if self.zones.is_full() {
            return Err(ConfigError::TooManyItems);
        }

        self.pumps
            .claim(&config.pump_lines)
            .map_err(|e| match e {
                PumpError::AlreadyClaimed(line) => ConfigError::PumpLineInUse {
                    zone: config.name.clone(),
                    line: line.number(),
                },
                PumpError::UnknownLine(line) | PumpError::Duplicate(line) => {
                    ConfigError::UnknownPumpLine {
                        zone: config.name.clone(),
                        line: line.number(),
                    }
                }
                PumpError::Full => ConfigError::TooManyItems,
            })?;

        if let Err(zone) = self.zones.push(Zone::new(config)) {
            self.pumps.release(zone.pump_lines());
            return Err(ConfigError::TooManyItems);
        }
        Ok(())
    }

    /// Remove every zone, forcing its pump lines off first
    pub fn remove_all_zones(&mut self) {
        while let Some(mut zone) = self.zones.pop() {
            self.sensor_faults = self.sensor_faults.saturating_add(zone.take_sensor_faults());
            zone.release(&mut self.pumps);
        }
    }

    /// Replace the running zone set with `config`
    ///
    /// The whole configuration is checked first, including that every
    /// pump line exists in this controller's bank; a rejected
    /// configuration leaves the running zones untouched. Emits
    /// `config-load` on success.
    pub fn apply_config<M: MetricSink>(
        &mut self,
        config: &IrrigationConfig,
        sink: &mut M,
    ) -> Result<(), ConfigError> {
        config.validate()?;
        for zone in &config.zones {
            if let Some(&line) = zone.pump_lines.iter().find(|&&l| !self.pumps.contains(l)) {
                return Err(ConfigError::UnknownPumpLine {
                    zone: zone.name.clone(),
                    line: line.number(),
                });
            }
        }

        self.remove_all_zones();
        for zone in &config.zones {
            self.register_zone(zone)?;
        }
        self.stats_period_ms = config.system_stats_period_ms;
        self.stats_timer = CooperativeTimer::new();

        sink.emit(&Metric::ConfigLoad {
            zones: self.zones.len() as u8,
        });
        Ok(())
    }

    /// Run one controller pass at `now_ms`
    pub async fn pass<S, M, Y>(&mut self, now_ms: u64, source: &mut S, sink: &mut M, probe: &Y)
    where
        S: AnalogSource,
        M: MetricSink,
        Y: SystemProbe,
    {
        for zone in self.zones.iter_mut() {
            zone.tick(now_ms, source, &mut self.pumps, sink).await;
            self.sensor_faults = self.sensor_faults.saturating_add(zone.take_sensor_faults());
        }
        self.passes = self.passes.wrapping_add(1);

        if self.stats_timer.has_elapsed(now_ms) {
            sink.emit(&Metric::SystemStats(self.stats(now_ms, probe)));
            self.stats_timer.arm(now_ms, self.stats_period_ms);
        }
    }

    /// Current health counters
    pub fn stats<Y: SystemProbe>(&self, now_ms: u64, probe: &Y) -> SystemStats {
        SystemStats {
            uptime_ms: now_ms,
            passes: self.passes,
            sensor_faults: self.sensor_faults,
            ram_free: probe.ram_free(),
            stack_peak: probe.stack_peak(),
            metrics_dropped: probe.metrics_dropped(),
        }
    }

    /// Start a zone's pump on operator request
    ///
    /// Succeeds without effect if the zone is already pumping.
    pub async fn trigger_pump<S, M>(
        &mut self,
        name: &str,
        now_ms: u64,
        source: &mut S,
        sink: &mut M,
    ) -> Result<(), TriggerError>
    where
        S: AnalogSource,
        M: MetricSink,
    {
        let zone = self
            .zones
            .iter_mut()
            .find(|z| z.name() == name)
            .ok_or(TriggerError::UnknownZone)?;

        let has_water = zone.has_water(source).await;
        self.sensor_faults = self.sensor_faults.saturating_add(zone.take_sensor_faults());
        if !has_water {
            return Err(TriggerError::NoWater);
        }

        zone.start_pumping(now_ms, &mut self.pumps, sink);
        Ok(())
    }
}

impl<P: PumpOutput> Drop for Controller<P> {
    fn drop(&mut self) {
        self.remove_all_zones();
        self.pumps.all_off();
    }
}
