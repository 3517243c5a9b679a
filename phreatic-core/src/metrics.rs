//! Metric events
//!
//! Every observable thing the controller does is reported as a named,
//! flat key/value event, optionally tagged with the zone ("group") that
//! produced it. Backends decide how to format and deliver them.

use core::cell::Cell;

use heapless::String;

use crate::config::MAX_LABEL_LEN;
use crate::mux::Channel;

/// Maximum build version string carried in a boot record
pub const MAX_VERSION_LEN: usize = 32;

/// System health counters reported periodically by the controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemStats {
    /// Milliseconds since boot
    pub uptime_ms: u64,
    /// Controller passes completed
    pub passes: u32,
    /// Failed sensor reads across all zones
    pub sensor_faults: u32,
    /// Lowest free RAM seen between static data and the stack (bytes)
    pub ram_free: u32,
    /// Deepest stack use seen (bytes)
    pub stack_peak: u32,
    /// Metric events dropped by the logging path
    pub metrics_dropped: u32,
}

/// Stack low-water tracking for [`SystemStats`]
///
/// The stack grows down from `stack_top` towards the end of static data.
/// Each recorded stack pointer lowers the watermark if it is deeper than
/// any seen before.
#[derive(Debug)]
pub struct StackWatermark {
    statics_end: u32,
    stack_top: u32,
    lowest_sp: Cell<u32>,
}

impl StackWatermark {
    /// Track a stack spanning `statics_end..stack_top`
    pub fn new(statics_end: u32, stack_top: u32) -> Self {
        Self {
            statics_end: statics_end.min(stack_top),
            stack_top,
            lowest_sp: Cell::new(stack_top),
        }
    }

    /// Record the current stack pointer
    pub fn record(&self, sp: u32) {
        let sp = sp.clamp(self.statics_end, self.stack_top);
        if sp < self.lowest_sp.get() {
            self.lowest_sp.set(sp);
        }
    }

    /// Lowest free RAM seen, in bytes
    pub fn ram_free(&self) -> u32 {
        self.lowest_sp.get() - self.statics_end
    }

    /// Deepest stack use seen, in bytes
    pub fn stack_peak(&self) -> u32 {
        self.stack_top - self.lowest_sp.get()
    }
}

/// A metric event borrowed from the emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Metric<'a> {
    /// Device started
    Boot {
        ip_address: Option<[u8; 4]>,
        build_version: &'a str,
    },
    /// Periodic health counters
    SystemStats(SystemStats),
    /// A configuration was applied
    ConfigLoad { zones: u8 },
    /// Zone pump switched on or off
    PumpStatus { group: &'a str, status: bool },
    /// One moisture channel reading
    Moisture {
        group: &'a str,
        channel: Channel,
        level: u16,
        min_level: u16,
    },
    /// Reservoir water level reading
    Water { group: &'a str, level: u16 },
    /// Result of a zone's moisture evaluation
    MoistureAlarmStatus { group: &'a str, status: bool },
}

impl<'a> Metric<'a> {
    /// Metric name as reported to backends
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Boot { .. } => "boot",
            Metric::SystemStats(_) => "system-stats",
            Metric::ConfigLoad { .. } => "config-load",
            Metric::PumpStatus { .. } => "pump-status",
            Metric::Moisture { .. } => "moisture",
            Metric::Water { .. } => "water",
            Metric::MoistureAlarmStatus { .. } => "moisture-alarm-status",
        }
    }

    /// Zone the metric belongs to, if any
    pub fn group(&self) -> Option<&'a str> {
        match *self {
            Metric::PumpStatus { group, .. }
            | Metric::Moisture { group, .. }
            | Metric::Water { group, .. }
            | Metric::MoistureAlarmStatus { group, .. } => Some(group),
            Metric::Boot { .. } | Metric::SystemStats(_) | Metric::ConfigLoad { .. } => None,
        }
    }
}

/// Zone name stored in an owned record
pub type GroupName = String<MAX_LABEL_LEN>;

/// Owned copy of a [`Metric`]
///
/// Used where an event has to outlive the zone that produced it, such as
/// the queue between the controller task and a logging task.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MetricRecord {
    Boot {
        ip_address: Option<[u8; 4]>,
        build_version: String<MAX_VERSION_LEN>,
    },
    SystemStats(SystemStats),
    ConfigLoad {
        zones: u8,
    },
    PumpStatus {
        group: GroupName,
        status: bool,
    },
    Moisture {
        group: GroupName,
        channel: Channel,
        level: u16,
        min_level: u16,
    },
    Water {
        group: GroupName,
        level: u16,
    },
    MoistureAlarmStatus {
        group: GroupName,
        status: bool,
    },
}

impl MetricRecord {
    /// Borrow this record as a [`Metric`]
    pub fn as_metric(&self) -> Metric<'_> {
        match self {
            MetricRecord::Boot {
                ip_address,
                build_version,
            } => Metric::Boot {
                ip_address: *ip_address,
                build_version: build_version.as_str(),
            },
            MetricRecord::SystemStats(stats) => Metric::SystemStats(*stats),
            MetricRecord::ConfigLoad { zones } => Metric::ConfigLoad { zones: *zones },
            MetricRecord::PumpStatus { group, status } => Metric::PumpStatus {
                group: group.as_str(),
                status: *status,
            },
            MetricRecord::Moisture {
                group,
                channel,
                level,
                min_level,
            } => Metric::Moisture {
                group: group.as_str(),
                channel: *channel,
                level: *level,
                min_level: *min_level,
            },
            MetricRecord::Water { group, level } => Metric::Water {
                group: group.as_str(),
                level: *level,
            },
            MetricRecord::MoistureAlarmStatus { group, status } => Metric::MoistureAlarmStatus {
                group: group.as_str(),
                status: *status,
            },
        }
    }
}

impl From<&Metric<'_>> for MetricRecord {
    fn from(metric: &Metric<'_>) -> Self {
        match *metric {
            Metric::Boot {
                ip_address,
                build_version,
            } => MetricRecord::Boot {
                ip_address,
                build_version: truncated(build_version),
            },
            Metric::SystemStats(stats) => MetricRecord::SystemStats(stats),
            Metric::ConfigLoad { zones } => MetricRecord::ConfigLoad { zones },
            Metric::PumpStatus { group, status } => MetricRecord::PumpStatus {
                group: truncated(group),
                status,
            },
            Metric::Moisture {
                group,
                channel,
                level,
                min_level,
            } => MetricRecord::Moisture {
                group: truncated(group),
                channel,
                level,
                min_level,
            },
            Metric::Water { group, level } => MetricRecord::Water {
                group: truncated(group),
                level,
            },
            Metric::MoistureAlarmStatus { group, status } => MetricRecord::MoistureAlarmStatus {
                group: truncated(group),
                status,
            },
        }
    }
}

/// Copy as much of `s` as fits, never splitting a character
fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
