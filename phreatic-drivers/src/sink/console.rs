//! defmt console backend
//!
//! Logs every metric over the RTT link as one `key=value` line, tagged
//! with the instance name and, where present, the zone.

use phreatic_core::metrics::Metric;
use phreatic_core::traits::MetricSink;

/// Metric sink that logs through defmt
pub struct DefmtSink<'a> {
    instance: &'a str,
}

impl<'a> DefmtSink<'a> {
    /// Create a console sink for the named instance
    pub const fn new(instance: &'a str) -> Self {
        Self { instance }
    }

    /// Instance name prefixed to every line
    pub fn instance(&self) -> &str {
        self.instance
    }
}

impl MetricSink for DefmtSink<'_> {
    fn emit(&mut self, metric: &Metric<'_>) {
        let instance = self.instance;
        match *metric {
            Metric::Boot {
                ip_address,
                build_version,
            } => match ip_address {
                Some([a, b, c, d]) => defmt::info!(
                    "{} boot version={} ip={}.{}.{}.{}",
                    instance,
                    build_version,
                    a,
                    b,
                    c,
                    d
                ),
                None => defmt::info!("{} boot version={}", instance, build_version),
            },
            Metric::SystemStats(stats) => defmt::info!(
                "{} system-stats uptime_ms={} passes={} sensor_faults={} ram_free={} stack_peak={} metrics_dropped={}",
                instance,
                stats.uptime_ms,
                stats.passes,
                stats.sensor_faults,
                stats.ram_free,
                stats.stack_peak,
                stats.metrics_dropped
            ),
            Metric::ConfigLoad { zones } => {
                defmt::info!("{} config-load zones={}", instance, zones)
            }
            Metric::PumpStatus { group, status } => {
                defmt::info!("{} pump-status group={} status={}", instance, group, status)
            }
            Metric::Moisture {
                group,
                channel,
                level,
                min_level,
            } => defmt::info!(
                "{} moisture group={} channel={} level={} min_level={}",
                instance,
                group,
                channel.index(),
                level,
                min_level
            ),
            Metric::Water { group, level } => {
                defmt::info!("{} water group={} level={}", instance, group, level)
            }
            Metric::MoistureAlarmStatus { group, status } => defmt::info!(
                "{} moisture-alarm-status group={} status={}",
                instance,
                group,
                status
            ),
        }
    }
}
