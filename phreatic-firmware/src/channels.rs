//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::{AtomicU32, Ordering};

use phreatic_core::config::Label;
use phreatic_core::MetricRecord;

/// Channel capacity for operator commands
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for metric records on their way to the console
pub const METRIC_CHANNEL_SIZE: usize = 32;

/// Operator requests applied by the controller task between passes
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Start a zone's pump now, if it has water
    TriggerPump(Label),
}

/// Commands from button tasks to the controller
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Metric records from the controller to the metrics task
pub static METRIC_CHANNEL: Channel<CriticalSectionRawMutex, MetricRecord, METRIC_CHANNEL_SIZE> =
    Channel::new();

/// Metric records dropped on the way to the metrics task
pub static METRICS_DROPPED: AtomicU32 = AtomicU32::new(0);

/// Record the drop counter of the controller's queue
pub fn set_metrics_dropped(count: u32) {
    METRICS_DROPPED.store(count, Ordering::Relaxed);
}

pub fn metrics_dropped() -> u32 {
    METRICS_DROPPED.load(Ordering::Relaxed)
}
