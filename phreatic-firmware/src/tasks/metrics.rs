//! Metrics task
//!
//! Drains metric records queued by the controller and logs them on the
//! defmt console.

use defmt::*;

use phreatic_core::config::MAX_INSTANCE_LEN;
use phreatic_core::traits::MetricSink;
use phreatic_drivers::sink::DefmtSink;

use crate::channels::METRIC_CHANNEL;

#[embassy_executor::task]
pub async fn metrics_task(instance: heapless::String<MAX_INSTANCE_LEN>) {
    info!("Metrics task started");

    let mut console = DefmtSink::new(instance.as_str());
    loop {
        let record = METRIC_CHANNEL.receive().await;
        console.emit(&record.as_metric());
    }
}
