//! Controller task
//!
//! Runs a controller pass every [`PASS_INTERVAL_MS`] and applies operator
//! commands in between. Metrics are buffered during the pass and handed
//! to the metrics task afterwards, so a slow console never stalls
//! watering.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Delay, Duration, Instant, Ticker};

use phreatic_core::config::MAX_AVERAGE_SAMPLES;
use phreatic_core::{ChannelMultiplexer, Controller, Metric, MovingAverage, TriggerError};
use phreatic_core::traits::MetricSink;
use phreatic_drivers::pump::GpioPump;
use phreatic_drivers::sink::{BufferedSink, FanOut, PumpIndicator};
use phreatic_hal_rp2040::{RpAnalogInput, RpOutput};

use crate::channels::{set_metrics_dropped, Command, COMMAND_CHANNEL, METRIC_CHANNEL, METRIC_CHANNEL_SIZE};
use crate::probe::RamProbe;

/// Controller pass interval in milliseconds
pub const PASS_INTERVAL_MS: u64 = 100;

/// Sensor source: the multiplexer behind an optional moving average
pub type Sensors = MovingAverage<
    ChannelMultiplexer<RpOutput, RpAnalogInput, Delay>,
    { MAX_AVERAGE_SAMPLES as usize },
>;

/// Everything the controller task owns
pub struct ControllerParts {
    pub controller: Controller<GpioPump<RpOutput>>,
    pub sensors: Sensors,
    pub indicator: Option<PumpIndicator<RpOutput>>,
}

/// Metrics queued during one pass before they are handed over
pub type PassBuffer = BufferedSink<METRIC_CHANNEL_SIZE>;

/// Controller task - main watering loop
///
/// `buffer` arrives holding the boot and config-load records.
#[embassy_executor::task]
pub async fn controller_task(parts: ControllerParts, mut buffer: PassBuffer) {
    info!("Controller task started");

    let ControllerParts {
        mut controller,
        mut sensors,
        mut indicator,
    } = parts;
    let probe = RamProbe::new();
    let start = Instant::now();
    let mut ticker = Ticker::every(Duration::from_millis(PASS_INTERVAL_MS));

    flush(&mut buffer);

    loop {
        let event = select(COMMAND_CHANNEL.receive(), ticker.next()).await;
        let now_ms = start.elapsed().as_millis();

        let mut sink = FanOut::<'_, 2>::new().with(&mut buffer);
        if let Some(led) = indicator.as_mut() {
            sink = sink.with(led);
        }

        match event {
            Either::First(Command::TriggerPump(zone)) => {
                match controller
                    .trigger_pump(zone.as_str(), now_ms, &mut sensors, &mut sink)
                    .await
                {
                    Ok(()) => info!("Operator started pump for zone {}", zone.as_str()),
                    Err(TriggerError::NoWater) => {
                        warn!("Zone {} has no water, pump not started", zone.as_str())
                    }
                    Err(TriggerError::UnknownZone) => {
                        warn!("Trigger for unknown zone {}", zone.as_str())
                    }
                }
            }
            Either::Second(()) => {
                controller.pass(now_ms, &mut sensors, &mut sink, &probe).await;
            }
        }
        probe.sample();

        drop(sink);
        flush(&mut buffer);
    }
}

/// Hand queued metrics to the metrics task without waiting
///
/// Records that do not fit stay queued for the next pass; if they pile up
/// the buffer drops the oldest and counts them.
fn flush(buffer: &mut PassBuffer) {
    while let Some(record) = buffer.front() {
        if METRIC_CHANNEL.try_send(record.clone()).is_err() {
            break;
        }
        buffer.pop();
    }
    set_metrics_dropped(buffer.dropped());
}

/// Queue the boot record ahead of the first pass
pub fn boot_metrics(build_version: &str) -> PassBuffer {
    let mut buffer = PassBuffer::new();
    buffer.emit(&Metric::Boot {
        ip_address: None,
        build_version,
    });
    buffer
}
