//! Phreatic - Irrigation Controller Firmware
//!
//! Main firmware binary for RP2040-based irrigation controllers.
//! Soil-moisture and reservoir probes are read through an analog
//! multiplexer; each configured zone waters itself when it gets dry.
//!
//! Named after the phreatic zone, the saturated layer below the water
//! table.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use phreatic_core::config::{IrrigationConfig, MultiplexerConfig};
use phreatic_core::{ChannelMultiplexer, Controller, MovingAverage, PumpBank};
use phreatic_drivers::pump::GpioPump;
use phreatic_drivers::sink::PumpIndicator;
use phreatic_hal_rp2040::{PinBank, PinError, RemainingPeripherals, RpAnalogInput, RpOutput};

use crate::tasks::{ControllerParts, Sensors};

mod channels;
mod config;
mod probe;
mod tasks;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Phreatic firmware starting...");

    let p = embassy_rp::init(Default::default());
    let (mut pins, rest) = PinBank::split(p);
    info!("Peripherals initialized");

    let config = config::load_config();

    // Pumps first, so every relay is driven to its off level before
    // anything else happens
    let pumps = build_pumps(&config, &mut pins);

    let sensors = match build_sensors(&config.multiplexer, &mut pins, rest) {
        Ok(sensors) => sensors,
        Err(e) => {
            error!("Multiplexer setup failed: {}, watering disabled", e);
            drop(pumps);
            park().await
        }
    };
    info!(
        "Multiplexer ready: settle {}ms, {} sample average",
        config.multiplexer.settle_ms, config.multiplexer.samples
    );

    let indicator = config.status_led.and_then(|led| match pins.output(&led) {
        Ok(pin) => Some(PumpIndicator::new(pin, led.inverted)),
        Err(e) => {
            warn!("Status LED gpio{} unavailable: {}", led.pin, e);
            None
        }
    });

    let mut controller =
        Controller::new(pumps).with_stats_period_ms(config.system_stats_period_ms);
    let mut buffer = tasks::boot_metrics(env!("CARGO_PKG_VERSION"));
    if let Err(e) = controller.apply_config(&config, &mut buffer) {
        error!("Configuration rejected: {}", e);
    }
    info!("{} zones registered", controller.zones().len());

    for zone in &config.zones {
        let Some(button) = &zone.button else {
            continue;
        };
        match pins.button(button) {
            Ok(button) => match tasks::button_task(button, zone.name.clone()) {
                Ok(token) => spawner.spawn(token),
                Err(e) => error!("Cannot spawn button task for {}: {}", zone.name.as_str(), e),
            },
            Err(e) => warn!("Button for zone {} unavailable: {}", zone.name.as_str(), e),
        }
    }

    match tasks::metrics_task(config.instance.clone()) {
        Ok(token) => spawner.spawn(token),
        Err(e) => error!("Cannot spawn metrics task: {}", e),
    }

    let parts = ControllerParts {
        controller,
        sensors,
        indicator,
    };
    match tasks::controller_task(parts, buffer) {
        Ok(token) => spawner.spawn(token),
        Err(e) => error!("Cannot spawn controller task: {}", e),
    }

    info!("All tasks spawned, firmware running");
    park().await
}

/// Build the pump bank from the `[pumps]` lines
///
/// Lines whose pin cannot be taken are left out; zones using them are
/// then rejected when the configuration is applied.
fn build_pumps(config: &IrrigationConfig, pins: &mut PinBank) -> PumpBank<GpioPump<RpOutput>> {
    let mut bank = PumpBank::new();
    for pump in &config.pumps {
        let output = match pins.output(pump) {
            Ok(output) => output,
            Err(e) => {
                warn!("Pump gpio{} unavailable: {}", pump.pin, e);
                continue;
            }
        };
        if let Err(e) = bank.add(pump.line(), GpioPump::new(output, pump.inverted)) {
            warn!("Pump gpio{} not added: {}", pump.pin, e);
        }
    }
    info!("{} pump lines off", bank.lines().count());
    bank
}

/// Build the multiplexer and its averaging layer
fn build_sensors(
    mux: &MultiplexerConfig,
    pins: &mut PinBank,
    rest: RemainingPeripherals,
) -> Result<Sensors, PinError> {
    let [a, b, c] = &mux.select_pins;
    let select = [pins.output(a)?, pins.output(b)?, pins.output(c)?];

    let channel = pins.take_adc_channel(mux.adc_pin)?;
    let adc = Adc::new(rest.adc, Irqs, embassy_rp::adc::Config::default());

    let multiplexer = ChannelMultiplexer::new(select, RpAnalogInput::new(adc, channel), Delay)
        .with_settle_ms(mux.settle_ms);
    Ok(MovingAverage::with_window(
        multiplexer,
        usize::from(mux.samples),
    ))
}

/// Idle forever with a heartbeat
async fn park() -> ! {
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
