//! Zone push-button task
//!
//! One instance per zone with a `button` configured. A debounced press
//! asks the controller to start that zone's pump.

use defmt::*;
use embassy_time::Timer;

use phreatic_core::config::Label;
use phreatic_core::config::MAX_ZONES;
use phreatic_hal_rp2040::RpButton;

use crate::channels::{Command, COMMAND_CHANNEL};

/// Time a press must be held to count
const DEBOUNCE_MS: u64 = 30;

#[embassy_executor::task(pool_size = MAX_ZONES)]
pub async fn button_task(mut button: RpButton, zone: Label) {
    info!("Button task started for zone {}", zone.as_str());

    loop {
        button.wait_for_press().await;
        Timer::after_millis(DEBOUNCE_MS).await;
        if !button.is_pressed() {
            continue;
        }

        info!("Button pressed for zone {}", zone.as_str());
        COMMAND_CHANNEL
            .send(Command::TriggerPump(zone.clone()))
            .await;

        button.wait_for_release().await;
        Timer::after_millis(DEBOUNCE_MS).await;
    }
}
