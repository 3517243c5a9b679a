//! GPIO wrappers implementing the shared HAL traits

use embassy_rp::gpio::{Input, Output};
use phreatic_hal::OutputPin;

/// Push-pull output pin
pub struct RpOutput {
    pin: Output<'static>,
}

impl RpOutput {
    pub fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }
}

impl OutputPin for RpOutput {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Push-button input
pub struct RpButton {
    pin: Input<'static>,
    active_low: bool,
}

impl RpButton {
    pub fn new(pin: Input<'static>, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Check if the button is currently held
    pub fn is_pressed(&self) -> bool {
        self.pin.is_low() == self.active_low
    }

    /// Wait for the next press edge
    pub async fn wait_for_press(&mut self) {
        if self.active_low {
            self.pin.wait_for_falling_edge().await;
        } else {
            self.pin.wait_for_rising_edge().await;
        }
    }

    /// Wait until the button is let go
    pub async fn wait_for_release(&mut self) {
        if self.active_low {
            self.pin.wait_for_high().await;
        } else {
            self.pin.wait_for_low().await;
        }
    }
}
