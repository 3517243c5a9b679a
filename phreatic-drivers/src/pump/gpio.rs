//! Pump line on a GPIO, switched directly or through a relay board

use phreatic_core::traits::PumpOutput;
use phreatic_hal::OutputPin;

/// One pump line
///
/// The pin level is the only state kept: the pump is on when the pin sits
/// at its active level. Relay boards that switch on a low input use
/// `active_low`.
pub struct GpioPump<P> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> GpioPump<P> {
    /// Take over `pin` and drive the pump off
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut pump = Self { pin, active_low };
        pump.set_on(false);
        pump
    }

    pub fn is_active_low(&self) -> bool {
        self.active_low
    }
}

impl<P: OutputPin> PumpOutput for GpioPump<P> {
    fn set_on(&mut self, on: bool) {
        self.pin.set_state(on != self.active_low);
    }

    fn is_on(&self) -> bool {
        self.pin.is_set_high() != self.active_low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phreatic_core::{PumpBank, PumpLine};

    /// Relay input that remembers its level
    struct RelayInput(bool);

    impl OutputPin for RelayInput {
        fn set_high(&mut self) {
            self.0 = true;
        }

        fn set_low(&mut self) {
            self.0 = false;
        }

        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_pin_level_follows_wiring() {
        // (active_low, pump on) -> expected pin level
        let cases = [
            (false, false, false),
            (false, true, true),
            (true, false, true),
            (true, true, false),
        ];

        for (active_low, on, level) in cases {
            let mut pump = GpioPump::new(RelayInput(!level), active_low);
            pump.set_on(on);
            assert_eq!(pump.pin.0, level, "active_low={} on={}", active_low, on);
            assert_eq!(pump.is_on(), on);
        }
    }

    #[test]
    fn test_new_drives_off_whatever_the_pin_held() {
        let pump = GpioPump::new(RelayInput(false), true);
        assert!(pump.pin.0, "active-low relay must idle high");
        assert!(!pump.is_on());
        assert!(pump.is_active_low());
    }

    #[test]
    fn test_release_from_bank_switches_relay_off() {
        let mut bank = PumpBank::new();
        bank.add(PumpLine(12), GpioPump::new(RelayInput(true), true))
            .unwrap();
        bank.claim(&[PumpLine(12)]).unwrap();

        bank.set(&[PumpLine(12)], true);
        assert_eq!(bank.is_on(PumpLine(12)), Some(true));

        bank.release(&[PumpLine(12)]);
        assert_eq!(bank.is_on(PumpLine(12)), Some(false));
    }
}
