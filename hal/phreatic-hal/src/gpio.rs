//! GPIO pin abstractions
//!
//! Digital outputs drive the multiplexer select lines and the pump
//! MOSFETs/relays. Writes are infallible on every supported chip.

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn set_high(&mut self) {
        T::set_high(self)
    }

    fn set_low(&mut self) {
        T::set_low(self)
    }

    fn is_set_high(&self) -> bool {
        T::is_set_high(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch(bool);

    impl OutputPin for Latch {
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
    fn test_set_state() {
        let mut pin = Latch(false);
        pin.set_state(true);
        assert!(pin.is_set_high());
        pin.set_state(false);
        assert!(pin.is_set_low());
    }

    #[test]
    fn test_forwarding_through_reference() {
        fn drive<P: OutputPin>(mut pin: P) -> bool {
            pin.set_high();
            pin.is_set_high()
        }

        let mut pin = Latch(false);
        assert!(drive(&mut pin));
        assert!(pin.0);
    }
}
