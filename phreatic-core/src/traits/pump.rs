//! Pump output trait

/// Trait for pump output control
///
/// Implementations drive a pump via a GPIO pin, relay or MOSFET. `on` is
/// the logical pump state; active-low wiring is the implementation's job.
pub trait PumpOutput {
    /// Turn the pump on or off
    fn set_on(&mut self, on: bool);

    /// Check if the pump is currently on
    fn is_on(&self) -> bool;
}
