//! Zone pump state machine
//!
//! Pump actuation is a function of the current state and an event. The
//! zone drives its lines after every transition, so the lines follow the
//! state within one controller pass.

/// Zone pump states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZoneState {
    /// Pump lines off
    #[default]
    Idle,
    /// Pump lines on until the stop deadline or loss of water
    Pumping,
}

/// Events that can change a zone's pump state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZoneEvent {
    /// Moisture alarm with water available, or operator trigger
    StartPumping,
    /// Pump ran for its configured time
    RunTimeElapsed,
    /// Reservoir at or below the minimum level
    WaterExhausted,
    /// Zone removed or configuration replaced
    Released,
}

impl ZoneState {
    /// Check if pump lines should be driven on
    pub fn is_pumping(&self) -> bool {
        matches!(self, ZoneState::Pumping)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: ZoneEvent) -> Self {
        use ZoneEvent::*;
        use ZoneState::*;

        match (self, event) {
            (Idle, StartPumping) => Pumping,
            (Pumping, RunTimeElapsed | WaterExhausted | Released) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        assert_eq!(ZoneState::default(), ZoneState::Idle);
    }

    #[test]
    fn test_start_and_stop() {
        let state = ZoneState::Idle.transition(ZoneEvent::StartPumping);
        assert_eq!(state, ZoneState::Pumping);

        for stop in [
            ZoneEvent::RunTimeElapsed,
            ZoneEvent::WaterExhausted,
            ZoneEvent::Released,
        ] {
            assert_eq!(ZoneState::Pumping.transition(stop), ZoneState::Idle);
        }
    }

    #[test]
    fn test_start_while_pumping_is_noop() {
        let state = ZoneState::Pumping.transition(ZoneEvent::StartPumping);
        assert_eq!(state, ZoneState::Pumping);
    }

    #[test]
    fn test_stop_events_ignored_when_idle() {
        assert_eq!(
            ZoneState::Idle.transition(ZoneEvent::WaterExhausted),
            ZoneState::Idle
        );
    }
}
