//! Pump activity indicator
//!
//! Lights a status LED while any zone is pumping, driven purely from the
//! `pump-status` metrics the zones already emit.

use heapless::Vec;
use phreatic_core::config::MAX_ZONES;
use phreatic_core::metrics::{GroupName, Metric};
use phreatic_core::traits::MetricSink;
use phreatic_hal::OutputPin;

/// Metric sink that drives an LED from pump-status events
pub struct PumpIndicator<P> {
    led: P,
    /// If true, LED on = pin LOW
    inverted: bool,
    active: Vec<GroupName, MAX_ZONES>,
}

impl<P: OutputPin> PumpIndicator<P> {
    /// Create an indicator with the LED off
    pub fn new(led: P, inverted: bool) -> Self {
        let mut indicator = Self {
            led,
            inverted,
            active: Vec::new(),
        };
        indicator.show();
        indicator
    }

    /// Check whether any zone is reported pumping
    pub fn is_lit(&self) -> bool {
        !self.active.is_empty()
    }

    fn update(&mut self, group: &str, pumping: bool) {
        let key = group_key(group);
        let position = self.active.iter().position(|g| *g == key);
        match (pumping, position) {
            (true, None) => {
                // One entry per configured zone at most
                let tracked = self.active.push(key).is_ok();
                debug_assert!(tracked, "more pumping zones than MAX_ZONES");
            }
            (false, Some(i)) => {
                self.active.swap_remove(i);
            }
            _ => {}
        }
        self.show();
    }

    fn show(&mut self) {
        self.led.set_state(self.is_lit() != self.inverted);
    }
}

impl<P: OutputPin> MetricSink for PumpIndicator<P> {
    fn emit(&mut self, metric: &Metric<'_>) {
        match *metric {
            Metric::PumpStatus { group, status } => self.update(group, status),
            // A new configuration starts with every pump off
            Metric::ConfigLoad { .. } => {
                self.active.clear();
                self.show();
            }
            _ => {}
        }
    }
}

/// Tracking key for a zone name, cut at `MAX_LABEL_LEN` on a char boundary
///
/// Both the on and the off event go through here, so an overlong name still
/// pairs up.
fn group_key(group: &str) -> GroupName {
    let mut key = GroupName::new();
    for c in group.chars() {
        if key.push(c).is_err() {
            break;
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Led(bool);

    impl OutputPin for Led {
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

    fn pump(group: &str, status: bool) -> Metric<'_> {
        Metric::PumpStatus { group, status }
    }

    #[test]
    fn test_lit_while_any_zone_pumps() {
        let mut indicator = PumpIndicator::new(Led(true), false);
        assert!(!indicator.led.is_set_high());

        indicator.emit(&pump("bed1", true));
        indicator.emit(&pump("herbs", true));
        assert!(indicator.led.is_set_high());

        indicator.emit(&pump("bed1", false));
        assert!(indicator.led.is_set_high());

        indicator.emit(&pump("herbs", false));
        assert!(!indicator.led.is_set_high());
    }

    #[test]
    fn test_repeated_status_is_idempotent() {
        let mut indicator = PumpIndicator::new(Led(false), false);
        indicator.emit(&pump("bed1", true));
        indicator.emit(&pump("bed1", true));
        indicator.emit(&pump("bed1", false));
        assert!(!indicator.is_lit());
    }

    #[test]
    fn test_config_load_clears() {
        let mut indicator = PumpIndicator::new(Led(false), false);
        indicator.emit(&pump("bed1", true));
        indicator.emit(&Metric::ConfigLoad { zones: 1 });
        assert!(!indicator.is_lit());
        assert!(!indicator.led.is_set_high());
    }

    #[test]
    fn test_active_low_led() {
        let mut indicator = PumpIndicator::new(Led(false), true);
        assert!(indicator.led.is_set_high());

        indicator.emit(&pump("bed1", true));
        assert!(indicator.led.is_set_low());
    }

    #[test]
    fn test_other_metrics_ignored() {
        let mut indicator = PumpIndicator::new(Led(false), false);
        indicator.emit(&Metric::Water {
            group: "bed1",
            level: 10,
        });
        assert!(!indicator.is_lit());
    }

    #[test]
    fn test_every_zone_tracked_until_last_stops() {
        let names = ["z0", "z1", "z2", "z3", "z4", "z5", "z6", "z7"];
        assert_eq!(names.len(), MAX_ZONES);

        let mut indicator = PumpIndicator::new(Led(false), false);
        for name in names {
            indicator.emit(&pump(name, true));
        }
        for name in &names[..MAX_ZONES - 1] {
            indicator.emit(&pump(name, false));
            assert!(indicator.led.is_set_high());
        }
        indicator.emit(&pump(names[MAX_ZONES - 1], false));
        assert!(!indicator.led.is_set_high());
    }

    #[test]
    fn test_overlong_zone_name_still_clears() {
        let name = "south-greenhouse-bench-2";
        assert!(name.len() > phreatic_core::config::MAX_LABEL_LEN);

        let mut indicator = PumpIndicator::new(Led(false), false);
        indicator.emit(&pump(name, true));
        assert!(indicator.is_lit());

        indicator.emit(&pump(name, false));
        assert!(!indicator.is_lit());
        assert!(!indicator.led.is_set_high());
    }
}
