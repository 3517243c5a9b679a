//! Cooperative one-shot timer
//!
//! Every periodic action in the controller is gated by one of these. The
//! timer never blocks and never repeats on its own: a caller that sees it
//! elapse must re-arm it to get periodic behavior.
//!
//! Time is passed in explicitly as milliseconds since boot. A `u64` keeps
//! the deadline arithmetic free of wrap-around for the lifetime of the
//! device.

/// Timer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum TimerState {
    /// Never armed: elapses on the first check
    Fresh,
    /// Waiting for the deadline (ms since boot)
    Armed(u64),
    /// Elapsed and observed: stays quiet until re-armed
    Spent,
}

/// One-shot deadline timer
///
/// A freshly created timer fires on its first check, so every scheduled
/// action runs once at start-up before it settles into its period. After
/// a timer has been observed elapsed it reports false until re-armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CooperativeTimer {
    state: TimerState,
}

impl Default for CooperativeTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CooperativeTimer {
    /// Create a timer that reports elapsed on its first check
    pub const fn new() -> Self {
        Self {
            state: TimerState::Fresh,
        }
    }

    /// Arm the timer to elapse `period_ms` after `now_ms`
    pub fn arm(&mut self, now_ms: u64, period_ms: u64) {
        self.state = TimerState::Armed(now_ms.saturating_add(period_ms));
    }

    /// Check whether the timer has elapsed
    ///
    /// Returns true exactly once per arming: on the first call at or after
    /// the deadline, or on the first call ever for a fresh timer. Returns
    /// false without side effects otherwise.
    pub fn has_elapsed(&mut self, now_ms: u64) -> bool {
        match self.state {
            TimerState::Fresh => {
                self.state = TimerState::Spent;
                true
            }
            TimerState::Armed(deadline) if now_ms >= deadline => {
                self.state = TimerState::Spent;
                true
            }
            TimerState::Armed(_) | TimerState::Spent => false,
        }
    }

    /// Check whether a deadline is pending
    pub fn is_armed(&self) -> bool {
        matches!(self.state, TimerState::Armed(_))
    }

    /// Pending deadline in milliseconds since boot
    pub fn deadline_ms(&self) -> Option<u64> {
        match self.state {
            TimerState::Armed(deadline) => Some(deadline),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_timer_fires_immediately() {
        let mut timer = CooperativeTimer::new();
        assert!(!timer.is_armed());
        assert!(timer.has_elapsed(0));
    }

    #[test]
    fn test_armed_timer_waits_for_deadline() {
        let mut timer = CooperativeTimer::new();
        timer.arm(1_000, 500);

        assert!(!timer.has_elapsed(1_000));
        assert!(!timer.has_elapsed(1_499));
        // Nothing consumed before the deadline
        assert_eq!(timer.deadline_ms(), Some(1_500));

        assert!(timer.has_elapsed(1_500));
    }

    #[test]
    fn test_late_check_still_fires() {
        let mut timer = CooperativeTimer::new();
        timer.arm(0, 100);
        assert!(timer.has_elapsed(10_000));
    }

    #[test]
    fn test_fires_once_until_rearmed() {
        let mut timer = CooperativeTimer::new();
        assert!(timer.has_elapsed(0));
        assert!(!timer.has_elapsed(0));

        timer.arm(0, 100);
        assert!(timer.has_elapsed(100));
        assert!(!timer.has_elapsed(100));
        assert!(!timer.has_elapsed(5_000));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_rearm_gives_periodic_behavior() {
        let mut timer = CooperativeTimer::new();
        let mut fired = 0;

        for now in (0..=1_000).step_by(50) {
            if timer.has_elapsed(now) {
                fired += 1;
                timer.arm(now, 250);
            }
        }

        // t = 0, 250, 500, 750, 1000
        assert_eq!(fired, 5);
    }

    #[test]
    fn test_arm_saturates() {
        let mut timer = CooperativeTimer::new();
        timer.arm(u64::MAX - 1, 100);
        assert_eq!(timer.deadline_ms(), Some(u64::MAX));
        assert!(!timer.has_elapsed(u64::MAX - 1));
    }
}
