//! Pump output lines and their ownership
//!
//! The controller owns every pump output through a [`PumpBank`]. A zone
//! never holds an output directly: it claims line numbers from the bank
//! when it is registered and gives them back when it is removed. Every
//! path that gives a line up drives it off first, and so does dropping the
//! bank.

use core::fmt;

use heapless::Vec;

use crate::traits::PumpOutput;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum pump outputs on one board
pub const MAX_PUMP_LINES: usize = 8;

/// Board pump output line, identified by its GPIO number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PumpLine(pub u8);

impl PumpLine {
    /// Line number
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PumpLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pump bank errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PumpError {
    /// No output registered for this line
    UnknownLine(PumpLine),
    /// Line already claimed by a zone
    AlreadyClaimed(PumpLine),
    /// Line registered twice
    Duplicate(PumpLine),
    /// Bank capacity exceeded
    Full,
}

struct Slot<P> {
    line: PumpLine,
    output: P,
    claimed: bool,
}

/// Set of pump outputs owned by the controller
pub struct PumpBank<P: PumpOutput> {
    slots: Vec<Slot<P>, MAX_PUMP_LINES>,
}

impl<P: PumpOutput> Default for PumpBank<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PumpOutput> PumpBank<P> {
    /// Create an empty bank
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register an output for `line`
    ///
    /// The output is driven off immediately, before anything can claim it.
    pub fn add(&mut self, line: PumpLine, mut output: P) -> Result<(), PumpError> {
        if self.slot(line).is_some() {
            return Err(PumpError::Duplicate(line));
        }
        output.set_on(false);
        self.slots
            .push(Slot {
                line,
                output,
                claimed: false,
            })
            .map_err(|_| PumpError::Full)
    }

    /// Check whether an output is registered for `line`
    pub fn contains(&self, line: PumpLine) -> bool {
        self.slot(line).is_some()
    }

    /// Check whether `line` is claimed by a zone
    pub fn is_claimed(&self, line: PumpLine) -> bool {
        self.slot(line).is_some_and(|s| s.claimed)
    }

    /// Logical state of `line`, or `None` if it is not registered
    pub fn is_on(&self, line: PumpLine) -> Option<bool> {
        self.slot(line).map(|s| s.output.is_on())
    }

    /// Registered lines in registration order
    pub fn lines(&self) -> impl Iterator<Item = PumpLine> + '_ {
        self.slots.iter().map(|s| s.line)
    }

    /// Claim every line in `lines`
    ///
    /// Either all lines are claimed or none are.
    pub fn claim(&mut self, lines: &[PumpLine]) -> Result<(), PumpError> {
        for (i, &line) in lines.iter().enumerate() {
            let slot = self.slot(line).ok_or(PumpError::UnknownLine(line))?;
            if slot.claimed || lines[..i].contains(&line) {
                return Err(PumpError::AlreadyClaimed(line));
            }
        }
        for &line in lines {
            if let Some(slot) = self.slot_mut(line) {
                slot.claimed = true;
            }
        }
        Ok(())
    }

    /// Drive `lines` off and return them to the bank
    pub fn release(&mut self, lines: &[PumpLine]) {
        for &line in lines {
            if let Some(slot) = self.slot_mut(line) {
                slot.output.set_on(false);
                slot.claimed = false;
            }
        }
    }

    /// Drive every line in `lines` on or off
    ///
    /// Unregistered lines are skipped.
    pub fn set(&mut self, lines: &[PumpLine], on: bool) {
        for &line in lines {
            if let Some(slot) = self.slot_mut(line) {
                slot.output.set_on(on);
            }
        }
    }

    /// Drive every registered line off
    pub fn all_off(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.output.set_on(false);
        }
    }

    fn slot(&self, line: PumpLine) -> Option<&Slot<P>> {
        self.slots.iter().find(|s| s.line == line)
    }

    fn slot_mut(&mut self, line: PumpLine) -> Option<&mut Slot<P>> {
        self.slots.iter_mut().find(|s| s.line == line)
    }
}

impl<P: PumpOutput> Drop for PumpBank<P> {
    fn drop(&mut self) {
        self.all_off();
    }
}
