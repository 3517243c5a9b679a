//! Irrigation zones and their pump state machine

pub mod group;
pub mod state;

pub use group::Zone;
pub use state::{ZoneEvent, ZoneState};
