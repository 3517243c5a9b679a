//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod button;
pub mod controller;
pub mod metrics;

pub use button::button_task;
pub use controller::{boot_metrics, controller_task, ControllerParts, Sensors};
pub use metrics::metrics_task;
