//! Hardware and collaborator abstraction traits
//!
//! These traits define the interface between the control logic and
//! hardware-specific or backend-specific implementations.

pub mod pump;
pub mod sensor;
pub mod telemetry;

pub use pump::PumpOutput;
pub use sensor::{AnalogSource, SensorError};
pub use telemetry::{MetricSink, SystemProbe};
