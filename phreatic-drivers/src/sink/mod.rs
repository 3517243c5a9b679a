//! Metric sink implementations

pub mod buffered;
#[cfg(feature = "defmt")]
pub mod console;
pub mod fanout;
pub mod indicator;

pub use buffered::BufferedSink;
#[cfg(feature = "defmt")]
pub use console::DefmtSink;
pub use fanout::FanOut;
pub use indicator::PumpIndicator;
