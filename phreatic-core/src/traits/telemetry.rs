//! Metric and health reporting traits

use crate::metrics::Metric;

/// Capability to emit metric events
///
/// The core only ever calls `emit`; delivery, formatting and retries
/// belong to the implementation. Emission cannot fail from the caller's
/// point of view: a backend that cannot deliver must drop or queue the
/// event and account for it locally, so watering decisions never depend
/// on whether logging worked.
pub trait MetricSink {
    /// Emit one metric event
    fn emit(&mut self, metric: &Metric<'_>);
}

impl<T: MetricSink + ?Sized> MetricSink for &mut T {
    fn emit(&mut self, metric: &Metric<'_>) {
        T::emit(self, metric)
    }
}

/// Runtime health counters supplied by the platform
pub trait SystemProbe {
    /// Lowest free RAM seen since boot, in bytes
    fn ram_free(&self) -> u32;

    /// Deepest stack use seen since boot, in bytes
    fn stack_peak(&self) -> u32;

    /// Metric events dropped by the logging path since boot
    fn metrics_dropped(&self) -> u32 {
        0
    }
}
