//! Fan-out to several metric sinks

use heapless::Vec;
use phreatic_core::metrics::Metric;
use phreatic_core::traits::MetricSink;

/// Forwards every metric to up to `N` sinks, in the order they were added
pub struct FanOut<'a, const N: usize> {
    sinks: Vec<&'a mut dyn MetricSink, N>,
}

impl<'a, const N: usize> Default for FanOut<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> FanOut<'a, N> {
    /// Create a fan-out with no sinks
    pub const fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink
    ///
    /// Hands the sink back if the fan-out is full.
    pub fn add(&mut self, sink: &'a mut dyn MetricSink) -> Result<(), &'a mut dyn MetricSink> {
        self.sinks.push(sink)
    }

    /// Builder form of [`FanOut::add`]; a sink that does not fit is ignored
    pub fn with(mut self, sink: &'a mut dyn MetricSink) -> Self {
        let _ = self.sinks.push(sink);
        self
    }

    /// Number of attached sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if no sinks are attached
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl<const N: usize> MetricSink for FanOut<'_, N> {
    fn emit(&mut self, metric: &Metric<'_>) {
        for sink in self.sinks.iter_mut() {
            sink.emit(metric);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);

    impl MetricSink for Counter {
        fn emit(&mut self, _metric: &Metric<'_>) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_every_sink_receives_metric() {
        let mut a = Counter(0);
        let mut b = Counter(0);
        {
            let mut fan: FanOut<'_, 2> = FanOut::new().with(&mut a).with(&mut b);
            assert_eq!(fan.len(), 2);
            fan.emit(&Metric::ConfigLoad { zones: 2 });
            fan.emit(&Metric::Water {
                group: "bed1",
                level: 600,
            });
        }
        assert_eq!(a.0, 2);
        assert_eq!(b.0, 2);
    }

    #[test]
    fn test_full_fan_out_returns_sink() {
        let mut a = Counter(0);
        let mut b = Counter(0);
        let mut fan: FanOut<'_, 1> = FanOut::new();
        assert!(fan.add(&mut a).is_ok());
        assert!(fan.add(&mut b).is_err());
    }

    #[test]
    fn test_empty_fan_out_is_harmless() {
        let mut fan: FanOut<'_, 4> = FanOut::default();
        assert!(fan.is_empty());
        fan.emit(&Metric::ConfigLoad { zones: 0 });
    }
}
