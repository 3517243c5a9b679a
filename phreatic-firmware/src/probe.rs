//! Runtime health counters for system-stats

use phreatic_core::traits::SystemProbe;
use phreatic_core::StackWatermark;

use crate::channels::metrics_dropped;

// Provided by the cortex-m-rt linker script
extern "C" {
    static __sheap: u8;
    static _stack_start: u8;
}

/// Tracks stack depth against free RAM and reads the metric drop counter
pub struct RamProbe {
    watermark: StackWatermark,
}

impl Default for RamProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl RamProbe {
    pub fn new() -> Self {
        // Only the addresses of the linker symbols are used
        let (statics_end, stack_top) = unsafe {
            (
                core::ptr::addr_of!(__sheap) as u32,
                core::ptr::addr_of!(_stack_start) as u32,
            )
        };
        Self {
            watermark: StackWatermark::new(statics_end, stack_top),
        }
    }

    /// Record the current stack depth
    pub fn sample(&self) {
        self.watermark.record(cortex_m::register::msp::read());
    }
}

impl SystemProbe for RamProbe {
    fn ram_free(&self) -> u32 {
        self.sample();
        self.watermark.ram_free()
    }

    fn stack_peak(&self) -> u32 {
        self.sample();
        self.watermark.stack_peak()
    }

    fn metrics_dropped(&self) -> u32 {
        metrics_dropped()
    }
}
