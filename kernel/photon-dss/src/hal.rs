//! Hardware abstraction consumed by the display controller.
//!
//! The controller decides *what* to program and *when*; register layouts,
//! colour-space conversion, DMA descriptors and PHY setup are behind this
//! trait. Methods take `&self` because hardware I/O is shared state; the
//! controller serializes calls that must not interleave.

use photon_driver_api::standard::ModeInfo;

use crate::irq::DispcIrq;
use crate::node::NodeId;
use crate::request::{
    AdvancedTiming, ClockDivisors, OutputSignal, OverlayParams, PipelineParams, SdVencMode,
};

/// Register-level access to the display subsystem.
pub trait DisplayHal: Send + Sync {
    /// Programs the raster timing of `output`.
    fn set_timing(&self, output: NodeId, timing: &ModeInfo);

    /// Programs interface width, data format and polarities.
    fn set_signal(&self, signal: &OutputSignal);

    /// Programs the clock dividers of `output`.
    fn set_divisors(&self, output: NodeId, divisors: ClockDivisors);

    /// Applies sync-generation details beyond the basic raster.
    fn set_advanced_timing(&self, timing: &AdvancedTiming);

    /// Enables or disables the timing generator of `output`.
    fn enable_output(&self, output: NodeId, enable: bool);

    /// Enables or disables the status bits `mask` on the shared line.
    fn set_irq_enable(&self, mask: DispcIrq, enable: bool);

    /// Latches the shadow registers of `node` at the next frame boundary.
    fn set_go(&self, node: NodeId);

    /// Reads the combined interrupt status word.
    fn read_status(&self) -> u32;

    /// Acknowledges the bits set in `status`.
    fn clear_status(&self, status: u32);

    /// Programs blender background, colour key and blend mode.
    fn set_overlay(&self, params: &OverlayParams);

    /// Programs z-order and alpha of a pipe.
    fn set_pipe_params(&self, params: &PipelineParams);

    /// Line the timing generator of `output` is scanning.
    fn current_line(&self, output: NodeId) -> u32;

    /// Arms the programmed-line interrupt of `output` at `line`.
    fn set_line_interrupt(&self, output: NodeId, line: u32);

    /// Selects the output the write-back pipe captures.
    fn set_wb_source(&self, output: NodeId);

    /// Switches write-back between full-frame and crop-region capture.
    fn set_wb_region_mode(&self, region: bool);

    /// Configures the SD analog encoder.
    fn sdvenc_configure(&self, mode: &SdVencMode);

    /// Enables or disables the SD analog encoder.
    fn sdvenc_enable(&self, enable: bool);
}
