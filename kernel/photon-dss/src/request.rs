//! Typed control requests and their parameter blocks.
//!
//! Applications reach the display controller through
//! `control(handle, DSS_REQUEST, Some(&mut request))`. Each [`DssRequest`]
//! variant carries the parameter block of one operation; `GetErrorStats`
//! is filled in place.

use photon_driver_api::DriverError;
use photon_driver_api::driver::cmd;
use photon_driver_api::standard::{DataFormat, ModeInfo, Standard};
use planck_noalloc::vec::ArrayVec;

use crate::config::{MAX_EDGES, MAX_OUTPUTS};
use crate::graph::Edge;
use crate::node::NodeId;
use crate::stats::ErrorStats;

/// Control command carrying a `&mut DssRequest`.
pub const DSS_REQUEST: u32 = cmd::DRIVER_CMD_BASE;

/// Electrical interface of an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoInterface {
    /// 8-bit 4:2:2 with embedded sync codes.
    Bt656,
    /// 16-bit 4:2:2 with embedded sync codes.
    Bt1120,
    /// 16-bit parallel RGB with discrete syncs.
    Rgb16,
    /// 18-bit parallel RGB with discrete syncs.
    Rgb18,
    /// 24-bit parallel RGB with discrete syncs.
    #[default]
    Rgb24,
    /// HDMI transmitter.
    Hdmi,
    /// Composite/S-video through the SD encoder.
    Analog,
}

impl VideoInterface {
    /// Interfaces that carry sync as in-band codes instead of pulses.
    pub const fn embedded_sync(self) -> bool {
        matches!(self, Self::Bt656 | Self::Bt1120)
    }
}

/// Sync and clock polarities of an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Polarity {
    /// HSYNC asserted high.
    pub hsync_active_high: bool,
    /// VSYNC asserted high.
    pub vsync_active_high: bool,
    /// Data driven on the rising pixel-clock edge.
    pub pixel_clock_rising: bool,
    /// Data-enable asserted high.
    pub data_enable_active_high: bool,
}

impl Default for Polarity {
    fn default() -> Self {
        Self {
            hsync_active_high: true,
            vsync_active_high: true,
            pixel_clock_rising: true,
            data_enable_active_high: true,
        }
    }
}

/// Logic and pixel clock dividers of an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDivisors {
    /// Logic clock divider.
    pub lcd: u8,
    /// Pixel clock divider.
    pub pcd: u8,
}

impl Default for ClockDivisors {
    fn default() -> Self {
        Self { lcd: 1, pcd: 1 }
    }
}

/// Per-output part of a pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputInfo {
    /// The output node.
    pub output: NodeId,
    /// Standard to program; [`Standard::Custom`] uses `custom_timing`.
    pub standard: Standard,
    /// Caller-supplied timing for [`Standard::Custom`].
    pub custom_timing: Option<ModeInfo>,
    /// Electrical interface.
    pub interface: VideoInterface,
    /// Pixel format on the wire.
    pub data_format: DataFormat,
    /// Sync and clock polarities.
    pub polarity: Polarity,
    /// Clock dividers.
    pub divisors: ClockDivisors,
}

impl OutputInfo {
    /// An output running a fixed standard with default signalling.
    pub fn standard(output: NodeId, standard: Standard, interface: VideoInterface) -> Self {
        Self {
            output,
            standard,
            custom_timing: None,
            interface,
            data_format: DataFormat::default(),
            polarity: Polarity::default(),
            divisors: ClockDivisors::default(),
        }
    }
}

/// A complete pipeline configuration: routing plus output setup.
#[derive(Default)]
pub struct DssConfig {
    /// Signal-flow edges.
    pub edges: ArrayVec<Edge, MAX_EDGES>,
    /// Outputs to program and enable.
    pub outputs: ArrayVec<OutputInfo, MAX_OUTPUTS>,
}

impl DssConfig {
    /// Builds a configuration from slices.
    ///
    /// # Errors
    ///
    /// [`DriverError::OutOfRange`] if either slice exceeds its table.
    pub fn new(edges: &[Edge], outputs: &[OutputInfo]) -> Result<Self, DriverError> {
        let mut config = Self::default();
        for &edge in edges {
            config.edges.try_push(edge).map_err(|_| DriverError::OutOfRange)?;
        }
        for &output in outputs {
            config.outputs.try_push(output).map_err(|_| DriverError::OutOfRange)?;
        }
        Ok(config)
    }
}

/// Which layer a transparency colour key is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Key out graphics pixels.
    Graphics,
    /// Key out video pixels.
    Video,
}

/// Transparency colour key of a blender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorKey {
    /// Layer matched.
    pub source: KeySource,
    /// Key colour.
    pub value: u32,
}

/// Panel-level settings of a blender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayParams {
    /// Blender node.
    pub blender: NodeId,
    /// RGB24 background colour.
    pub background_color: u32,
    /// Transparency colour key, if enabled.
    pub color_key: Option<ColorKey>,
    /// Alpha blending instead of colour keying.
    pub alpha_blending: bool,
}

/// Per-pipe blending settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineParams {
    /// Pipe node.
    pub pipe: NodeId,
    /// Stacking order within the blender; higher is on top.
    pub z_order: u8,
    /// Plane-wide alpha.
    pub global_alpha: u8,
    /// Pixels carry pre-multiplied alpha.
    pub premultiplied_alpha: bool,
}

/// Signalling parameters of an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSignal {
    /// Output node.
    pub output: NodeId,
    /// Electrical interface.
    pub interface: VideoInterface,
    /// Pixel format on the wire.
    pub data_format: DataFormat,
    /// Sync and clock polarities.
    pub polarity: Polarity,
}

/// Clock dividers of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisorParams {
    /// Output node.
    pub output: NodeId,
    /// Dividers to program.
    pub divisors: ClockDivisors,
}

/// Timing override and sync-generation details of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvancedTiming {
    /// Output node.
    pub output: NodeId,
    /// Raster timing to program instead of the configured one.
    pub timing: ModeInfo,
    /// HSYNC and VSYNC start on the same pixel.
    pub hvsync_aligned: bool,
    /// Syncs driven on the rising pixel-clock edge.
    pub sync_on_rising_edge: bool,
}

/// Configuration of the SD analog encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdVencMode {
    /// NTSC or PAL.
    pub standard: Standard,
    /// Enabled DAC outputs (bit per DAC).
    pub dac_mask: u8,
}

/// Display controller control request.
pub enum DssRequest {
    /// Store a routing graph and program its outputs.
    SetConfig(DssConfig),
    /// Disable every output and drop the routing graph.
    ClearConfig,
    /// Panel-level blender settings.
    SetOverlayParams(OverlayParams),
    /// Per-pipe blend settings.
    SetPipelineParams(PipelineParams),
    /// Output interface, format and polarities.
    SetOutputSignal(OutputSignal),
    /// Output clock dividers.
    SetPixelClockDivisors(DivisorParams),
    /// Output timing override.
    SetAdvancedTiming(AdvancedTiming),
    /// Filled with a snapshot of the error counters.
    GetErrorStats(ErrorStats),
    /// Reset the counters of one pipe.
    ResetPipeErrors(NodeId),
    /// Configure the SD analog encoder.
    SetSdVencMode(SdVencMode),
    /// Enable or disable the SD analog encoder.
    EnableSdVenc(bool),
}

impl DssRequest {
    /// Short name for log messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetConfig(_) => "set-config",
            Self::ClearConfig => "clear-config",
            Self::SetOverlayParams(_) => "set-overlay-params",
            Self::SetPipelineParams(_) => "set-pipeline-params",
            Self::SetOutputSignal(_) => "set-output-signal",
            Self::SetPixelClockDivisors(_) => "set-pixel-clock-divisors",
            Self::SetAdvancedTiming(_) => "set-advanced-timing",
            Self::GetErrorStats(_) => "get-error-stats",
            Self::ResetPipeErrors(_) => "reset-pipe-errors",
            Self::SetSdVencMode(_) => "set-sdvenc-mode",
            Self::EnableSdVenc(_) => "enable-sdvenc",
        }
    }
}
