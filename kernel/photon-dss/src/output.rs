//! Output timing resolution and per-output runtime state.

use photon_driver_api::DriverError;
use photon_driver_api::standard::{ModeInfo, ScanFormat, Standard, standard_info};

use crate::node::NodeId;
use crate::request::OutputInfo;

/// Geometry of a configured output, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputPathInfo {
    /// The output is enabled.
    pub running: bool,
    /// Interlaced or progressive.
    pub scan_format: ScanFormat,
    /// Programmed standard.
    pub standard: Standard,
    /// Active width in pixels.
    pub width: u32,
    /// Active height in lines.
    pub height: u32,
}

/// Path information of one pipe: the output it feeds and the position
/// correction to apply when placing its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathInfo {
    /// Output fed by the pipe.
    pub output: NodeId,
    /// Geometry of that output.
    pub info: OutputPathInfo,
    /// Horizontal position shift applied to the pipe window.
    pub position_shift: u32,
}

/// Timing the controller actually programs for `info`.
///
/// [`Standard::Custom`] takes the caller's timing block; every other
/// standard comes from the mode table. Embedded-sync interfaces carrying
/// NTSC or PAL run the ITU-R BT.656 raster at the 27 MHz byte clock.
///
/// # Errors
///
/// [`DriverError::InvalidParams`] for a custom standard without a timing
/// block, or a standard the mode table does not know.
pub fn resolve_timing(info: &OutputInfo) -> Result<ModeInfo, DriverError> {
    let timing = match (info.standard, info.custom_timing) {
        (Standard::Custom, Some(custom)) => custom,
        (Standard::Custom, None) => return Err(DriverError::InvalidParams),
        (standard, _) => *standard_info(standard).ok_or(DriverError::InvalidParams)?,
    };
    if info.interface.embedded_sync() {
        if let Some(itu) = embedded_sync_timing(timing.standard) {
            return Ok(itu);
        }
    }
    Ok(timing)
}

/// BT.656 raster for the SD standards, `None` for the rest.
pub fn embedded_sync_timing(standard: Standard) -> Option<ModeInfo> {
    let base = *standard_info(standard)?;
    let (h, v) = match standard {
        Standard::Ntsc => ([16, 62, 60], [4, 3, 15]),
        Standard::Pal => ([12, 64, 68], [2, 3, 19]),
        _ => return None,
    };
    Some(ModeInfo {
        pixel_clock_khz: 27_000,
        hfp: h[0],
        hsw: h[1],
        hbp: h[2],
        vfp: v[0],
        vsw: v[1],
        vbp: v[2],
        ..base
    })
}

/// Runtime state of one configured output.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutputState {
    pub node: NodeId,
    pub blender: Option<NodeId>,
    pub config: OutputInfo,
    pub timing: ModeInfo,
    pub running: bool,
    /// Cleared at the programmed line, re-armed at the next vsync.
    pub safe_to_push: bool,
}

impl OutputState {
    pub fn new(config: OutputInfo, timing: ModeInfo, blender: Option<NodeId>) -> Self {
        Self {
            node: config.output,
            blender,
            config,
            timing,
            running: false,
            safe_to_push: true,
        }
    }

    pub fn path_info(&self) -> OutputPathInfo {
        OutputPathInfo {
            running: self.running,
            scan_format: self.timing.scan_format,
            standard: self.timing.standard,
            width: self.timing.width,
            height: self.timing.height,
        }
    }
}
