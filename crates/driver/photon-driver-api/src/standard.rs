//! Video standards, scan formats and pixel data formats.
//!
//! [`standard_info`] is the timing table the display controller programs
//! outputs from when the application selects a standard instead of
//! supplying a custom timing block.

use core::fmt;

/// Interlaced or progressive scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanFormat {
    /// Two fields per frame.
    Interlaced,
    /// One frame per refresh.
    #[default]
    Progressive,
}

/// Video standards known to the timing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum Standard {
    Ntsc,
    Pal,
    P480,
    P576,
    P720_60,
    P720_50,
    I1080_60,
    I1080_50,
    P1080_60,
    P1080_50,
    P1080_30,
    P1080_24,
    Vga60,
    Svga60,
    Xga60,
    Wxga60,
    Sxga60,
    /// Timing supplied by the caller.
    #[default]
    Custom,
}

impl Standard {
    /// Returns the standard's short name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ntsc => "NTSC",
            Self::Pal => "PAL",
            Self::P480 => "480P",
            Self::P576 => "576P",
            Self::P720_60 => "720P60",
            Self::P720_50 => "720P50",
            Self::I1080_60 => "1080I60",
            Self::I1080_50 => "1080I50",
            Self::P1080_60 => "1080P60",
            Self::P1080_50 => "1080P50",
            Self::P1080_30 => "1080P30",
            Self::P1080_24 => "1080P24",
            Self::Vga60 => "VGA60",
            Self::Svga60 => "SVGA60",
            Self::Xga60 => "XGA60",
            Self::Wxga60 => "WXGA60",
            Self::Sxga60 => "SXGA60",
            Self::Custom => "CUSTOM",
        }
    }

    /// Returns `true` for the 525/625-line analog-derived standards.
    pub const fn is_sd(self) -> bool {
        matches!(self, Self::Ntsc | Self::Pal)
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complete raster timing of an output.
///
/// Vertical values are per field for interlaced modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeInfo {
    /// Standard this timing belongs to.
    pub standard: Standard,
    /// Active pixels per line.
    pub width: u32,
    /// Active lines per frame.
    pub height: u32,
    /// Interlaced or progressive.
    pub scan_format: ScanFormat,
    /// Pixel clock in kHz.
    pub pixel_clock_khz: u32,
    /// Frames per second.
    pub fps: u32,
    /// Horizontal front porch.
    pub hfp: u32,
    /// Horizontal sync width.
    pub hsw: u32,
    /// Horizontal back porch.
    pub hbp: u32,
    /// Vertical front porch.
    pub vfp: u32,
    /// Vertical sync width.
    pub vsw: u32,
    /// Vertical back porch.
    pub vbp: u32,
}

impl ModeInfo {
    /// Pixels per line including blanking.
    pub const fn h_total(&self) -> u32 {
        self.width + self.hfp + self.hsw + self.hbp
    }
}

#[allow(clippy::too_many_arguments)]
const fn mode(
    standard: Standard,
    width: u32,
    height: u32,
    scan_format: ScanFormat,
    pixel_clock_khz: u32,
    fps: u32,
    h: [u32; 3],
    v: [u32; 3],
) -> ModeInfo {
    ModeInfo {
        standard,
        width,
        height,
        scan_format,
        pixel_clock_khz,
        fps,
        hfp: h[0],
        hsw: h[1],
        hbp: h[2],
        vfp: v[0],
        vsw: v[1],
        vbp: v[2],
    }
}

use ScanFormat::{Interlaced as I, Progressive as P};

static MODES: [ModeInfo; 17] = [
    mode(Standard::Ntsc, 720, 480, I, 13_500, 30, [19, 62, 57], [4, 3, 15]),
    mode(Standard::Pal, 720, 576, I, 13_500, 25, [12, 63, 69], [2, 3, 19]),
    mode(Standard::P480, 720, 480, P, 27_000, 60, [16, 62, 60], [9, 6, 30]),
    mode(Standard::P576, 720, 576, P, 27_000, 50, [12, 64, 68], [5, 5, 39]),
    mode(Standard::P720_60, 1280, 720, P, 74_250, 60, [110, 40, 220], [5, 5, 20]),
    mode(Standard::P720_50, 1280, 720, P, 74_250, 50, [440, 40, 220], [5, 5, 20]),
    mode(Standard::I1080_60, 1920, 1080, I, 74_250, 30, [88, 44, 148], [2, 5, 15]),
    mode(Standard::I1080_50, 1920, 1080, I, 74_250, 25, [528, 44, 148], [2, 5, 15]),
    mode(Standard::P1080_60, 1920, 1080, P, 148_500, 60, [88, 44, 148], [4, 5, 36]),
    mode(Standard::P1080_50, 1920, 1080, P, 148_500, 50, [528, 44, 148], [4, 5, 36]),
    mode(Standard::P1080_30, 1920, 1080, P, 74_250, 30, [88, 44, 148], [4, 5, 36]),
    mode(Standard::P1080_24, 1920, 1080, P, 74_250, 24, [638, 44, 148], [4, 5, 36]),
    mode(Standard::Vga60, 640, 480, P, 25_175, 60, [16, 96, 48], [10, 2, 33]),
    mode(Standard::Svga60, 800, 600, P, 40_000, 60, [40, 128, 88], [1, 4, 23]),
    mode(Standard::Xga60, 1024, 768, P, 65_000, 60, [24, 136, 160], [3, 6, 29]),
    mode(Standard::Wxga60, 1280, 800, P, 83_500, 60, [72, 128, 200], [3, 6, 22]),
    mode(Standard::Sxga60, 1280, 1024, P, 108_000, 60, [48, 112, 248], [1, 3, 38]),
];

/// Looks up the timing of a standard; `None` for [`Standard::Custom`].
pub fn standard_info(standard: Standard) -> Option<&'static ModeInfo> {
    MODES.iter().find(|m| m.standard == standard)
}

/// Pixel data formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum DataFormat {
    Yuv422iUyvy,
    #[default]
    Yuv422iYuyv,
    Yuv422spUv,
    Yuv420spUv,
    Yuv420spVu,
    Yuv444i,
    Rgb16_565,
    Rgb24_888,
    Bgr24_888,
    Argb32_8888,
    Rgba32_8888,
    Xrgb32_8888,
    Bitmap8,
}

impl DataFormat {
    /// Returns the format's short name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Yuv422iUyvy => "YUV422I_UYVY",
            Self::Yuv422iYuyv => "YUV422I_YUYV",
            Self::Yuv422spUv => "YUV422SP_UV",
            Self::Yuv420spUv => "YUV420SP_UV",
            Self::Yuv420spVu => "YUV420SP_VU",
            Self::Yuv444i => "YUV444I",
            Self::Rgb16_565 => "RGB16_565",
            Self::Rgb24_888 => "RGB24_888",
            Self::Bgr24_888 => "BGR24_888",
            Self::Argb32_8888 => "ARGB32_8888",
            Self::Rgba32_8888 => "RGBA32_8888",
            Self::Xrgb32_8888 => "XRGB32_8888",
            Self::Bitmap8 => "BITMAP8",
        }
    }

    /// 4:2:2 formats, interleaved or semi-planar.
    pub const fn is_yuv422(self) -> bool {
        matches!(self, Self::Yuv422iUyvy | Self::Yuv422iYuyv | Self::Yuv422spUv)
    }

    /// 4:2:0 semi-planar formats.
    pub const fn is_yuv420(self) -> bool {
        matches!(self, Self::Yuv420spUv | Self::Yuv420spVu)
    }

    /// Any YUV format.
    pub const fn is_yuv(self) -> bool {
        self.is_yuv422() || self.is_yuv420() || matches!(self, Self::Yuv444i)
    }

    /// Any RGB format, with or without alpha.
    pub const fn is_rgb(self) -> bool {
        matches!(
            self,
            Self::Rgb16_565
                | Self::Rgb24_888
                | Self::Bgr24_888
                | Self::Argb32_8888
                | Self::Rgba32_8888
                | Self::Xrgb32_8888
        )
    }

    /// Formats whose luma and chroma live in separate planes.
    pub const fn is_semi_planar(self) -> bool {
        matches!(self, Self::Yuv422spUv | Self::Yuv420spUv | Self::Yuv420spVu)
    }

    /// Bytes per pixel of the first plane.
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Yuv422spUv | Self::Yuv420spUv | Self::Yuv420spVu | Self::Bitmap8 => 1,
            Self::Yuv422iUyvy | Self::Yuv422iYuyv | Self::Rgb16_565 => 2,
            Self::Yuv444i | Self::Rgb24_888 | Self::Bgr24_888 => 3,
            Self::Argb32_8888 | Self::Rgba32_8888 | Self::Xrgb32_8888 => 4,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
