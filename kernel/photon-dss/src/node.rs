//! Hardware functional blocks of the display subsystem.
//!
//! Signal flows `DssIn -> pipe -> blender -> output`. The write-back pipe
//! sits outside that chain: it captures the output of a blender back into
//! memory and is bound to its source at configuration time.

use core::fmt;

/// Role of a node in the signal graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The memory-side root every pipe is fed from.
    Input,
    /// Video or graphics read pipe.
    Pipe,
    /// Write-back pipe (memory sink).
    WriteBack,
    /// Overlay manager compositing pipes into one stream.
    Blender,
    /// Timing generator driving an external interface.
    Output,
}

/// One hardware block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum NodeId {
    /// Root of the graph.
    DssIn = 0,
    /// Video pipe 1.
    Vid1 = 1,
    /// Video pipe 2.
    Vid2 = 2,
    /// Video pipe 3.
    Vid3 = 3,
    /// Graphics pipe 1.
    Gfx1 = 4,
    /// Write-back pipe.
    Wb = 5,
    /// Blender for LCD1.
    Lcd1 = 6,
    /// Blender for LCD2.
    Lcd2 = 7,
    /// Blender for LCD3.
    Lcd3 = 8,
    /// Blender for the TV path.
    Tv = 9,
    /// Parallel output 1.
    Dpi1 = 10,
    /// Parallel output 2.
    Dpi2 = 11,
    /// Parallel output 3.
    Dpi3 = 12,
    /// HDMI output.
    Hdmi = 13,
    /// Low-resolution analog output on the TV path.
    SdVenc = 14,
}

impl NodeId {
    /// Number of node ids; raw values are dense in `0..COUNT`.
    pub const COUNT: usize = 15;

    /// Every node, in raw-id order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::DssIn,
        Self::Vid1,
        Self::Vid2,
        Self::Vid3,
        Self::Gfx1,
        Self::Wb,
        Self::Lcd1,
        Self::Lcd2,
        Self::Lcd3,
        Self::Tv,
        Self::Dpi1,
        Self::Dpi2,
        Self::Dpi3,
        Self::Hdmi,
        Self::SdVenc,
    ];

    /// Returns the node for a raw id.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }

    /// Dense index, usable for per-node tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Role of this node.
    pub const fn kind(self) -> NodeKind {
        match self {
            Self::DssIn => NodeKind::Input,
            Self::Vid1 | Self::Vid2 | Self::Vid3 | Self::Gfx1 => NodeKind::Pipe,
            Self::Wb => NodeKind::WriteBack,
            Self::Lcd1 | Self::Lcd2 | Self::Lcd3 | Self::Tv => NodeKind::Blender,
            Self::Dpi1 | Self::Dpi2 | Self::Dpi3 | Self::Hdmi | Self::SdVenc => NodeKind::Output,
        }
    }

    /// Returns the block name used in log messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DssIn => "dss-in",
            Self::Vid1 => "vid1",
            Self::Vid2 => "vid2",
            Self::Vid3 => "vid3",
            Self::Gfx1 => "gfx1",
            Self::Wb => "wb",
            Self::Lcd1 => "lcd1",
            Self::Lcd2 => "lcd2",
            Self::Lcd3 => "lcd3",
            Self::Tv => "tv",
            Self::Dpi1 => "dpi1",
            Self::Dpi2 => "dpi2",
            Self::Dpi3 => "dpi3",
            Self::Hdmi => "hdmi",
            Self::SdVenc => "sdvenc",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ids_are_dense() {
        for (i, node) in NodeId::ALL.iter().enumerate() {
            assert_eq!(node.index(), i);
            assert_eq!(NodeId::from_raw(i as u8), Some(*node));
        }
        assert_eq!(NodeId::from_raw(NodeId::COUNT as u8), None);
    }

    #[test]
    fn kinds() {
        assert_eq!(NodeId::DssIn.kind(), NodeKind::Input);
        assert_eq!(NodeId::Gfx1.kind(), NodeKind::Pipe);
        assert_eq!(NodeId::Wb.kind(), NodeKind::WriteBack);
        assert_eq!(NodeId::Tv.kind(), NodeKind::Blender);
        assert_eq!(NodeId::SdVenc.kind(), NodeKind::Output);
        assert_eq!(format!("{}", NodeId::Hdmi), "hdmi");
    }
}
