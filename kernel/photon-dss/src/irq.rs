//! Layout of the shared display interrupt status word.
//!
//! One interrupt line serves every blender, output and the write-back
//! path. This module names the status bits and maps nodes to the bits that
//! concern them; the demultiplexing itself lives in the controller.

use bitflags::bitflags;

use crate::node::NodeId;

bitflags! {
    /// Display controller interrupt status / enable bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DispcIrq: u32 {
        /// LCD1 frame done.
        const FRAMEDONE1 = 1 << 0;
        /// LCD1 vertical sync.
        const VSYNC1 = 1 << 1;
        /// TV even-field sync.
        const EVSYNC_EVEN = 1 << 2;
        /// TV odd-field sync.
        const EVSYNC_ODD = 1 << 3;
        /// LCD1 programmed line reached.
        const PROG_LINE1 = 1 << 5;
        /// GFX1 pipe FIFO underflow.
        const GFX1_UNDERFLOW = 1 << 6;
        /// Interconnect (bus) error.
        const OCP_ERR = 1 << 9;
        /// VID1 pipe FIFO underflow.
        const VID1_UNDERFLOW = 1 << 10;
        /// VID2 pipe FIFO underflow.
        const VID2_UNDERFLOW = 1 << 12;
        /// LCD1 sync lost.
        const SYNCLOST1 = 1 << 14;
        /// TV sync lost.
        const SYNCLOST_TV = 1 << 15;
        /// LCD2 sync lost.
        const SYNCLOST2 = 1 << 17;
        /// LCD2 vertical sync.
        const VSYNC2 = 1 << 18;
        /// LCD2 programmed line reached.
        const PROG_LINE2 = 1 << 19;
        /// VID3 pipe FIFO underflow.
        const VID3_UNDERFLOW = 1 << 20;
        /// LCD3 programmed line reached.
        const PROG_LINE3 = 1 << 21;
        /// LCD2 frame done.
        const FRAMEDONE2 = 1 << 22;
        /// Write-back frame (or field) captured.
        const WB_SYNC = 1 << 23;
        /// TV frame done.
        const FRAMEDONE_TV = 1 << 24;
        /// Write-back FIFO overflow.
        const WB_OVERFLOW = 1 << 25;
        /// Write-back frame incomplete.
        const WB_INCOMPLETE = 1 << 26;
        /// LCD3 sync lost.
        const SYNCLOST3 = 1 << 27;
        /// LCD3 vertical sync.
        const VSYNC3 = 1 << 28;
        /// TV programmed line reached.
        const PROG_LINE_TV = 1 << 29;
        /// LCD3 frame done.
        const FRAMEDONE3 = 1 << 30;
        /// Write-back crop window end reached.
        const WB_REGION_END = 1 << 31;
    }
}

/// Status bits of one blender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlenderIrq {
    /// Frame-complete or sync events; any of them fires the pipe callback.
    pub frame: DispcIrq,
    /// Start-of-frame events that re-arm "safe to push".
    pub vsync: DispcIrq,
    /// Programmed line reached; clears "safe to push".
    pub line: DispcIrq,
    /// Timing generator lost sync.
    pub sync_lost: DispcIrq,
}

/// Returns the status bits of `blender`, or `None` for other nodes.
pub const fn blender_irq(blender: NodeId) -> Option<BlenderIrq> {
    let irq = match blender {
        NodeId::Lcd1 => BlenderIrq {
            frame: DispcIrq::FRAMEDONE1.union(DispcIrq::VSYNC1),
            vsync: DispcIrq::VSYNC1,
            line: DispcIrq::PROG_LINE1,
            sync_lost: DispcIrq::SYNCLOST1,
        },
        NodeId::Lcd2 => BlenderIrq {
            frame: DispcIrq::FRAMEDONE2.union(DispcIrq::VSYNC2),
            vsync: DispcIrq::VSYNC2,
            line: DispcIrq::PROG_LINE2,
            sync_lost: DispcIrq::SYNCLOST2,
        },
        NodeId::Lcd3 => BlenderIrq {
            frame: DispcIrq::FRAMEDONE3.union(DispcIrq::VSYNC3),
            vsync: DispcIrq::VSYNC3,
            line: DispcIrq::PROG_LINE3,
            sync_lost: DispcIrq::SYNCLOST3,
        },
        NodeId::Tv => BlenderIrq {
            frame: DispcIrq::FRAMEDONE_TV
                .union(DispcIrq::EVSYNC_EVEN)
                .union(DispcIrq::EVSYNC_ODD),
            vsync: DispcIrq::EVSYNC_EVEN.union(DispcIrq::EVSYNC_ODD),
            line: DispcIrq::PROG_LINE_TV,
            sync_lost: DispcIrq::SYNCLOST_TV,
        },
        _ => return None,
    };
    Some(irq)
}

/// Underflow bit of a read pipe, or `None` for other nodes.
pub const fn underflow_bit(pipe: NodeId) -> Option<DispcIrq> {
    match pipe {
        NodeId::Vid1 => Some(DispcIrq::VID1_UNDERFLOW),
        NodeId::Vid2 => Some(DispcIrq::VID2_UNDERFLOW),
        NodeId::Vid3 => Some(DispcIrq::VID3_UNDERFLOW),
        NodeId::Gfx1 => Some(DispcIrq::GFX1_UNDERFLOW),
        _ => None,
    }
}

/// Status bits enabled for the write-back path.
pub const WB_EVENTS: DispcIrq = DispcIrq::WB_SYNC
    .union(DispcIrq::WB_REGION_END)
    .union(DispcIrq::WB_OVERFLOW)
    .union(DispcIrq::WB_INCOMPLETE);
