//! Error counters accumulated from the interrupt status word.

use crate::irq::{DispcIrq, blender_irq, underflow_bit};
use crate::node::NodeId;

const READ_PIPES: [NodeId; 4] = [NodeId::Vid1, NodeId::Vid2, NodeId::Vid3, NodeId::Gfx1];
const BLENDERS: [NodeId; 4] = [NodeId::Lcd1, NodeId::Lcd2, NodeId::Lcd3, NodeId::Tv];

/// Snapshot of every error counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorStats {
    /// FIFO underflows per read pipe.
    underflow: [u32; READ_PIPES.len()],
    /// Sync-lost events per blender.
    sync_lost: [u32; BLENDERS.len()],
    /// Interconnect errors.
    pub bus_error: u32,
    /// Write-back FIFO overflows.
    pub wb_overflow: u32,
    /// Write-back frames captured incompletely.
    pub wb_incomplete: u32,
}

fn slot(table: &[NodeId], node: NodeId) -> Option<usize> {
    table.iter().position(|n| *n == node)
}

impl ErrorStats {
    /// All counters zero.
    pub const fn new() -> Self {
        Self {
            underflow: [0; READ_PIPES.len()],
            sync_lost: [0; BLENDERS.len()],
            bus_error: 0,
            wb_overflow: 0,
            wb_incomplete: 0,
        }
    }

    /// Underflow count of a read pipe (zero for nodes without one).
    pub fn underflow(&self, pipe: NodeId) -> u32 {
        slot(&READ_PIPES, pipe).map_or(0, |i| self.underflow[i])
    }

    /// Sync-lost count of the timing generator behind `blender`.
    pub fn sync_lost(&self, blender: NodeId) -> u32 {
        slot(&BLENDERS, blender).map_or(0, |i| self.sync_lost[i])
    }

    /// Sum of every counter, wrapping like the counters themselves.
    pub fn total(&self) -> u32 {
        self.underflow
            .iter()
            .chain(&self.sync_lost)
            .chain([&self.bus_error, &self.wb_overflow, &self.wb_incomplete])
            .fold(0u32, |acc, &n| acc.wrapping_add(n))
    }

    /// Adds one to each counter whose bit is set in `status`.
    pub fn accumulate(&mut self, status: DispcIrq) {
        for (count, pipe) in self.underflow.iter_mut().zip(READ_PIPES) {
            if underflow_bit(pipe).is_some_and(|bit| status.contains(bit)) {
                *count = count.wrapping_add(1);
            }
        }
        for (count, blender) in self.sync_lost.iter_mut().zip(BLENDERS) {
            if blender_irq(blender).is_some_and(|irq| status.intersects(irq.sync_lost)) {
                *count = count.wrapping_add(1);
            }
        }
        if status.contains(DispcIrq::OCP_ERR) {
            self.bus_error = self.bus_error.wrapping_add(1);
        }
        if status.contains(DispcIrq::WB_OVERFLOW) {
            self.wb_overflow = self.wb_overflow.wrapping_add(1);
        }
        if status.contains(DispcIrq::WB_INCOMPLETE) {
            self.wb_incomplete = self.wb_incomplete.wrapping_add(1);
        }
    }

    /// Clears the counters attributed to `pipe`.
    ///
    /// For a read pipe that is its underflow count; for the write-back
    /// pipe, its overflow and incomplete counts.
    pub fn reset_pipe(&mut self, pipe: NodeId) {
        if let Some(i) = slot(&READ_PIPES, pipe) {
            self.underflow[i] = 0;
        } else if pipe == NodeId::Wb {
            self.wb_overflow = 0;
            self.wb_incomplete = 0;
        }
    }

    /// Clears every counter.
    pub fn reset_all(&mut self) {
        *self = Self::new();
    }
}
