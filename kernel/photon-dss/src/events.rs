//! Pipe events produced by the interrupt handler.
//!
//! In [`CallbackDelivery::Inline`] mode events are handed to the client
//! callback straight from the interrupt path. In
//! [`CallbackDelivery::Deferred`] mode they are posted into a bounded ring
//! which a dispatch task drains; a full ring drops the event and counts it.

use photon_core::id::AppToken;
use planck_noalloc::ringbuf::RingBuf;

use crate::config::EVENT_QUEUE_DEPTH;
use crate::node::NodeId;

/// Where pipe callbacks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackDelivery {
    /// From the interrupt handler.
    #[default]
    Inline,
    /// From [`DisplayController::dispatch_pending`](crate::DisplayController::dispatch_pending).
    Deferred,
}

/// Why a pipe callback fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventReason {
    /// The blender finished a frame or field.
    FrameDone,
    /// The write-back pipe captured a complete frame.
    WbCapture,
}

/// Client callback bound to a pipe.
pub type PipeCallback = fn(NodeId, EventReason, AppToken);

/// One pending callback invocation.
#[derive(Debug, Clone, Copy)]
pub struct PipeEvent {
    /// Pipe the event belongs to.
    pub pipe: NodeId,
    /// What happened.
    pub reason: EventReason,
    pub(crate) callback: PipeCallback,
    pub(crate) arg: AppToken,
}

impl PipeEvent {
    /// Runs the bound callback.
    pub fn deliver(&self) {
        (self.callback)(self.pipe, self.reason, self.arg);
    }
}

/// Bounded queue of deferred events.
pub(crate) struct EventQueue {
    ring: RingBuf<PipeEvent, { EVENT_QUEUE_DEPTH + 1 }>,
    dropped: u32,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            ring: RingBuf::new(),
            dropped: 0,
        }
    }

    /// Posts `event`; returns `false` and counts a drop when full.
    pub fn post(&mut self, event: PipeEvent) -> bool {
        if self.ring.try_push(event).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            return false;
        }
        true
    }

    pub fn pop(&mut self) -> Option<PipeEvent> {
        self.ring.pop()
    }

    /// Drops every queued event of `pipe`, keeping the order of the rest.
    /// Returns how many were removed.
    pub fn purge(&mut self, pipe: NodeId) -> usize {
        let mut removed = 0;
        for _ in 0..self.ring.len() {
            let Some(event) = self.ring.pop() else {
                break;
            };
            if event.pipe == pipe {
                removed += 1;
            } else if self.ring.try_push(event).is_err() {
                // A slot was just freed by the pop.
                self.dropped = self.dropped.wrapping_add(1);
            }
        }
        removed
    }

    /// Drops every queued event.
    pub fn clear(&mut self) {
        while self.ring.pop().is_some() {}
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
