//! Per-pipe lifecycle state.

use photon_core::arena::SlotKey;
use photon_core::id::AppToken;
use photon_driver_api::frame::Fid;

use crate::events::PipeCallback;
use crate::node::NodeId;

/// Lifecycle of a pipe.
///
/// `Idle -> Opened` on open, `Opened -> Running` on start,
/// `Running -> Opened` on stop. Clearing the configuration drops the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeState {
    /// Discovered but not bound to a client.
    Idle,
    /// Bound to a client, interrupt not armed.
    Opened,
    /// Interrupt armed; callbacks fire.
    Running,
}

/// How a client uses its pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientMode {
    /// Scan-out to an output.
    #[default]
    Display,
    /// Write-back capture of a live output.
    Capture,
    /// Write-back used as a memory-to-memory engine.
    MemToMem,
}

/// Client bound to a pipe.
#[derive(Debug, Clone, Copy)]
pub struct ClientInfo {
    /// Invoked for every event of the pipe.
    pub callback: Option<PipeCallback>,
    /// Returned to `callback` unmodified.
    pub arg: AppToken,
    /// Use of the pipe.
    pub mode: ClientMode,
}

impl ClientInfo {
    /// A display client.
    pub fn display(callback: PipeCallback, arg: AppToken) -> Self {
        Self {
            callback: Some(callback),
            arg,
            mode: ClientMode::Display,
        }
    }

    /// A client of the given mode.
    pub fn with_mode(callback: PipeCallback, arg: AppToken, mode: ClientMode) -> Self {
        Self {
            callback: Some(callback),
            arg,
            mode,
        }
    }
}

/// Handle returned by [`DisplayController::open_pipe`](crate::DisplayController::open_pipe).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeHandle(SlotKey);

impl PipeHandle {
    pub(crate) const fn from_key(key: SlotKey) -> Self {
        Self(key)
    }

    pub(crate) const fn key(self) -> SlotKey {
        self.0
    }
}

/// Write-back field tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct WbState {
    /// Field most recently signalled by the source output.
    pub current_field: Fid,
    /// Capture is limited to the crop region.
    pub region_mode: bool,
}

/// One row of the pipe table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PipeEntry {
    pub node: NodeId,
    /// Blender the pipe feeds (for write-back: the blender it captures).
    pub blender: Option<NodeId>,
    pub output: Option<NodeId>,
    pub state: PipeState,
    pub client: Option<ClientInfo>,
    pub position_shift: u32,
    pub wb: WbState,
}

impl PipeEntry {
    pub const fn new(node: NodeId, blender: Option<NodeId>, output: Option<NodeId>) -> Self {
        Self {
            node,
            blender,
            output,
            state: PipeState::Idle,
            client: None,
            position_shift: 0,
            wb: WbState {
                current_field: Fid::Frame,
                region_mode: false,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == PipeState::Running
    }

    pub fn mode(&self) -> ClientMode {
        self.client.map_or(ClientMode::Display, |c| c.mode)
    }
}
