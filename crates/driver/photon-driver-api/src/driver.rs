//! The video driver trait and its metadata types.

use core::any::Any;
use core::fmt;

use photon_core::id::{DriverId, InstanceId};

use crate::callback::CallbackRelay;
use crate::error::DriverError;
use crate::frame::{FrameList, ProcessList};

/// The class of hardware a driver manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// Video capture port.
    Capture,
    /// Display pipe or overlay.
    Display,
    /// Display controller: pipeline graph, blenders, outputs.
    DisplayController,
    /// Display write-back to memory.
    WriteBack,
    /// External video sensor or decoder.
    Sensor,
    /// Image signal processor.
    Isp,
    /// Memory-to-memory processing engine.
    MemToMem,
}

/// Static metadata describing a driver.
#[derive(Debug, Clone, Copy)]
pub struct DriverInfo {
    /// Registry key; must be unique among registered drivers.
    pub id: DriverId,
    /// Short name of the driver (e.g. "dss-dctrl").
    pub name: &'static str,
    /// The class of hardware this driver manages.
    pub kind: DriverKind,
    /// Number of hardware instances the driver serves.
    pub max_instances: u32,
}

/// Driver-private handle for one open instance.
///
/// The framework stores it and hands it back on every call; only the driver
/// interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct DriverHandle(usize);

impl DriverHandle {
    /// Creates a handle from a driver-chosen value.
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the driver-chosen value.
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for DriverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// How long a blocking `dequeue` / `get_processed_*` may wait.
///
/// The framework passes it through unmodified; interpreting it is the
/// driver's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Return immediately.
    #[default]
    NoWait,
    /// Block until the operation completes.
    Forever,
    /// Block for at most this many scheduler ticks.
    Ticks(u32),
}

/// Standard control command ids.
///
/// Commands at or above [`DRIVER_CMD_BASE`](cmd::DRIVER_CMD_BASE) are
/// driver-specific.
pub mod cmd {
    /// Start streaming (equivalent to [`VideoDriver::start`](super::VideoDriver::start)).
    pub const START: u32 = 0;
    /// Stop streaming (equivalent to [`VideoDriver::stop`](super::VideoDriver::stop)).
    pub const STOP: u32 = 1;
    /// Set the channel's format.
    pub const SET_FORMAT: u32 = 2;
    /// Read the channel's format.
    pub const GET_FORMAT: u32 = 3;
    /// Select video standard.
    pub const SELECT_STANDARD: u32 = 4;
    /// Read back the detected or selected standard.
    pub const GET_STANDARD: u32 = 5;
    /// Query the hardware instance's status.
    pub const GET_STATUS: u32 = 6;
    /// First id available to individual drivers.
    pub const DRIVER_CMD_BASE: u32 = 0x1000;
}

/// Interface every video driver implements.
///
/// `info`, `create` and `delete` are mandatory. Every other operation
/// defaults to [`DriverError::UnsupportedOperation`], so a driver overrides
/// only what its hardware does.
///
/// Calls may arrive concurrently from several tasks; drivers do their own
/// locking.
pub trait VideoDriver: Send + Sync {
    /// Returns static information about this driver.
    fn info(&self) -> DriverInfo;

    /// Opens `instance` and returns the driver-private handle.
    ///
    /// `relay`, when present, is the callback binding for this channel;
    /// the driver keeps it and fires it from its own context.
    fn create(
        &self,
        instance: InstanceId,
        args: Option<&dyn Any>,
        status: Option<&mut dyn Any>,
        relay: Option<CallbackRelay>,
    ) -> Result<DriverHandle, DriverError>;

    /// Closes an instance opened by [`create`](Self::create).
    fn delete(&self, handle: DriverHandle, args: Option<&dyn Any>) -> Result<(), DriverError>;

    /// Runs a control command.
    fn control(
        &self,
        _handle: DriverHandle,
        _cmd: u32,
        _args: Option<&mut dyn Any>,
    ) -> Result<(), DriverError> {
        Err(DriverError::UnsupportedOperation)
    }

    /// Submits frames for capture or display.
    fn queue(
        &self,
        _handle: DriverHandle,
        _frames: &mut FrameList,
        _stream: u32,
    ) -> Result<(), DriverError> {
        Err(DriverError::UnsupportedOperation)
    }

    /// Retrieves completed frames.
    fn dequeue(
        &self,
        _handle: DriverHandle,
        _frames: &mut FrameList,
        _stream: u32,
        _timeout: Timeout,
    ) -> Result<(), DriverError> {
        Err(DriverError::UnsupportedOperation)
    }

    /// Submits a memory-to-memory request.
    fn process_frames(
        &self,
        _handle: DriverHandle,
        _list: &mut ProcessList,
    ) -> Result<(), DriverError> {
        Err(DriverError::UnsupportedOperation)
    }

    /// Retrieves a completed memory-to-memory request.
    fn get_processed_frames(
        &self,
        _handle: DriverHandle,
        _list: &mut ProcessList,
        _timeout: Timeout,
    ) -> Result<(), DriverError> {
        Err(DriverError::UnsupportedOperation)
    }

    /// Submits a single-list request (one input list, one output list).
    fn process_request(
        &self,
        _handle: DriverHandle,
        _input: &mut FrameList,
        _output: &mut FrameList,
    ) -> Result<(), DriverError> {
        Err(DriverError::UnsupportedOperation)
    }

    /// Retrieves a completed single-list request.
    fn get_processed_request(
        &self,
        _handle: DriverHandle,
        _input: &mut FrameList,
        _output: &mut FrameList,
        _timeout: Timeout,
    ) -> Result<(), DriverError> {
        Err(DriverError::UnsupportedOperation)
    }

    /// Starts streaming.
    fn start(&self, _handle: DriverHandle, _args: Option<&dyn Any>) -> Result<(), DriverError> {
        Err(DriverError::UnsupportedOperation)
    }

    /// Stops streaming.
    fn stop(&self, _handle: DriverHandle, _args: Option<&dyn Any>) -> Result<(), DriverError> {
        Err(DriverError::UnsupportedOperation)
    }
}
