//! Driver error taxonomy.
//!
//! Each variant maps to one of the legacy negative status integers through
//! [`DriverError::code`] / [`DriverError::from_code`], so board code that
//! still speaks plain integers can interoperate.

use core::fmt;

/// Errors returned by the framework and by drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverError {
    /// Generic failure with no more specific kind.
    Fail,
    /// A handle or argument was null, stale or of the wrong type.
    BadArgs,
    /// The arguments were well-formed but describe an invalid configuration.
    InvalidParams,
    /// The device or object is busy (open channels, running pipes).
    DeviceInUse,
    /// A blocking operation ran out of time.
    Timeout,
    /// A fixed-size pool is exhausted.
    OutOfResources,
    /// A count or index is outside its permitted range.
    OutOfRange,
    /// The operation cannot complete now; try again later.
    Again,
    /// The control command is not recognized by the driver.
    UnsupportedCommand,
    /// No completed buffers are available to dequeue.
    NoMoreBuffers,
    /// The driver does not implement this operation.
    UnsupportedOperation,
    /// A driver with this id is already registered.
    DriverInUse,
    /// No registered driver matches the requested id.
    InvalidDriver,
    /// The requested hardware instance does not exist.
    NoDevice,
}

impl DriverError {
    const ALL: [Self; 14] = [
        Self::Fail,
        Self::BadArgs,
        Self::InvalidParams,
        Self::DeviceInUse,
        Self::Timeout,
        Self::OutOfResources,
        Self::OutOfRange,
        Self::Again,
        Self::UnsupportedCommand,
        Self::NoMoreBuffers,
        Self::UnsupportedOperation,
        Self::DriverInUse,
        Self::InvalidDriver,
        Self::NoDevice,
    ];

    /// Returns the legacy status integer (always negative).
    pub const fn code(self) -> i32 {
        match self {
            Self::Fail => -1,
            Self::BadArgs => -2,
            Self::InvalidParams => -3,
            Self::DeviceInUse => -4,
            Self::Timeout => -5,
            Self::OutOfResources => -6,
            Self::OutOfRange => -7,
            Self::Again => -8,
            Self::UnsupportedCommand => -9,
            Self::NoMoreBuffers => -10,
            Self::UnsupportedOperation => -11,
            Self::DriverInUse => -12,
            Self::InvalidDriver => -13,
            Self::NoDevice => -14,
        }
    }

    /// Maps a legacy status integer back to an error.
    ///
    /// Returns `None` for `0` (success) and for unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }

    /// Flattens a result into a legacy status integer (`0` on success).
    pub fn status<T>(result: &Result<T, Self>) -> i32 {
        match result {
            Ok(_) => 0,
            Err(e) => e.code(),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fail => "operation failed",
            Self::BadArgs => "bad arguments",
            Self::InvalidParams => "invalid parameters",
            Self::DeviceInUse => "device in use",
            Self::Timeout => "operation timed out",
            Self::OutOfResources => "out of resources",
            Self::OutOfRange => "value out of range",
            Self::Again => "try again",
            Self::UnsupportedCommand => "unsupported command",
            Self::NoMoreBuffers => "no more buffers",
            Self::UnsupportedOperation => "operation not supported",
            Self::DriverInUse => "driver already registered",
            Self::InvalidDriver => "no such driver",
            Self::NoDevice => "no such device",
        })
    }
}

impl core::error::Error for DriverError {}
