//! Pool sizes of the framework.

/// Maximum number of simultaneously registered drivers.
pub const MAX_DRIVERS: usize = 16;

/// Maximum number of simultaneously open channels, across all drivers.
pub const MAX_CHANNELS: usize = 64;
