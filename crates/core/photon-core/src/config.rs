//! Compile-time configuration for the core crate.

use crate::log::LogLevel;

/// Log level in effect until [`set_max_level`](crate::log::set_max_level) is
/// called. Messages more verbose than this are dropped before formatting.
pub const DEFAULT_LOG_LEVEL: LogLevel = if cfg!(debug_assertions) {
    LogLevel::Debug
} else {
    LogLevel::Info
};
