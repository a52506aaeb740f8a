//! Logging interface for the Photon video stack.
//!
//! Provides [`kprint!`] / [`kprintln!`] for raw output and [`klog!`] plus the
//! leveled convenience macros (`kinfo!`, `kdebug!`, etc.). The board support
//! code registers its console through [`set_print_fn`] / [`set_log_fn`];
//! before that, output is silently discarded.
//!
//! Leveled messages are filtered against a runtime maximum level before the
//! arguments are formatted, so `ktrace!` calls on the interrupt path cost one
//! relaxed atomic load when tracing is off.

use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

use crate::config::DEFAULT_LOG_LEVEL;

// ---------------------------------------------------------------------------
// Log levels: lower = more severe
// ---------------------------------------------------------------------------

/// Log severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Fatal: unrecoverable error, the subsystem cannot continue.
    Fatal = 0,
    /// Error: something failed but the system may continue.
    Error = 1,
    /// Warning: unexpected condition, not necessarily an error.
    Warn = 2,
    /// Informational: high-level progress messages.
    Info = 3,
    /// Debug: detailed diagnostic information.
    Debug = 4,
    /// Trace: very verbose, low-level tracing (interrupt path).
    Trace = 5,
}

impl LogLevel {
    /// Returns the human-readable name (fixed-width for aligned output).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Fatal,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().trim_end())
    }
}

// ---------------------------------------------------------------------------
// Raw print function (kprint! / kprintln!): no levels, no filtering
// ---------------------------------------------------------------------------

/// The signature of the global print function.
pub type PrintFn = fn(fmt::Arguments<'_>);

fn null_print(_args: fmt::Arguments<'_>) {}

static PRINT_FN: AtomicPtr<()> = AtomicPtr::new(null_print as *mut ());

/// Registers the global print function.
///
/// # Safety
///
/// The provided function must be safe to call from any context, including
/// the display interrupt handler. May be called more than once (e.g., once
/// for an early console, once for the full UART driver).
pub unsafe fn set_print_fn(f: PrintFn) {
    PRINT_FN.store(f as *mut (), Ordering::Release);
}

#[inline]
fn load_print_fn() -> PrintFn {
    let ptr = PRINT_FN.load(Ordering::Acquire);
    // SAFETY: We only ever store valid `PrintFn` function pointers into PRINT_FN.
    unsafe { core::mem::transmute::<*mut (), PrintFn>(ptr) }
}

/// Implementation detail for [`kprint!`] / [`kprintln!`]. Not public API.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    load_print_fn()(args);
}

/// Prints to the registered console (raw, no level).
#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => { $crate::log::_print(format_args!($($arg)*)) };
}

/// Prints to the registered console with a trailing newline (raw, no level).
#[macro_export]
macro_rules! kprintln {
    () => { $crate::kprint!("\n") };
    ($($arg:tt)*) => { $crate::kprint!("{}\n", format_args!($($arg)*)) };
}

// ---------------------------------------------------------------------------
// Leveled log function (klog! and convenience macros)
// ---------------------------------------------------------------------------

/// The signature of the global leveled log function.
pub type LogFn = fn(LogLevel, fmt::Arguments<'_>);

fn null_log(_level: LogLevel, _args: fmt::Arguments<'_>) {}

static LOG_FN: AtomicPtr<()> = AtomicPtr::new(null_log as *mut ());

static MAX_LEVEL: AtomicU8 = AtomicU8::new(DEFAULT_LOG_LEVEL as u8);

/// Registers the global leveled log function.
///
/// # Safety
///
/// Same contract as [`set_print_fn`]: the function is called from task and
/// interrupt context alike and must not block.
pub unsafe fn set_log_fn(f: LogFn) {
    LOG_FN.store(f as *mut (), Ordering::Release);
}

#[inline]
fn load_log_fn() -> LogFn {
    let ptr = LOG_FN.load(Ordering::Acquire);
    // SAFETY: We only ever store valid `LogFn` function pointers into LOG_FN.
    unsafe { core::mem::transmute::<*mut (), LogFn>(ptr) }
}

/// Sets the most verbose level that will reach the log function.
pub fn set_max_level(level: LogLevel) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns the current maximum level.
pub fn max_level() -> LogLevel {
    LogLevel::from_u8(MAX_LEVEL.load(Ordering::Relaxed))
}

/// Returns `true` if a message at `level` would be forwarded.
#[inline]
pub fn enabled(level: LogLevel) -> bool {
    level as u8 <= MAX_LEVEL.load(Ordering::Relaxed)
}

/// Implementation detail for [`klog!`]. Not public API.
#[doc(hidden)]
pub fn _log(level: LogLevel, args: fmt::Arguments<'_>) {
    load_log_fn()(level, args);
}

/// Logs a message at the given level.
#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {{
        let level = $level;
        if $crate::log::enabled(level) {
            $crate::log::_log(level, format_args!($($arg)*))
        }
    }};
}

/// Logs a fatal-level message (level 0).
#[macro_export]
macro_rules! kfatal {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Fatal, $($arg)*) };
}

/// Logs an error-level message (level 1).
#[macro_export]
macro_rules! kerr {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Error, $($arg)*) };
}

/// Logs a warning-level message (level 2).
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Warn, $($arg)*) };
}

/// Logs an info-level message (level 3).
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Info, $($arg)*) };
}

/// Logs a debug-level message (level 4).
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Debug, $($arg)*) };
}

/// Logs a trace-level message (level 5).
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Trace, $($arg)*) };
}

/// Logs a trace-level message tagged with a subsystem name.
///
/// ```ignore
/// ktrace_subsys!(irq, "status {:#010x}", raw);
/// ```
#[macro_export]
macro_rules! ktrace_subsys {
    ($subsys:ident, $($arg:tt)*) => {
        $crate::klog!(
            $crate::log::LogLevel::Trace,
            "[{}] {}",
            stringify!($subsys),
            format_args!($($arg)*)
        )
    };
}
