//! Loom compatibility shim.
//!
//! When compiled with `cfg(loom)`, re-exports loom's atomics and yields to
//! the loom scheduler inside spin loops. Otherwise, re-exports the
//! `core::sync::atomic` types and emits a CPU spin hint.

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicBool, Ordering};

/// Called once per iteration of a busy-wait loop.
#[inline]
pub(crate) fn spin_wait() {
    #[cfg(loom)]
    loom::thread::yield_now();
    #[cfg(not(loom))]
    core::hint::spin_loop();
}
