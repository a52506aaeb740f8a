//! Synchronization primitives.
//!
//! Provides [`SpinLock`] for state touched only from task context and
//! [`IrqSpinLock`] for state shared with an interrupt handler. Both are
//! const-constructable and usable before any allocator or scheduler exists.

mod irq_spinlock;
mod spinlock;

pub(crate) mod loom_compat;

pub use irq_spinlock::{IrqRestoreFn, IrqSaveFn, IrqSpinLock, IrqSpinLockGuard, set_irq_mask_fns};
pub use spinlock::{SpinLock, SpinLockGuard};
