//! Interrupt-safe spin lock.
//!
//! Masks interrupts before acquiring the inner [`SpinLock`] and restores the
//! previous mask on release. A lock shared between a task and an interrupt
//! handler on the same core must be an `IrqSpinLock`, otherwise the handler
//! can spin forever on a lock its own core already holds.
//!
//! The core crate is architecture-neutral, so the mask/restore pair is
//! registered at boot by the board support code through
//! [`set_irq_mask_fns`]. Until then both are no-ops, which is what host
//! tests want.

use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicPtr, Ordering};

use super::spinlock::{SpinLock, SpinLockGuard};

/// Saves the current interrupt state and masks interrupts.
pub type IrqSaveFn = fn() -> usize;
/// Restores an interrupt state previously returned by an [`IrqSaveFn`].
pub type IrqRestoreFn = fn(usize);

fn null_save() -> usize {
    0
}

fn null_restore(_state: usize) {}

static SAVE_FN: AtomicPtr<()> = AtomicPtr::new(null_save as *mut ());
static RESTORE_FN: AtomicPtr<()> = AtomicPtr::new(null_restore as *mut ());

/// Registers the architecture's interrupt mask/restore functions.
///
/// # Safety
///
/// `save` must mask interrupts on the calling core and return a value that,
/// when passed to `restore`, re-establishes the previous state exactly.
/// Must be called before any `IrqSpinLock` is contended across contexts.
pub unsafe fn set_irq_mask_fns(save: IrqSaveFn, restore: IrqRestoreFn) {
    SAVE_FN.store(save as *mut (), Ordering::Release);
    RESTORE_FN.store(restore as *mut (), Ordering::Release);
}

fn save_and_mask() -> usize {
    let ptr = SAVE_FN.load(Ordering::Acquire);
    // SAFETY: Only valid `IrqSaveFn` pointers are stored into SAVE_FN.
    let f = unsafe { core::mem::transmute::<*mut (), IrqSaveFn>(ptr) };
    f()
}

fn restore(state: usize) {
    let ptr = RESTORE_FN.load(Ordering::Acquire);
    // SAFETY: Only valid `IrqRestoreFn` pointers are stored into RESTORE_FN.
    let f = unsafe { core::mem::transmute::<*mut (), IrqRestoreFn>(ptr) };
    f(state);
}

/// A spin lock that masks interrupts while held.
pub struct IrqSpinLock<T> {
    inner: SpinLock<T>,
}

impl<T> IrqSpinLock<T> {
    /// Creates a new unlocked `IrqSpinLock`.
    #[cfg(not(loom))]
    pub const fn new(value: T) -> Self {
        Self {
            inner: SpinLock::new(value),
        }
    }

    /// Creates a new unlocked `IrqSpinLock`.
    #[cfg(loom)]
    pub fn new(value: T) -> Self {
        Self {
            inner: SpinLock::new(value),
        }
    }

    /// Masks interrupts, then acquires the lock.
    pub fn lock(&self) -> IrqSpinLockGuard<'_, T> {
        let saved = save_and_mask();
        IrqSpinLockGuard {
            guard: Some(self.inner.lock()),
            saved,
        }
    }

    /// Attempts to acquire the lock without spinning.
    ///
    /// The interrupt state is restored before returning `None`.
    pub fn try_lock(&self) -> Option<IrqSpinLockGuard<'_, T>> {
        let saved = save_and_mask();
        if let Some(guard) = self.inner.try_lock() {
            Some(IrqSpinLockGuard {
                guard: Some(guard),
                saved,
            })
        } else {
            restore(saved);
            None
        }
    }
}

/// RAII guard that releases the lock, then restores the interrupt state.
pub struct IrqSpinLockGuard<'a, T> {
    guard: Option<SpinLockGuard<'a, T>>,
    saved: usize,
}

impl<T> Deref for IrqSpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.guard {
            Some(guard) => &**guard,
            None => unreachable!("IrqSpinLockGuard used after release"),
        }
    }
}

impl<T> DerefMut for IrqSpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.guard {
            Some(guard) => &mut **guard,
            None => unreachable!("IrqSpinLockGuard used after release"),
        }
    }
}

impl<T> Drop for IrqSpinLockGuard<'_, T> {
    fn drop(&mut self) {
        // Unlock first: the lock must never be held with interrupts enabled.
        drop(self.guard.take());
        restore(self.saved);
    }
}
