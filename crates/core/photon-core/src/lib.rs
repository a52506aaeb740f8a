//! Core types and synchronization primitives for the Photon video stack.
//!
//! This crate contains the host-testable building blocks shared by the
//! driver framework and the display controller: the leveled logging
//! facility, spin locks usable from interrupt context, typed identifiers,
//! and a fixed-capacity slot arena with generation-checked keys.
//!
//! Nothing here allocates, so every type can live in a `static` or inside a
//! context object built before any heap exists.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod arena;
pub mod config;
pub mod id;
pub mod log;
pub mod sync;
