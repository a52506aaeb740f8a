//! Driver registry and dispatch layer of the Photon video stack.
//!
//! Every video driver registers a [`VideoDriver`](photon_driver_api::VideoDriver)
//! with a [`VideoFramework`]. Applications then open channels by driver id
//! and drive them through uniform create/delete/control/queue/dequeue/process
//! calls; the framework resolves the channel handle and forwards to the
//! bound driver.
//!
//! The framework is an explicit context object rather than process-wide
//! state, so independent instances can coexist (one per test, for example).

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod channel;
pub mod config;
mod framework;
mod registry;

pub use framework::VideoFramework;
