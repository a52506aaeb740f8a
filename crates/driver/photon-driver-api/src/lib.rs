//! Driver contract for the Photon video stack.
//!
//! Every hardware driver (capture, display, display controller, write-back,
//! sensor, ISP) plugs into the framework through [`VideoDriver`]. This crate
//! holds that trait together with the types that cross it: the error
//! taxonomy, frame and process lists with their validators, callback relays,
//! and the video standard / data format tables.
//!
//! The crate is `no_std` + `alloc`; frames are shared as `Arc<Frame>`.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod callback;
pub mod config;
pub mod driver;
pub mod error;
pub mod frame;
pub mod standard;

pub use callback::{CallbackParams, CallbackRelay, ChannelHandle};
pub use driver::{DriverHandle, DriverInfo, DriverKind, Timeout, VideoDriver};
pub use error::DriverError;
pub use frame::{Frame, FrameList, FrameRef, ProcessList};
pub use photon_core::id::{AppToken, DriverId, InstanceId};
