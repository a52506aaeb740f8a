//! Display subsystem controller of the Photon video stack.
//!
//! The display hardware is a graph of blocks: read pipes feed blenders,
//! blenders drive outputs, and a write-back pipe can capture a blender's
//! result into memory. An application describes the routing as an edge
//! list ([`DssConfig`]); the [`DisplayController`] derives the pipe table
//! from it, programs the outputs, runs each pipe's
//! `Idle -> Opened -> Running` state machine, and demultiplexes the single
//! shared display interrupt into per-pipe callbacks and error counters.
//!
//! The controller implements [`VideoDriver`](photon_driver_api::VideoDriver)
//! so it registers with the driver framework like any other driver; its
//! typed [`DssRequest`]s travel through `control`.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod config;
mod controller;
pub mod events;
pub mod graph;
pub mod hal;
pub mod irq;
pub mod node;
pub mod output;
pub mod pipe;
pub mod request;
pub mod stats;

pub use controller::{DisplayController, DssInitParams};
pub use events::{CallbackDelivery, EventReason, PipeCallback, PipeEvent};
pub use graph::Edge;
pub use hal::DisplayHal;
pub use node::NodeId;
pub use output::{OutputPathInfo, PathInfo};
pub use pipe::{ClientInfo, ClientMode, PipeHandle, PipeState};
pub use request::{DSS_REQUEST, DssConfig, DssRequest, OutputInfo, VideoInterface};
pub use stats::ErrorStats;
