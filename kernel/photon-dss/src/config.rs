//! Table sizes of the display controller.

/// Maximum edges in one pipeline configuration.
pub const MAX_EDGES: usize = 32;

/// Maximum pipe entries (video, graphics and write-back pipes).
pub const MAX_CLIENT_PIPES: usize = 8;

/// Maximum simultaneously configured outputs.
pub const MAX_OUTPUTS: usize = 5;

/// Deferred callback events buffered between the interrupt and the
/// dispatch task.
pub const EVENT_QUEUE_DEPTH: usize = 32;
