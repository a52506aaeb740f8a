//! Protocol limits shared by every driver.

/// Hard upper bound on frame references in one [`FrameList`](crate::FrameList).
pub const MAX_FRAME_PTR: usize = 64;

/// Upper bound on input (and, separately, output) lists in one
/// [`ProcessList`](crate::ProcessList).
pub const MAX_PROCESS_LISTS: usize = 4;

/// Planes per field (e.g. Y, UV and a third plane for planar 4:2:0).
pub const MAX_PLANES: usize = 3;

/// Fields per frame: even, odd, and the progressive/whole-frame slot.
pub const MAX_FIELDS: usize = 3;
