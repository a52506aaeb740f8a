//! Frames, frame lists and process lists.
//!
//! A [`FrameList`] is the bounded batch passed through `queue` / `dequeue`;
//! a [`ProcessList`] bundles several input and output lists for
//! memory-to-memory `process_frames`. Both are filled by callers, so the
//! drivers run the validators in this module before trusting them.
//!
//! The transfer helpers distinguish *copy* (move the references out of the
//! source and leave it empty, ready for reuse) from *duplicate* (share the
//! references and leave the source untouched). A driver that queues work
//! asynchronously copies the caller's list so it never keeps a view into an
//! object the caller is free to mutate.

use alloc::sync::Arc;

use photon_core::id::AppToken;

use crate::config::{MAX_FIELDS, MAX_FRAME_PTR, MAX_PLANES, MAX_PROCESS_LISTS};
use crate::error::DriverError;

/// Field identifier of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Fid {
    /// Even (top) field.
    Top = 0,
    /// Odd (bottom) field.
    Bottom = 1,
    /// Whole progressive frame.
    #[default]
    Frame = 2,
}

impl Fid {
    /// Returns the opposite field; `Frame` maps to itself.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Frame => Self::Frame,
        }
    }
}

/// One video frame buffer description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Physical plane addresses, indexed `[field][plane]`.
    pub addr: [[usize; MAX_PLANES]; MAX_FIELDS],
    /// Which field(s) this frame carries.
    pub fid: Fid,
    /// Channel number for multi-channel drivers.
    pub channel: u32,
    /// Capture or display timestamp, in driver ticks.
    pub timestamp: u64,
    /// Application value, carried through untouched.
    pub app_data: AppToken,
}

impl Frame {
    /// A progressive frame with luma at `y` and chroma at `uv`.
    pub fn progressive(y: usize, uv: usize) -> Self {
        let mut frame = Self::default();
        frame.addr[Fid::Frame as usize][0] = y;
        frame.addr[Fid::Frame as usize][1] = uv;
        frame
    }

    /// Returns the address of `plane` within `field`, or `0` when unset.
    pub fn plane(&self, field: Fid, plane: usize) -> usize {
        self.addr[field as usize].get(plane).copied().unwrap_or(0)
    }
}

/// Shared reference to a frame.
pub type FrameRef = Arc<Frame>;

/// A bounded batch of frame references.
///
/// `num_frames` is the caller's declared count; slots past it are ignored
/// and slots before it must be populated except in dequeue lists, which the
/// driver fills.
#[derive(Debug, Clone)]
pub struct FrameList {
    /// Frame reference slots.
    pub frames: [Option<FrameRef>; MAX_FRAME_PTR],
    /// Number of meaningful slots.
    pub num_frames: usize,
}

impl Default for FrameList {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameList {
    /// Creates an empty list.
    pub const fn new() -> Self {
        Self {
            frames: [const { None }; MAX_FRAME_PTR],
            num_frames: 0,
        }
    }

    /// Appends a frame and bumps the count.
    ///
    /// # Errors
    ///
    /// [`DriverError::OutOfRange`] when the list already holds
    /// [`MAX_FRAME_PTR`] frames.
    pub fn push(&mut self, frame: FrameRef) -> Result<(), DriverError> {
        let slot = self
            .frames
            .get_mut(self.num_frames)
            .ok_or(DriverError::OutOfRange)?;
        *slot = Some(frame);
        self.num_frames += 1;
        Ok(())
    }

    /// Iterates over the populated slots within the declared count.
    pub fn iter(&self) -> impl Iterator<Item = &FrameRef> {
        self.frames[..self.num_frames.min(MAX_FRAME_PTR)]
            .iter()
            .flatten()
    }

    /// Drops every reference and resets the count.
    pub fn clear(&mut self) {
        for slot in &mut self.frames {
            *slot = None;
        }
        self.num_frames = 0;
    }

    /// Returns the declared count.
    pub const fn len(&self) -> usize {
        self.num_frames
    }

    /// Returns `true` when the declared count is zero.
    pub const fn is_empty(&self) -> bool {
        self.num_frames == 0
    }
}

/// Input and output frame lists for one memory-to-memory request.
#[derive(Debug, Clone)]
pub struct ProcessList {
    /// Input lists; the first `num_in_lists` are meaningful.
    pub in_lists: [FrameList; MAX_PROCESS_LISTS],
    /// Output lists; the first `num_out_lists` are meaningful.
    pub out_lists: [FrameList; MAX_PROCESS_LISTS],
    /// Number of input lists.
    pub num_in_lists: usize,
    /// Number of output lists.
    pub num_out_lists: usize,
}

impl Default for ProcessList {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessList {
    /// Creates an empty process list.
    pub const fn new() -> Self {
        Self {
            in_lists: [const { FrameList::new() }; MAX_PROCESS_LISTS],
            out_lists: [const { FrameList::new() }; MAX_PROCESS_LISTS],
            num_in_lists: 0,
            num_out_lists: 0,
        }
    }

    /// Empties every list.
    pub fn clear(&mut self) {
        for list in self.in_lists.iter_mut().chain(self.out_lists.iter_mut()) {
            list.clear();
        }
        self.num_in_lists = 0;
        self.num_out_lists = 0;
    }
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// Validates a caller-filled list for `queue` or `process_frames`.
///
/// # Errors
///
/// - [`DriverError::OutOfRange`]: zero count, or count above `max_frames`
///   or [`MAX_FRAME_PTR`].
/// - [`DriverError::BadArgs`]: an empty slot within the declared count.
pub fn check_frame_list(list: &FrameList, max_frames: usize) -> Result<(), DriverError> {
    let n = list.num_frames;
    if n == 0 || n > max_frames || n > MAX_FRAME_PTR {
        return Err(DriverError::OutOfRange);
    }
    if list.frames[..n].iter().any(Option::is_none) {
        return Err(DriverError::BadArgs);
    }
    Ok(())
}

/// Validates a list the driver will fill on `dequeue`.
///
/// Only the capacity is checked; count and slots are outputs.
///
/// # Errors
///
/// [`DriverError::OutOfRange`] if `max_frames` is zero or exceeds
/// [`MAX_FRAME_PTR`].
pub fn check_dequeue_frame_list(_list: &FrameList, max_frames: usize) -> Result<(), DriverError> {
    if max_frames == 0 || max_frames > MAX_FRAME_PTR {
        return Err(DriverError::OutOfRange);
    }
    Ok(())
}

/// Validates a process list against the driver's expected shape.
///
/// `in_lists` / `out_lists` are the exact list counts the driver expects.
/// Every list must pass [`check_frame_list`]. Unless `mosaic` is set, all
/// lists of one direction must carry the same frame count.
///
/// # Errors
///
/// [`DriverError::OutOfRange`] on any count mismatch; the
/// [`check_frame_list`] errors for malformed lists.
pub fn check_process_list(
    plist: &ProcessList,
    in_lists: usize,
    out_lists: usize,
    max_frames: usize,
    mosaic: bool,
) -> Result<(), DriverError> {
    if in_lists > MAX_PROCESS_LISTS || out_lists > MAX_PROCESS_LISTS {
        return Err(DriverError::OutOfRange);
    }
    if plist.num_in_lists != in_lists || plist.num_out_lists != out_lists {
        return Err(DriverError::OutOfRange);
    }
    for lists in [&plist.in_lists[..in_lists], &plist.out_lists[..out_lists]] {
        for list in lists {
            check_frame_list(list, max_frames)?;
        }
        if mosaic {
            continue;
        }
        if let Some(first) = lists.first() {
            if lists.iter().any(|l| l.num_frames != first.num_frames) {
                return Err(DriverError::OutOfRange);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transfer helpers
// ---------------------------------------------------------------------------

/// Moves every reference of `src` into `dst`; `src` is left empty.
pub fn copy_frame_list(dst: &mut FrameList, src: &mut FrameList) {
    dst.clear();
    for (d, s) in dst.frames.iter_mut().zip(src.frames.iter_mut()) {
        *d = s.take();
    }
    dst.num_frames = src.num_frames;
    src.num_frames = 0;
}

/// Makes `dst` share every reference of `src`; `src` is unchanged.
pub fn duplicate_frame_list(dst: &mut FrameList, src: &FrameList) {
    dst.frames.clone_from(&src.frames);
    dst.num_frames = src.num_frames;
}

/// [`copy_frame_list`] applied to every list of a process list.
pub fn copy_process_list(dst: &mut ProcessList, src: &mut ProcessList) {
    for (d, s) in dst.in_lists.iter_mut().zip(src.in_lists.iter_mut()) {
        copy_frame_list(d, s);
    }
    for (d, s) in dst.out_lists.iter_mut().zip(src.out_lists.iter_mut()) {
        copy_frame_list(d, s);
    }
    dst.num_in_lists = core::mem::take(&mut src.num_in_lists);
    dst.num_out_lists = core::mem::take(&mut src.num_out_lists);
}

/// [`duplicate_frame_list`] applied to every list of a process list.
pub fn duplicate_process_list(dst: &mut ProcessList, src: &ProcessList) {
    for (d, s) in dst.in_lists.iter_mut().zip(src.in_lists.iter()) {
        duplicate_frame_list(d, s);
    }
    for (d, s) in dst.out_lists.iter_mut().zip(src.out_lists.iter()) {
        duplicate_frame_list(d, s);
    }
    dst.num_in_lists = src.num_in_lists;
    dst.num_out_lists = src.num_out_lists;
}
