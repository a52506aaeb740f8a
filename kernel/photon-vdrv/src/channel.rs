//! Fixed-size pool of open channels.

use alloc::sync::Arc;

use photon_core::arena::{SlotArena, SlotKey};
use photon_driver_api::{CallbackRelay, ChannelHandle, DriverError, DriverHandle, VideoDriver};

use crate::config::MAX_CHANNELS;

/// Lifecycle of a channel slot.
///
/// `Creating` and `Deleting` cover the window in which the driver's own
/// create/delete runs with the framework lock released; forwarders treat
/// both as not open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChannelState {
    Creating,
    Open(DriverHandle),
    Deleting,
}

pub(crate) struct ChannelEntry {
    /// Registry key of the owning driver.
    pub(crate) driver_key: SlotKey,
    pub(crate) driver: Arc<dyn VideoDriver>,
    pub(crate) state: ChannelState,
    pub(crate) relay: Option<CallbackRelay>,
}

impl ChannelEntry {
    /// Returns the driver and its private handle if the channel is open.
    pub(crate) fn open(&self) -> Option<(Arc<dyn VideoDriver>, DriverHandle)> {
        match self.state {
            ChannelState::Open(h) => Some((Arc::clone(&self.driver), h)),
            _ => None,
        }
    }
}

pub(crate) struct ChannelPool {
    channels: SlotArena<ChannelEntry, MAX_CHANNELS>,
}

impl ChannelPool {
    pub(crate) const fn new() -> Self {
        Self {
            channels: SlotArena::new(),
        }
    }

    /// Reserves a slot in the `Creating` state.
    pub(crate) fn reserve(
        &mut self,
        driver_key: SlotKey,
        driver: Arc<dyn VideoDriver>,
    ) -> Result<ChannelHandle, DriverError> {
        self.channels
            .insert(ChannelEntry {
                driver_key,
                driver,
                state: ChannelState::Creating,
                relay: None,
            })
            .map(ChannelHandle::from_key)
            .map_err(|_| DriverError::OutOfResources)
    }

    /// Resolves a handle; null and stale handles yield `BadArgs`.
    pub(crate) fn get(&self, handle: ChannelHandle) -> Result<&ChannelEntry, DriverError> {
        self.channels.get(handle.key()).ok_or(DriverError::BadArgs)
    }

    pub(crate) fn get_mut(&mut self, handle: ChannelHandle) -> Result<&mut ChannelEntry, DriverError> {
        self.channels.get_mut(handle.key()).ok_or(DriverError::BadArgs)
    }

    /// Frees the slot; the handle becomes stale.
    pub(crate) fn release(&mut self, handle: ChannelHandle) -> Option<ChannelEntry> {
        self.channels.remove(handle.key())
    }

    pub(crate) fn len(&self) -> usize {
        self.channels.len()
    }
}
