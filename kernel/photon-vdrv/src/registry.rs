//! Fixed-size table of registered drivers.

use alloc::sync::Arc;

use photon_core::arena::{SlotArena, SlotKey};
use photon_driver_api::{DriverError, DriverId, DriverInfo, VideoDriver};

use crate::config::MAX_DRIVERS;

/// One registered driver.
pub(crate) struct DriverEntry {
    /// Metadata captured at registration.
    pub(crate) info: DriverInfo,
    /// The driver's operation set.
    pub(crate) driver: Arc<dyn VideoDriver>,
    /// Channels currently open (or being created) on this driver.
    pub(crate) open_count: u32,
}

pub(crate) struct DriverRegistry {
    drivers: SlotArena<DriverEntry, MAX_DRIVERS>,
}

impl DriverRegistry {
    pub(crate) const fn new() -> Self {
        Self {
            drivers: SlotArena::new(),
        }
    }

    /// Adds `driver` under the id reported by its [`DriverInfo`].
    ///
    /// Fails with `DriverInUse` on a duplicate id and `OutOfResources` when
    /// the table is full.
    pub(crate) fn register(&mut self, driver: Arc<dyn VideoDriver>) -> Result<DriverInfo, DriverError> {
        let info = driver.info();
        if self.lookup(info.id).is_some() {
            return Err(DriverError::DriverInUse);
        }
        self.drivers
            .insert(DriverEntry {
                info,
                driver,
                open_count: 0,
            })
            .map_err(|_| DriverError::OutOfResources)?;
        Ok(info)
    }

    /// Removes the driver registered under `id`.
    ///
    /// Fails with `InvalidDriver` if nothing is registered under `id` and
    /// `DeviceInUse` while channels are open on it.
    pub(crate) fn unregister(&mut self, id: DriverId) -> Result<DriverEntry, DriverError> {
        let key = self.lookup(id).ok_or(DriverError::InvalidDriver)?;
        match self.drivers.get(key) {
            Some(entry) if entry.open_count > 0 => Err(DriverError::DeviceInUse),
            _ => self.drivers.remove(key).ok_or(DriverError::InvalidDriver),
        }
    }

    pub(crate) fn lookup(&self, id: DriverId) -> Option<SlotKey> {
        self.drivers.find(|e| e.info.id == id)
    }

    pub(crate) fn get(&self, key: SlotKey) -> Option<&DriverEntry> {
        self.drivers.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: SlotKey) -> Option<&mut DriverEntry> {
        self.drivers.get_mut(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &DriverEntry> {
        self.drivers.iter().map(|(_, e)| e)
    }

    pub(crate) fn len(&self) -> usize {
        self.drivers.len()
    }
}
