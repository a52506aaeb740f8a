//! The framework context: registration, channel lifecycle and dispatch.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use photon_core::arena::SlotKey;
use photon_core::sync::SpinLock;
use photon_core::{kdebug, kinfo, kwarn};
use photon_driver_api::driver::cmd;
use photon_driver_api::{
    CallbackParams, CallbackRelay, ChannelHandle, DriverError, DriverHandle, DriverId,
    DriverInfo, FrameList, InstanceId, ProcessList, Timeout, VideoDriver,
};

use crate::channel::{ChannelPool, ChannelState};
use crate::registry::DriverRegistry;

struct Tables {
    registry: DriverRegistry,
    channels: ChannelPool,
}

impl Tables {
    /// Undoes a reservation made by `create`.
    fn rollback(&mut self, handle: ChannelHandle, driver_key: SlotKey) {
        self.channels.release(handle);
        if let Some(entry) = self.registry.get_mut(driver_key) {
            entry.open_count = entry.open_count.saturating_sub(1);
        }
    }
}

/// Driver registry, channel pool and dispatch.
///
/// Registration and channel create/delete serialize on one spin lock. The
/// lock is never held while a driver operation runs: `create` reserves its
/// slot, drops the lock, calls the driver, then commits or rolls back.
/// Every other operation only holds the lock long enough to resolve the
/// handle, so blocking inside `queue`/`dequeue` is entirely the driver's
/// business.
pub struct VideoFramework {
    tables: SpinLock<Tables>,
}

impl Default for VideoFramework {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoFramework {
    /// Creates a framework with empty tables.
    pub const fn new() -> Self {
        Self {
            tables: SpinLock::new(Tables {
                registry: DriverRegistry::new(),
                channels: ChannelPool::new(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Registers a driver under the id reported by its `info()`.
    ///
    /// # Errors
    ///
    /// - [`DriverError::DriverInUse`] if the id is already registered.
    /// - [`DriverError::OutOfResources`] if the registry is full.
    pub fn register_driver(&self, driver: Arc<dyn VideoDriver>) -> Result<(), DriverError> {
        let result = self.tables.lock().registry.register(driver);
        match result {
            Ok(info) => {
                kinfo!("VideoFramework: registered driver {} '{}'", info.id, info.name);
                Ok(())
            }
            Err(e) => {
                kwarn!("VideoFramework: driver registration failed: {}", e);
                Err(e)
            }
        }
    }

    /// Unregisters the driver with `id`.
    ///
    /// # Errors
    ///
    /// - [`DriverError::InvalidDriver`] if `id` is not registered.
    /// - [`DriverError::DeviceInUse`] while channels are open on it.
    pub fn unregister_driver(&self, id: DriverId) -> Result<(), DriverError> {
        let result = self.tables.lock().registry.unregister(id);
        match result {
            Ok(entry) => {
                kinfo!("VideoFramework: unregistered driver {} '{}'", id, entry.info.name);
                Ok(())
            }
            Err(e) => {
                kwarn!("VideoFramework: cannot unregister driver {}: {}", id, e);
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Channel lifecycle
    // -----------------------------------------------------------------------

    /// Opens `instance` of the driver registered under `driver_id`.
    ///
    /// When `callbacks` is given, the driver receives a [`CallbackRelay`]
    /// bound to the new handle. If the driver's create fails, the channel
    /// slot and the driver's open count are restored and no handle is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`DriverError::InvalidDriver`] if no driver matches `driver_id`.
    /// - [`DriverError::OutOfResources`] if the channel pool is full.
    /// - Whatever the driver's create returns.
    pub fn create(
        &self,
        driver_id: DriverId,
        instance: InstanceId,
        args: Option<&dyn Any>,
        status: Option<&mut dyn Any>,
        callbacks: Option<CallbackParams>,
    ) -> Result<ChannelHandle, DriverError> {
        let (handle, driver, driver_key) = {
            let mut guard = self.tables.lock();
            let tables = &mut *guard;
            let Some(driver_key) = tables.registry.lookup(driver_id) else {
                kwarn!("VideoFramework: create on unknown driver {}", driver_id);
                return Err(DriverError::InvalidDriver);
            };
            let entry = tables
                .registry
                .get_mut(driver_key)
                .ok_or(DriverError::InvalidDriver)?;
            let driver = Arc::clone(&entry.driver);
            let handle = tables.channels.reserve(driver_key, Arc::clone(&driver))?;
            entry.open_count += 1;
            (handle, driver, driver_key)
        };

        let relay = callbacks.map(|params| CallbackRelay::new(handle, params));
        match driver.create(instance, args, status, relay) {
            Ok(driver_handle) => {
                let mut tables = self.tables.lock();
                let entry = tables.channels.get_mut(handle)?;
                entry.state = ChannelState::Open(driver_handle);
                entry.relay = relay;
                kdebug!(
                    "VideoFramework: opened {:?} on driver {} instance {}",
                    handle,
                    driver_id,
                    instance
                );
                Ok(handle)
            }
            Err(e) => {
                self.tables.lock().rollback(handle, driver_key);
                kwarn!(
                    "VideoFramework: driver {} create failed for instance {}: {}",
                    driver_id,
                    instance,
                    e
                );
                Err(e)
            }
        }
    }

    /// Closes a channel opened by [`create`](Self::create).
    ///
    /// The slot is released only if the driver's delete succeeds; on
    /// failure the channel stays open and usable. After a successful delete
    /// the handle is stale and every operation on it fails with `BadArgs`.
    ///
    /// # Errors
    ///
    /// - [`DriverError::BadArgs`] for a null, stale or not-yet-open handle.
    /// - Whatever the driver's delete returns.
    pub fn delete(&self, handle: ChannelHandle, args: Option<&dyn Any>) -> Result<(), DriverError> {
        let (driver, driver_handle) = {
            let mut tables = self.tables.lock();
            let entry = tables.channels.get_mut(handle)?;
            let ChannelState::Open(driver_handle) = entry.state else {
                return Err(DriverError::BadArgs);
            };
            entry.state = ChannelState::Deleting;
            (Arc::clone(&entry.driver), driver_handle)
        };

        let result = driver.delete(driver_handle, args);

        let mut guard = self.tables.lock();
        let tables = &mut *guard;
        match result {
            Ok(()) => {
                if let Some(entry) = tables.channels.release(handle) {
                    if let Some(owner) = tables.registry.get_mut(entry.driver_key) {
                        owner.open_count = owner.open_count.saturating_sub(1);
                    }
                }
                kdebug!("VideoFramework: closed {:?}", handle);
            }
            Err(e) => {
                if let Ok(entry) = tables.channels.get_mut(handle) {
                    entry.state = ChannelState::Open(driver_handle);
                }
                kwarn!("VideoFramework: driver delete failed for {:?}: {}", handle, e);
            }
        }
        result
    }

    // -----------------------------------------------------------------------
    // Forwarders
    // -----------------------------------------------------------------------

    fn resolve(&self, handle: ChannelHandle) -> Result<(Arc<dyn VideoDriver>, DriverHandle), DriverError> {
        if handle.is_null() {
            return Err(DriverError::BadArgs);
        }
        self.tables
            .lock()
            .channels
            .get(handle)?
            .open()
            .ok_or(DriverError::BadArgs)
    }

    /// Forwards a control command.
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle, otherwise the driver's result.
    pub fn control(
        &self,
        handle: ChannelHandle,
        cmd: u32,
        args: Option<&mut dyn Any>,
    ) -> Result<(), DriverError> {
        let (driver, dh) = self.resolve(handle)?;
        driver.control(dh, cmd, args)
    }

    /// Forwards a queue request.
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle, otherwise the driver's result.
    pub fn queue(&self, handle: ChannelHandle, frames: &mut FrameList, stream: u32) -> Result<(), DriverError> {
        let (driver, dh) = self.resolve(handle)?;
        driver.queue(dh, frames, stream)
    }

    /// Forwards a dequeue request; `timeout` reaches the driver unmodified.
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle, otherwise the driver's result.
    pub fn dequeue(
        &self,
        handle: ChannelHandle,
        frames: &mut FrameList,
        stream: u32,
        timeout: Timeout,
    ) -> Result<(), DriverError> {
        let (driver, dh) = self.resolve(handle)?;
        driver.dequeue(dh, frames, stream, timeout)
    }

    /// Forwards a memory-to-memory request.
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle, otherwise the driver's result.
    pub fn process_frames(&self, handle: ChannelHandle, list: &mut ProcessList) -> Result<(), DriverError> {
        let (driver, dh) = self.resolve(handle)?;
        driver.process_frames(dh, list)
    }

    /// Forwards retrieval of a completed memory-to-memory request.
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle, otherwise the driver's result.
    pub fn get_processed_frames(
        &self,
        handle: ChannelHandle,
        list: &mut ProcessList,
        timeout: Timeout,
    ) -> Result<(), DriverError> {
        let (driver, dh) = self.resolve(handle)?;
        driver.get_processed_frames(dh, list, timeout)
    }

    /// Forwards a single-list request.
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle, otherwise the driver's result.
    pub fn process_request(
        &self,
        handle: ChannelHandle,
        input: &mut FrameList,
        output: &mut FrameList,
    ) -> Result<(), DriverError> {
        let (driver, dh) = self.resolve(handle)?;
        driver.process_request(dh, input, output)
    }

    /// Forwards retrieval of a completed single-list request.
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle, otherwise the driver's result.
    pub fn get_processed_request(
        &self,
        handle: ChannelHandle,
        input: &mut FrameList,
        output: &mut FrameList,
        timeout: Timeout,
    ) -> Result<(), DriverError> {
        let (driver, dh) = self.resolve(handle)?;
        driver.get_processed_request(dh, input, output, timeout)
    }

    /// Starts streaming on a channel.
    ///
    /// Drivers that only understand the `cmd::START` control command are
    /// reached through `control` (without `args`).
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle, otherwise the driver's result.
    pub fn start(&self, handle: ChannelHandle, args: Option<&dyn Any>) -> Result<(), DriverError> {
        let (driver, dh) = self.resolve(handle)?;
        match driver.start(dh, args) {
            Err(DriverError::UnsupportedOperation) => driver.control(dh, cmd::START, None),
            other => other,
        }
    }

    /// Stops streaming on a channel; falls back to `cmd::STOP` like
    /// [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle, otherwise the driver's result.
    pub fn stop(&self, handle: ChannelHandle, args: Option<&dyn Any>) -> Result<(), DriverError> {
        let (driver, dh) = self.resolve(handle)?;
        match driver.stop(dh, args) {
            Err(DriverError::UnsupportedOperation) => driver.control(dh, cmd::STOP, None),
            other => other,
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Metadata of every registered driver, in slot order.
    pub fn registered_drivers(&self) -> Vec<DriverInfo> {
        self.tables.lock().registry.iter().map(|e| e.info).collect()
    }

    /// Number of registered drivers.
    pub fn driver_count(&self) -> usize {
        self.tables.lock().registry.len()
    }

    /// Open channels on the driver with `id`, or `None` if it is not registered.
    pub fn open_count(&self, id: DriverId) -> Option<u32> {
        let tables = self.tables.lock();
        let key = tables.registry.lookup(id)?;
        tables.registry.get(key).map(|e| e.open_count)
    }

    /// Occupied channel slots, including channels mid-create or mid-delete.
    pub fn channels_in_use(&self) -> usize {
        self.tables.lock().channels.len()
    }

    /// Metadata of the driver behind an open channel.
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle.
    pub fn driver_info(&self, handle: ChannelHandle) -> Result<DriverInfo, DriverError> {
        let (driver, _) = self.resolve(handle)?;
        Ok(driver.info())
    }

    /// The callback relay bound to an open channel, if callbacks were given.
    ///
    /// # Errors
    ///
    /// `BadArgs` for an invalid handle.
    pub fn relay(&self, handle: ChannelHandle) -> Result<Option<CallbackRelay>, DriverError> {
        let tables = self.tables.lock();
        let entry = tables.channels.get(handle)?;
        match entry.state {
            ChannelState::Open(_) => Ok(entry.relay),
            _ => Err(DriverError::BadArgs),
        }
    }
}
