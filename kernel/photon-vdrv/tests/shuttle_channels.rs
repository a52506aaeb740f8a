//! Randomized-schedule tests of concurrent channel lifecycle.
//!
//! The mock driver yields to the shuttle scheduler inside create/delete,
//! which is exactly the window where the framework lock is released.

use std::any::Any;
use std::sync::Arc;

use photon_driver_api::driver::cmd;
use photon_driver_api::{
    CallbackRelay, DriverError, DriverHandle, DriverId, DriverInfo, DriverKind, InstanceId,
    VideoDriver,
};
use photon_vdrv::VideoFramework;

const ID: DriverId = DriverId::new(0x20);

struct YieldingDriver;

impl VideoDriver for YieldingDriver {
    fn info(&self) -> DriverInfo {
        DriverInfo {
            id: ID,
            name: "yielding",
            kind: DriverKind::Display,
            max_instances: 8,
        }
    }

    fn create(
        &self,
        instance: InstanceId,
        _args: Option<&dyn Any>,
        _status: Option<&mut dyn Any>,
        _relay: Option<CallbackRelay>,
    ) -> Result<DriverHandle, DriverError> {
        shuttle::thread::yield_now();
        if instance.as_u32() % 3 == 2 {
            Err(DriverError::NoDevice)
        } else {
            Ok(DriverHandle::new(instance.as_u32() as usize))
        }
    }

    fn delete(&self, _handle: DriverHandle, _args: Option<&dyn Any>) -> Result<(), DriverError> {
        shuttle::thread::yield_now();
        Ok(())
    }

    fn control(
        &self,
        _handle: DriverHandle,
        _cmd: u32,
        _args: Option<&mut dyn Any>,
    ) -> Result<(), DriverError> {
        shuttle::thread::yield_now();
        Ok(())
    }
}

#[test]
fn concurrent_create_delete_restores_pool() {
    shuttle::check_random(
        || {
            let fw = Arc::new(VideoFramework::new());
            fw.register_driver(Arc::new(YieldingDriver)).unwrap();

            let workers: Vec<_> = (0..3u32)
                .map(|t| {
                    let fw = Arc::clone(&fw);
                    shuttle::thread::spawn(move || {
                        for i in 0..3u32 {
                            let instance = InstanceId::new(t * 3 + i);
                            match fw.create(ID, instance, None, None, None) {
                                Ok(h) => {
                                    assert_eq!(fw.control(h, cmd::GET_STATUS, None), Ok(()));
                                    assert_eq!(fw.delete(h, None), Ok(()));
                                    assert_eq!(fw.delete(h, None), Err(DriverError::BadArgs));
                                }
                                Err(e) => assert_eq!(e, DriverError::NoDevice),
                            }
                        }
                    })
                })
                .collect();
            for w in workers {
                w.join().unwrap();
            }

            assert_eq!(fw.channels_in_use(), 0);
            assert_eq!(fw.open_count(ID), Some(0));
        },
        200,
    );
}

#[test]
fn unregister_races_with_create() {
    shuttle::check_random(
        || {
            let fw = Arc::new(VideoFramework::new());
            fw.register_driver(Arc::new(YieldingDriver)).unwrap();

            let creator = {
                let fw = Arc::clone(&fw);
                shuttle::thread::spawn(move || fw.create(ID, InstanceId::new(0), None, None, None))
            };
            let unregistered = fw.unregister_driver(ID);
            let created = creator.join().unwrap();

            match (unregistered, created) {
                // Unregister won: create found nothing.
                (Ok(()), Err(e)) => assert_eq!(e, DriverError::InvalidDriver),
                // Create reserved first: unregister must refuse.
                (Err(e), Ok(h)) => {
                    assert_eq!(e, DriverError::DeviceInUse);
                    assert_eq!(fw.delete(h, None), Ok(()));
                    assert_eq!(fw.unregister_driver(ID), Ok(()));
                }
                other => panic!("inconsistent outcome: {other:?}"),
            }
            assert_eq!(fw.channels_in_use(), 0);
        },
        200,
    );
}
