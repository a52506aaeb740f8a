//! Type-safe identifiers shared across the video stack.
//!
//! These newtypes prevent accidental mixing of driver ids, instance ids and
//! application tokens at compile time. All of them are plain integers on the
//! wire so they can cross into board code unchanged.

use core::fmt;

macro_rules! u32_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier from its raw value.
            pub const fn new(val: u32) -> Self {
                Self(val)
            }

            /// Returns the raw `u32` value.
            pub const fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }
    };
}

u32_id! {
    /// Identifies a driver implementation (capture, display, controller, ...).
    DriverId
}

u32_id! {
    /// Identifies one hardware instance served by a driver.
    InstanceId
}

/// Application-owned opaque value handed back verbatim in callbacks.
///
/// The framework never interprets it; it exists so a callback can recover
/// its context without a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct AppToken(usize);

impl AppToken {
    /// Creates a token from an application value.
    pub const fn new(val: usize) -> Self {
        Self(val)
    }

    /// Returns the application value.
    pub const fn get(self) -> usize {
        self.0
    }
}
