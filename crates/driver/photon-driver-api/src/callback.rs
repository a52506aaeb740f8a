//! Channel handles and completion/error callback relays.
//!
//! Applications register plain function pointers plus an [`AppToken`]. The
//! framework wraps them in a [`CallbackRelay`] that also captures the
//! [`ChannelHandle`], so a driver can signal completion without knowing how
//! the application represents its channels. Relays may fire from interrupt
//! context; the callee must not block.

use photon_core::arena::SlotKey;
use photon_core::id::AppToken;

use crate::frame::FrameList;

/// Opaque handle to one open channel.
///
/// Valid between `create` and `delete`. The handle carries a generation, so
/// using it after `delete` is reported as `BadArgs` rather than reaching
/// whichever channel reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHandle(SlotKey);

impl ChannelHandle {
    /// The null handle; every operation on it fails with `BadArgs`.
    pub const NULL: Self = Self(SlotKey::INVALID);

    /// Wraps a channel-pool key.
    pub const fn from_key(key: SlotKey) -> Self {
        Self(key)
    }

    /// Returns the channel-pool key.
    pub const fn key(self) -> SlotKey {
        self.0
    }

    /// Returns `true` for [`ChannelHandle::NULL`].
    pub const fn is_null(self) -> bool {
        self.0.is_invalid()
    }
}

/// Completion callback: a request on `handle` finished.
pub type CompletionFn = fn(handle: ChannelHandle, token: AppToken);

/// Error callback: a request on `handle` failed; `errors` lists the frames
/// the driver gave up on, when it has them.
pub type ErrorFn = fn(handle: ChannelHandle, token: AppToken, errors: Option<&FrameList>);

/// Callbacks supplied by the application at `create` time.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallbackParams {
    /// Called when a request completes.
    pub completion: Option<CompletionFn>,
    /// Called when a request fails asynchronously.
    pub error: Option<ErrorFn>,
    /// Returned verbatim to both callbacks.
    pub token: AppToken,
}

impl CallbackParams {
    /// Completion callback only.
    pub const fn on_complete(completion: CompletionFn, token: AppToken) -> Self {
        Self {
            completion: Some(completion),
            error: None,
            token,
        }
    }
}

/// Callback binding handed to a driver; captures the channel handle.
#[derive(Debug, Clone, Copy)]
pub struct CallbackRelay {
    handle: ChannelHandle,
    params: CallbackParams,
}

impl CallbackRelay {
    /// Binds `params` to `handle`.
    pub const fn new(handle: ChannelHandle, params: CallbackParams) -> Self {
        Self { handle, params }
    }

    /// The channel this relay reports for.
    pub const fn handle(&self) -> ChannelHandle {
        self.handle
    }

    /// The application token.
    pub const fn token(&self) -> AppToken {
        self.params.token
    }

    /// Invokes the completion callback, if one was registered.
    pub fn notify_complete(&self) {
        if let Some(f) = self.params.completion {
            f(self.handle, self.params.token);
        }
    }

    /// Invokes the error callback, if one was registered.
    pub fn notify_error(&self, errors: Option<&FrameList>) {
        if let Some(f) = self.params.error {
            f(self.handle, self.params.token, errors);
        }
    }
}
