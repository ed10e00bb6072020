// SPDX-License-Identifier: Apache-2.0

pub use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
pub use trezor_payload::{
    DeviceAnswer, DevicePayload, FirmwareVersion, Operation, PayloadDescriptor,
    ProtocolDescriptors,
};

/// Failure text the Trezor bridge reports when the user rejects on-device
pub const CANCELLED_BY_USER: &str = "Action cancelled by user";

/// Outcome of a dispatch that did not produce an answer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError<E> {
    /// The user rejected the request on the device
    #[error("Action cancelled by user")]
    Cancelled,
    /// The device or the link to it failed
    #[error("Transport error: {0}")]
    Transport(E),
}

impl<E> DispatchError<E> {
    /// Classify a failure reported only as text.
    ///
    /// Adapters talking to a bridge that flattens every failure into a message
    /// use this to surface cancellations as [`DispatchError::Cancelled`].
    pub fn from_failure_message(message: &str, error: E) -> Self {
        if message.trim() == CANCELLED_BY_USER {
            DispatchError::Cancelled
        } else {
            DispatchError::Transport(error)
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DispatchError::Cancelled)
    }
}

/// Use to talk to the Trezor device
///
/// Exactly one request is in flight per call. Implementations sharing one
/// physical device between callers are responsible for queueing access.
#[async_trait]
pub trait Dispatch {
    /// Error defined by Transport used
    type Error;

    /// Send a payload and wait for the device to answer, fail, or be cancelled
    async fn dispatch<F>(
        &self,
        payload: &DevicePayload<F>,
    ) -> Result<DeviceAnswer, DispatchError<Self::Error>>
    where
        F: Serialize + Send + Sync;
}
