// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;
use trezor_payload::{Operation, PayloadError};

/// Errors shared by every device app
#[derive(Debug, Error)]
pub enum DeviceAppError<E: std::error::Error> {
    /// The user rejected the request on the device
    #[error("Action cancelled by user")]
    Cancelled,

    /// Transport or device failure
    #[error("Transport error: {0}")]
    Transport(E),

    /// Device answered with something the app cannot read
    #[error("Invalid device answer: {0}")]
    InvalidAnswer(#[source] PayloadError),

    /// Protocol table has no descriptor for the operation
    #[error("Operation `{0}` is not supported by the protocol table")]
    UnsupportedOperation(Operation),
}

impl<E: std::error::Error> DeviceAppError<E> {
    /// Check if the user rejected the request on-device
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DeviceAppError::Cancelled)
    }
}
