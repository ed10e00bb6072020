// SPDX-License-Identifier: Apache-2.0

//! Error types for Ethereum application

use thiserror::Error;
use trezor_device_base::DeviceAppError;

/// Ethereum application specific errors
#[derive(Debug, Error)]
pub enum EthAppError<E: std::error::Error> {
    /// Error from the underlying transport/device
    #[error("Device error: {0}")]
    Device(#[from] DeviceAppError<E>),

    /// Required top-level input is missing
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// Input does not have the expected shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid BIP32 derivation path
    #[error("Invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    /// Invalid Ethereum address format
    #[error("Invalid Ethereum address: {0}")]
    InvalidAddress(String),

    /// Invalid transaction field
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Message data too large
    #[error("Message data too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

impl<E: std::error::Error> EthAppError<E> {
    /// Check if error is due to user rejection
    pub fn is_user_rejected(&self) -> bool {
        matches!(self, EthAppError::Device(DeviceAppError::Cancelled))
    }

    /// Check if error is due to transport/communication issues
    pub fn is_transport_error(&self) -> bool {
        matches!(self, EthAppError::Device(DeviceAppError::Transport(_)))
    }

    /// Check if error is due to missing or malformed top-level input
    pub fn is_input_shape_error(&self) -> bool {
        matches!(
            self,
            EthAppError::MissingInput(_) | EthAppError::InvalidInput(_)
        )
    }

    /// Check if error is due to invalid input parameters
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            EthAppError::InvalidDerivationPath(_)
                | EthAppError::InvalidAddress(_)
                | EthAppError::InvalidTransaction(_)
                | EthAppError::MessageTooLarge { .. }
        )
    }
}

/// Result type alias for Ethereum application operations
pub type EthAppResult<T, E> = Result<T, EthAppError<E>>;
