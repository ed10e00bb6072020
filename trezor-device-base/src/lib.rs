// SPDX-License-Identifier: Apache-2.0

mod errors;

use async_trait::async_trait;
pub use errors::*;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use trezor_payload::DevicePayload;
use trezor_transport::{Dispatch, DispatchError};

/// Defines what we can consider an "App"
pub trait App {
    /// Name used when logging device traffic for this app
    const NAME: &'static str;
}

#[async_trait]
pub trait AppExt<D>: App
where
    D: Dispatch + Send + Sync,
    D::Error: std::error::Error + Send + Sync,
{
    /// Dispatch `payload` once and parse the answer into `T`.
    ///
    /// A user rejection comes back as [`DeviceAppError::Cancelled`]; callers
    /// decide whether that is an error.
    async fn send_payload<F, T>(
        transport: &D,
        payload: &DevicePayload<F>,
    ) -> Result<T, DeviceAppError<D::Error>>
    where
        F: Serialize + Send + Sync,
        T: DeserializeOwned + Send,
    {
        debug!(
            "[{}] dispatching `{}` (firmware >= {})",
            Self::NAME,
            payload.kind,
            payload.required_firmware
        );

        let answer = match transport.dispatch(payload).await {
            Ok(answer) => answer,
            Err(DispatchError::Cancelled) => {
                info!("[{}] `{}` cancelled on device", Self::NAME, payload.kind);
                return Err(DeviceAppError::Cancelled);
            }
            Err(DispatchError::Transport(err)) => return Err(DeviceAppError::Transport(err)),
        };

        answer.parse().map_err(DeviceAppError::InvalidAnswer)
    }
}

impl<T, D> AppExt<D> for T
where
    T: App,
    D: Dispatch + Send + Sync,
    D::Error: std::error::Error + Send + Sync,
{
}
