// SPDX-License-Identifier: Apache-2.0

//! SIGN PERSONAL MESSAGE command implementation

use async_trait::async_trait;
use trezor_device_base::{AppExt, DeviceAppError};
use trezor_transport::Dispatch;

use crate::config::EthAppConfig;
use crate::errors::EthAppResult;
use crate::messages::warnings;
use crate::normalizers::derivation_path_normalizer;
use crate::payload::sign_message_payload;
use crate::types::{MessageFields, MessageSignature, SignMessageParams};
use crate::validators::{derivation_path_validator, message_validator};
use crate::EthApp;

#[async_trait]
pub trait SignPersonalMessage<D>
where
    D: Dispatch + Send + Sync,
    D::Error: std::error::Error + Send + Sync,
{
    /// Sign a personal message using the given BIP 32 path.
    ///
    /// Resolves to `Ok(None)` when the user cancels on the device.
    async fn sign_personal_message(
        transport: &D,
        config: &EthAppConfig,
        params: SignMessageParams,
    ) -> EthAppResult<Option<MessageSignature>, D::Error>;
}

#[async_trait]
impl<D> SignPersonalMessage<D> for EthApp
where
    D: Dispatch + Send + Sync,
    D::Error: std::error::Error + Send + Sync,
{
    async fn sign_personal_message(
        transport: &D,
        config: &EthAppConfig,
        params: SignMessageParams,
    ) -> EthAppResult<Option<MessageSignature>, D::Error> {
        derivation_path_validator(&params.derivation_path)?;
        message_validator(&params.message)?;

        let fields = MessageFields {
            path: derivation_path_normalizer(&params.derivation_path),
            message: params.message,
        };
        let payload = sign_message_payload(&config.descriptors, fields)?;

        match <EthApp as AppExt<D>>::send_payload(transport, &payload).await {
            Ok(signature) => Ok(Some(signature)),
            Err(DeviceAppError::Cancelled) => {
                config.warnings.warning(warnings::CANCEL_MSG_SIGN);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
