// SPDX-License-Identifier: Apache-2.0

//! SIGN TRANSACTION command implementation

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use trezor_device_base::{AppExt, DeviceAppError};
use trezor_transport::Dispatch;

use crate::config::EthAppConfig;
use crate::errors::EthAppResult;
use crate::messages::warnings;
use crate::normalizers::normalize_transaction;
use crate::payload::sign_transaction_payload;
use crate::signature::{assemble_signed_transaction, SignedTransaction};
use crate::types::{RawSignature, SignTransactionRequest};
use crate::validators::{derivation_path_validator, transaction_object_validator};
use crate::EthApp;

#[async_trait]
pub trait SignTransaction<D>
where
    D: Dispatch + Send + Sync,
    D::Error: std::error::Error + Send + Sync,
{
    /// Sign a transaction with the key at the request's derivation path.
    ///
    /// Resolves to `Ok(None)` when the user cancels on the device.
    async fn sign_transaction(
        transport: &D,
        config: &EthAppConfig,
        request: SignTransactionRequest,
    ) -> EthAppResult<Option<SignedTransaction>, D::Error>;

    /// Same as `sign_transaction`, taking loosely shaped JSON arguments
    async fn sign_transaction_json(
        transport: &D,
        config: &EthAppConfig,
        args: &Value,
    ) -> EthAppResult<Option<SignedTransaction>, D::Error>;
}

#[async_trait]
impl<D> SignTransaction<D> for EthApp
where
    D: Dispatch + Send + Sync,
    D::Error: std::error::Error + Send + Sync,
{
    async fn sign_transaction(
        transport: &D,
        config: &EthAppConfig,
        request: SignTransactionRequest,
    ) -> EthAppResult<Option<SignedTransaction>, D::Error> {
        let SignTransactionRequest {
            derivation_path,
            transaction,
        } = request;

        transaction_object_validator(&transaction)?;
        derivation_path_validator(&derivation_path)?;

        let normalized = normalize_transaction(&derivation_path, &transaction);
        let payload = sign_transaction_payload(&config.descriptors, normalized)?;

        match <EthApp as AppExt<D>>::send_payload::<_, RawSignature>(transport, &payload).await {
            Ok(signature) => {
                debug!("[{}] transaction signed on {}", payload.kind, payload.fields.path);
                Ok(Some(assemble_signed_transaction(payload.fields, signature)))
            }
            Err(DeviceAppError::Cancelled) => {
                config.warnings.warning(warnings::CANCEL_TX_SIGN);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn sign_transaction_json(
        transport: &D,
        config: &EthAppConfig,
        args: &Value,
    ) -> EthAppResult<Option<SignedTransaction>, D::Error> {
        let request = SignTransactionRequest::from_json(args)?;
        <EthApp as SignTransaction<D>>::sign_transaction(transport, config, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use trezor_transport_mock::{MockReply, MockTransport};

    use crate::config::RecordingSink;
    use crate::errors::EthAppError;
    use crate::types::TransactionFields;

    fn request() -> SignTransactionRequest {
        SignTransactionRequest::new(
            "m/44'/60'/0'/0",
            TransactionFields {
                gas_price: "3e8".into(),
                to: Some("0x742d35Cc6535C244B8c80A79d5d22efeAdBA5B90".into()),
                ..TransactionFields::default()
            },
        )
    }

    fn config(sink: &Arc<RecordingSink>) -> EthAppConfig {
        EthAppConfig {
            warnings: sink.clone(),
            ..EthAppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_the_device() {
        let transport = MockTransport::answering(json!({ "r": "01", "s": "02", "v": "1b" }));
        let sink = Arc::new(RecordingSink::new());
        let mut bad = request();
        bad.derivation_path = "m/0/0".into();

        let result = EthApp::sign_transaction(&transport, &config(&sink), bad).await;

        assert!(matches!(result, Err(EthAppError::InvalidDerivationPath(_))));
        assert_eq!(transport.dispatch_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_warns_once_and_returns_nothing() {
        let transport = MockTransport::replying(MockReply::Cancel);
        let sink = Arc::new(RecordingSink::new());

        let result = EthApp::sign_transaction(&transport, &config(&sink), request()).await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(sink.warnings(), vec![warnings::CANCEL_TX_SIGN]);
        assert_eq!(transport.dispatch_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = MockTransport::replying(MockReply::Fail("Oh no!".into()));
        let sink = Arc::new(RecordingSink::new());

        let err = EthApp::sign_transaction(&transport, &config(&sink), request())
            .await
            .unwrap_err();

        assert!(err.is_transport_error());
        assert!(sink.warnings().is_empty());
    }
}
