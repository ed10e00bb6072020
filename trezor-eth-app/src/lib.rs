// SPDX-License-Identifier: Apache-2.0

//! Trezor Ethereum Application SDK
//!
//! Validates and normalizes Ethereum signing requests, dispatches them to a
//! Trezor device through any [`Dispatch`] implementation and assembles the
//! returned signature into a broadcastable transaction.
//!
//! ## Features
//!
//! - **Transaction signing**: nested or flat arguments, EIP-155 serialization
//! - **Personal messages**: `personal_sign` style message signatures
//! - **Cancellation**: a user rejection on the device is a warning, not an error
//! - **Configurable protocol table**: payload `type` and firmware per operation

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use trezor_device_base::App;
use trezor_payload::ProtocolDescriptors;
use trezor_transport::Dispatch;

pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod messages;
pub mod normalizers;
pub mod payload;
pub mod signature;
pub mod types;
pub mod validators;

pub use commands::*;
pub use config::*;
pub use errors::*;
pub use signature::*;
pub use types::*;

/// Ethereum app marker implementing the `App` trait.
#[derive(Debug, Clone)]
pub struct EthApp;

impl App for EthApp {
    const NAME: &'static str = "ethereum";
}

/// High-level Ethereum application client
///
/// Owns the transport and the configuration every command runs with.
#[derive(Debug)]
pub struct EthereumApp<D: Dispatch> {
    transport: D,
    config: EthAppConfig,
}

impl<D: Dispatch> EthereumApp<D> {
    /// Create a client with the default protocol table, logging warnings
    pub fn new(transport: D) -> Self {
        Self::with_config(transport, EthAppConfig::default())
    }

    pub fn with_config(transport: D, config: EthAppConfig) -> Self {
        Self { transport, config }
    }

    /// Replace the protocol descriptor table
    pub fn with_descriptors(mut self, descriptors: ProtocolDescriptors) -> Self {
        self.config.descriptors = descriptors;
        self
    }

    /// Route recoverable warnings to `sink`
    pub fn with_warning_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.config.warnings = sink;
        self
    }

    /// Get a reference to the underlying transport
    pub fn transport(&self) -> &D {
        &self.transport
    }

    pub fn config(&self) -> &EthAppConfig {
        &self.config
    }
}

#[async_trait]
impl<D> SignTransaction<D> for EthereumApp<D>
where
    D: Dispatch + Send + Sync,
    D::Error: std::error::Error + Send + Sync,
{
    async fn sign_transaction(
        transport: &D,
        config: &EthAppConfig,
        request: SignTransactionRequest,
    ) -> EthAppResult<Option<SignedTransaction>, D::Error> {
        EthApp::sign_transaction(transport, config, request).await
    }

    async fn sign_transaction_json(
        transport: &D,
        config: &EthAppConfig,
        args: &Value,
    ) -> EthAppResult<Option<SignedTransaction>, D::Error> {
        EthApp::sign_transaction_json(transport, config, args).await
    }
}

#[async_trait]
impl<D> SignPersonalMessage<D> for EthereumApp<D>
where
    D: Dispatch + Send + Sync,
    D::Error: std::error::Error + Send + Sync,
{
    async fn sign_personal_message(
        transport: &D,
        config: &EthAppConfig,
        params: SignMessageParams,
    ) -> EthAppResult<Option<MessageSignature>, D::Error> {
        EthApp::sign_personal_message(transport, config, params).await
    }
}

impl<D> EthereumApp<D>
where
    D: Dispatch + Send + Sync,
    D::Error: std::error::Error + Send + Sync,
{
    /// Sign an Ethereum transaction
    ///
    /// The transaction is validated and normalized before a single payload
    /// is dispatched to the device.
    ///
    /// # Returns
    ///
    /// Returns `None` when the user cancelled on the device; a warning is
    /// emitted through the configured sink in that case.
    pub async fn sign_transaction(
        &self,
        request: SignTransactionRequest,
    ) -> EthAppResult<Option<SignedTransaction>, D::Error> {
        EthApp::sign_transaction(&self.transport, &self.config, request).await
    }

    /// Sign an Ethereum transaction from JSON arguments
    ///
    /// Accepts `{ derivationPath, transaction: {..} }` as well as the
    /// transaction fields given next to `derivationPath`.
    pub async fn sign_transaction_json(
        &self,
        args: &Value,
    ) -> EthAppResult<Option<SignedTransaction>, D::Error> {
        EthApp::sign_transaction_json(&self.transport, &self.config, args).await
    }

    /// Sign an Ethereum personal message
    pub async fn sign_personal_message(
        &self,
        params: SignMessageParams,
    ) -> EthAppResult<Option<MessageSignature>, D::Error> {
        EthApp::sign_personal_message(&self.transport, &self.config, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trezor_payload::{FirmwareVersion, Operation, PayloadDescriptor};
    use trezor_transport_mock::{MockReply, MockTransport};

    const R: &str = "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276";
    const S: &str = "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scenario_args() -> Value {
        json!({
            "derivationPath": "m/44'/60'/0'/0",
            "gasPrice": "3e8",
            "gasLimit": "5208",
            "chainId": 1,
            "nonce": "0",
            "to": "0x742d35Cc6535C244B8c80A79d5d22efeAdBA5B90",
            "value": "0",
            "inputData": "0x",
        })
    }

    fn app(reply: MockReply) -> (EthereumApp<MockTransport>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let app = EthereumApp::new(MockTransport::replying(reply)).with_warning_sink(sink.clone());
        (app, sink)
    }

    #[tokio::test]
    async fn test_sign_transaction_dispatches_normalized_payload() {
        init_logger();
        let (app, sink) = app(MockReply::Answer(json!({ "r": R, "s": S, "v": "0x25" })));

        let signed = app
            .sign_transaction_json(&scenario_args())
            .await
            .unwrap()
            .expect("signature");

        let sent = app.transport().sent_payloads();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            json!({
                "type": "ethereumSignTransaction",
                "requiredFirmware": "1.4.0",
                "path": "m/44'/60'/0'/0",
                "gasPrice": "03e8",
                "gasLimit": "5208",
                "chainId": 1,
                "nonce": "00",
                "to": "742d35cc6535c244b8c80a79d5d22efeadba5b90",
                "value": "00",
                "data": "",
            })
        );

        assert_eq!(signed.signature(), &RawSignature::new(R, S, "0x25"));
        assert!(signed.to_hex().unwrap().starts_with("0x"));
        assert!(sink.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_nested_arguments_dispatch_the_same_payload() {
        let answer = json!({ "r": R, "s": S, "v": "0x25" });
        let (flat, _) = app(MockReply::Answer(answer.clone()));
        let (nested, _) = app(MockReply::Answer(answer));

        let args = scenario_args();
        let mut transaction = args.clone();
        if let Value::Object(fields) = &mut transaction {
            fields.remove("derivationPath");
        }

        flat.sign_transaction_json(&args).await.unwrap();
        nested
            .sign_transaction_json(&json!({
                "derivationPath": "m/44'/60'/0'/0",
                "transaction": transaction,
            }))
            .await
            .unwrap();

        assert_eq!(
            flat.transport().sent_payloads(),
            nested.transport().sent_payloads()
        );
    }

    #[tokio::test]
    async fn test_injected_descriptor_reaches_the_device() {
        let (app, _) = app(MockReply::Answer(json!({ "r": R, "s": S, "v": "0x25" })));
        let app = app.with_descriptors(ProtocolDescriptors::default().with(
            Operation::SignTransaction,
            PayloadDescriptor::new("ethereumSignTx", FirmwareVersion::new(2, 0, 0)),
        ));

        app.sign_transaction_json(&scenario_args()).await.unwrap();

        let sent = app.transport().sent_payloads();
        assert_eq!(sent[0]["type"], "ethereumSignTx");
        assert_eq!(sent[0]["requiredFirmware"], "2.0.0");
    }

    #[tokio::test]
    async fn test_user_cancellation_is_not_an_error() {
        init_logger();
        let (app, sink) = app(MockReply::Cancel);

        let result = app.sign_transaction_json(&scenario_args()).await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(sink.warnings().len(), 1);
        assert_eq!(app.transport().dispatch_count(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_sentinel_from_bridge_is_recognized() {
        let (app, sink) = app(MockReply::Fail("Action cancelled by user".into()));

        let result = app.sign_transaction_json(&scenario_args()).await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(sink.warnings(), vec![messages::warnings::CANCEL_TX_SIGN]);
    }

    #[tokio::test]
    async fn test_device_failure_is_propagated() {
        let (app, sink) = app(MockReply::Fail("Device disconnected".into()));

        let err = app
            .sign_transaction_json(&scenario_args())
            .await
            .unwrap_err();

        assert!(err.is_transport_error());
        assert!(!err.is_user_rejected());
        assert!(sink.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_missing_arguments_fail_without_dispatch() {
        let (app, _) = app(MockReply::Cancel);

        let err = app.sign_transaction_json(&Value::Null).await.unwrap_err();

        assert!(err.is_input_shape_error());
        assert_eq!(app.transport().dispatch_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_field_fails_without_dispatch() {
        let (app, _) = app(MockReply::Cancel);
        let mut args = scenario_args();
        args["gasLimit"] = json!("0");

        let err = app.sign_transaction_json(&args).await.unwrap_err();

        assert!(err.is_invalid_input());
        assert_eq!(app.transport().dispatch_count(), 0);
    }

    #[tokio::test]
    async fn test_transaction_is_validated_before_the_path() {
        let (app, _) = app(MockReply::Cancel);
        let mut args = scenario_args();
        args["gasPrice"] = json!("0");
        args["derivationPath"] = json!("m/0/0");

        let err = app.sign_transaction_json(&args).await.unwrap_err();

        assert!(matches!(err, EthAppError::InvalidTransaction(_)));
        assert_eq!(app.transport().dispatch_count(), 0);

        args["gasPrice"] = json!("3e8");
        let err = app.sign_transaction_json(&args).await.unwrap_err();

        assert!(matches!(err, EthAppError::InvalidDerivationPath(_)));
        assert_eq!(app.transport().dispatch_count(), 0);
    }

    #[tokio::test]
    async fn test_non_hex_quantities_never_reach_the_device() {
        let (app, _) = app(MockReply::Cancel);
        let mut args = scenario_args();
        args["gasPrice"] = json!("+3e8");
        args["gasLimit"] = json!("52_08");

        let err = app.sign_transaction_json(&args).await.unwrap_err();

        assert!(matches!(err, EthAppError::InvalidTransaction(_)));
        assert_eq!(app.transport().dispatch_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_personal_message_through_client() {
        let (app, _) = app(MockReply::Answer(json!({
            "address": "0x742d35cc6535c244b8c80a79d5d22efeadba5b90",
            "signature": "00".repeat(65),
        })));

        let signature = app
            .sign_personal_message(SignMessageParams::new("m/44h/60h/0h/0", "gm"))
            .await
            .unwrap()
            .expect("signature");

        assert_eq!(signature.address, "0x742d35cc6535c244b8c80a79d5d22efeadba5b90");
        assert_eq!(app.transport().sent_payloads()[0]["path"], "m/44'/60'/0'/0");
    }
}
