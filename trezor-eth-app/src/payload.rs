// SPDX-License-Identifier: Apache-2.0

//! Payload builder: tags normalized fields with the fixed descriptor of the
//! operation they belong to.

use trezor_device_base::DeviceAppError;
use trezor_payload::{DevicePayload, Operation, ProtocolDescriptors};

use crate::errors::EthAppResult;
use crate::types::{MessageFields, MessagePayload, NormalizedTransaction, SigningPayload};

/// Tag `fields` with the `type` and `requiredFirmware` of `operation`
pub fn build_payload<F, E: std::error::Error>(
    descriptors: &ProtocolDescriptors,
    operation: Operation,
    fields: F,
) -> EthAppResult<DevicePayload<F>, E> {
    let descriptor = descriptors
        .get(operation)
        .ok_or(DeviceAppError::<E>::UnsupportedOperation(operation))?;

    Ok(DevicePayload::new(descriptor, fields))
}

/// Payload for signing a normalized transaction
pub fn sign_transaction_payload<E: std::error::Error>(
    descriptors: &ProtocolDescriptors,
    transaction: NormalizedTransaction,
) -> EthAppResult<SigningPayload, E> {
    build_payload(descriptors, Operation::SignTransaction, transaction)
}

/// Payload for signing a personal message
pub fn sign_message_payload<E: std::error::Error>(
    descriptors: &ProtocolDescriptors,
    message: MessageFields,
) -> EthAppResult<MessagePayload, E> {
    build_payload(descriptors, Operation::SignMessage, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EthAppError;
    use trezor_payload::{FirmwareVersion, PayloadDescriptor};

    fn normalized() -> NormalizedTransaction {
        NormalizedTransaction {
            path: "m/44'/60'/0'/0".into(),
            gas_price: "03e8".into(),
            gas_limit: "5208".into(),
            chain_id: 1,
            nonce: "00".into(),
            to: Some("742d35cc6535c244b8c80a79d5d22efeadba5b90".into()),
            value: "00".into(),
            data: "".into(),
        }
    }

    #[test]
    fn test_sign_transaction_payload_uses_descriptor() {
        let payload =
            sign_transaction_payload::<std::io::Error>(&ProtocolDescriptors::default(), normalized())
                .unwrap();

        assert_eq!(payload.kind, "ethereumSignTransaction");
        assert_eq!(payload.required_firmware, FirmwareVersion::new(1, 4, 0));
        assert_eq!(payload.fields, normalized());
    }

    #[test]
    fn test_payload_follows_injected_table() {
        let descriptors = ProtocolDescriptors::empty().with(
            Operation::SignTransaction,
            PayloadDescriptor::new("ethereumSignTx", FirmwareVersion::new(2, 3, 0)),
        );

        let payload = sign_transaction_payload::<std::io::Error>(&descriptors, normalized()).unwrap();
        let value = payload.to_value().unwrap();

        assert_eq!(value["type"], "ethereumSignTx");
        assert_eq!(value["requiredFirmware"], "2.3.0");
        assert_eq!(value["gasPrice"], "03e8");
    }

    #[test]
    fn test_missing_descriptor_is_unsupported() {
        let err = sign_message_payload::<std::io::Error>(
            &ProtocolDescriptors::empty(),
            MessageFields {
                path: "m/44'/60'/0'/0".into(),
                message: "hi".into(),
            },
        )
        .unwrap_err();

        assert!(matches!(
            err,
            EthAppError::Device(DeviceAppError::UnsupportedOperation(Operation::SignMessage))
        ));
    }
}
