// SPDX-License-Identifier: Apache-2.0

//! Signature assembler: turns the device's raw `r`, `s`, `v` into a signed
//! transaction ready for broadcast.

use ethers_core::types::{Address, Bytes, Signature, TransactionRequest, H256, U256};
use ethers_core::utils::keccak256;
use thiserror::Error;

use crate::constants::{encoding, length};
use crate::types::{NormalizedTransaction, RawSignature};

/// A component of the signed transaction is not encodable
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid `{field}` component: `{value}`")]
pub struct EncodingError {
    pub field: &'static str,
    pub value: String,
}

impl EncodingError {
    fn new(field: &'static str, value: &str) -> Self {
        EncodingError {
            field,
            value: value.to_string(),
        }
    }
}

/// Signed legacy (EIP-155) transaction
///
/// Holds the device signature exactly as returned; components are only
/// decoded when the transaction is serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: NormalizedTransaction,
    signature: RawSignature,
}

/// Build the signed transaction from the device signature, unmodified
pub fn assemble_signed_transaction(
    transaction: NormalizedTransaction,
    signature: RawSignature,
) -> SignedTransaction {
    SignedTransaction {
        transaction,
        signature,
    }
}

fn digits(value: &str) -> &str {
    value
        .strip_prefix(encoding::HEX_PREFIX)
        .unwrap_or(value)
}

fn quantity(field: &'static str, value: &str) -> Result<U256, EncodingError> {
    U256::from_str_radix(digits(value), 16).map_err(|_| EncodingError::new(field, value))
}

impl SignedTransaction {
    pub fn transaction(&self) -> &NormalizedTransaction {
        &self.transaction
    }

    pub fn signature(&self) -> &RawSignature {
        &self.signature
    }

    /// RLP encoding of the signed transaction
    pub fn rlp_bytes(&self) -> Result<Bytes, EncodingError> {
        let tx = &self.transaction;

        let data = hex::decode(digits(&tx.data)).map_err(|_| EncodingError::new("data", &tx.data))?;
        let mut request = TransactionRequest::new()
            .nonce(quantity("nonce", &tx.nonce)?)
            .gas_price(quantity("gasPrice", &tx.gas_price)?)
            .gas(quantity("gasLimit", &tx.gas_limit)?)
            .value(quantity("value", &tx.value)?)
            .data(data)
            .chain_id(tx.chain_id);

        if let Some(to) = &tx.to {
            let bytes = hex::decode(digits(to))
                .ok()
                .filter(|bytes| bytes.len() * 2 == length::ADDRESS_HEX_DIGITS)
                .ok_or_else(|| EncodingError::new("to", to))?;
            request = request.to(Address::from_slice(&bytes));
        }

        let signature = Signature {
            r: quantity("r", &self.signature.r)?,
            s: quantity("s", &self.signature.s)?,
            v: u64::from_str_radix(digits(&self.signature.v), 16)
                .map_err(|_| EncodingError::new("v", &self.signature.v))?,
        };

        Ok(request.rlp_signed(&signature))
    }

    /// `0x` prefixed hex of the RLP encoding, as accepted by `eth_sendRawTransaction`
    pub fn to_hex(&self) -> Result<String, EncodingError> {
        Ok(format!(
            "{}{}",
            encoding::HEX_PREFIX,
            hex::encode(self.rlp_bytes()?)
        ))
    }

    /// Transaction hash
    pub fn hash(&self) -> Result<H256, EncodingError> {
        Ok(H256::from(keccak256(self.rlp_bytes()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // EIP-155 reference transaction
    fn eip155_transaction() -> NormalizedTransaction {
        NormalizedTransaction {
            path: "m/44'/60'/0'/0".into(),
            gas_price: "04a817c800".into(),
            gas_limit: "5208".into(),
            chain_id: 1,
            nonce: "09".into(),
            to: Some("3535353535353535353535353535353535353535".into()),
            value: "0de0b6b3a7640000".into(),
            data: "".into(),
        }
    }

    fn eip155_signature() -> RawSignature {
        RawSignature::new(
            "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
            "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
            "0x25",
        )
    }

    #[test]
    fn test_assembler_keeps_signature_untouched() {
        let signed = assemble_signed_transaction(eip155_transaction(), eip155_signature());
        assert_eq!(signed.signature(), &eip155_signature());
        assert_eq!(signed.transaction(), &eip155_transaction());
    }

    #[test]
    fn test_rlp_encoding_matches_reference() {
        let signed = assemble_signed_transaction(eip155_transaction(), eip155_signature());

        assert_eq!(
            signed.to_hex().unwrap(),
            "0xf86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a7640000\
             8025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f76\
             1aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
        assert_eq!(
            signed.hash().unwrap(),
            H256::from(keccak256(signed.rlp_bytes().unwrap()))
        );
    }

    #[test]
    fn test_bad_component_surfaces_on_serialization() {
        let signature = RawSignature::new("not-hex", "0x01", "0x1b");
        let signed = assemble_signed_transaction(eip155_transaction(), signature);

        let err = signed.rlp_bytes().unwrap_err();
        assert_eq!(err.field, "r");
        assert_eq!(err.value, "not-hex");
    }
}
