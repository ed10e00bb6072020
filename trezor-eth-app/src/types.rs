// SPDX-License-Identifier: Apache-2.0

//! Core data types for Ethereum application

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use trezor_payload::DevicePayload;

use crate::constants::{defaults, encoding, keys, length, path};
use crate::errors::{EthAppError, EthAppResult};
use crate::messages::errors;

/// BIP32 derivation path
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BipPath {
    /// Derivation indices (max 10 levels)
    pub indices: Vec<u32>,
}

impl BipPath {
    /// Create a new BIP32 path from derivation indices
    pub fn new(indices: Vec<u32>) -> Result<Self, String> {
        if indices.len() > length::MAX_BIP32_PATH_DEPTH {
            return Err(format!(
                "BIP32 path too deep: {} (max {})",
                indices.len(),
                length::MAX_BIP32_PATH_DEPTH
            ));
        }
        Ok(BipPath { indices })
    }

    /// Create a standard Ethereum derivation path: m/44'/60'/account'/0/address_index
    pub fn ethereum_standard(account: u32, address_index: u32) -> Self {
        BipPath {
            indices: vec![
                path::HARDENED | 44,
                path::HARDENED | 60,
                path::HARDENED | account,
                0,
                address_index,
            ],
        }
    }

    /// Whether the index at `level` is hardened
    pub fn is_hardened(&self, level: usize) -> Option<bool> {
        self.indices
            .get(level)
            .map(|index| index & path::HARDENED != 0)
    }
}

impl fmt::Display for BipPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", path::HEADER)?;
        for index in &self.indices {
            if *index >= path::HARDENED {
                write!(f, "/{}'", index - path::HARDENED)?;
            } else {
                write!(f, "/{}", index)?;
            }
        }
        Ok(())
    }
}

impl FromStr for BipPath {
    type Err = String;

    /// Parse `m/44'/60'/0'/0`. Hardened segments may use `'`, `h` or `H`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.trim().split(path::DELIMITER);

        match segments.next() {
            Some(header) if header.trim().eq_ignore_ascii_case(path::HEADER) => {}
            _ => return Err(errors::PATH_HEADER.to_string()),
        }

        let indices = segments
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(parse_path_segment)
            .collect::<Result<Vec<_>, _>>()?;

        BipPath::new(indices)
    }
}

fn parse_path_segment(segment: &str) -> Result<u32, String> {
    let (digits, hardened) = match segment.strip_suffix(['\'', 'h', 'H']) {
        Some(digits) => (digits, true),
        None => (segment, false),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("Invalid path segment `{}`", segment));
    }
    let index: u32 = digits
        .parse()
        .map_err(|_| format!("Invalid path segment `{}`", segment))?;
    if index >= path::HARDENED {
        return Err(format!("Path index out of range: {}", index));
    }

    Ok(if hardened { index | path::HARDENED } else { index })
}

fn default_gas_price() -> String {
    defaults::GAS_PRICE.to_string()
}

fn default_gas_limit() -> String {
    defaults::GAS_LIMIT.to_string()
}

fn default_chain_id() -> u64 {
    defaults::CHAIN_ID
}

fn default_nonce() -> String {
    defaults::NONCE.to_string()
}

fn default_value() -> String {
    defaults::VALUE.to_string()
}

fn default_input_data() -> String {
    defaults::INPUT_DATA.to_string()
}

/// Accept the chain id as a JSON number, a decimal string or a `0x` hex string
fn deserialize_chain_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ChainId {
        Number(u64),
        Text(String),
    }

    match ChainId::deserialize(deserializer)? {
        ChainId::Number(id) => Ok(id),
        ChainId::Text(text) => {
            let text = text.trim();
            let parsed = match text.strip_prefix(encoding::HEX_PREFIX) {
                Some(hex_digits) => u64::from_str_radix(hex_digits, 16),
                None => text.parse(),
            };
            parsed.map_err(|_| D::Error::custom(format!("invalid chainId `{}`", text)))
        }
    }
}

/// Transaction fields as supplied by the caller
///
/// Quantities are hex digit strings, with or without a `0x` prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFields {
    #[serde(default = "default_gas_price")]
    pub gas_price: String,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: String,
    #[serde(
        default = "default_chain_id",
        deserialize_with = "deserialize_chain_id"
    )]
    pub chain_id: u64,
    #[serde(default = "default_nonce")]
    pub nonce: String,
    /// Destination; `None` deploys a contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default = "default_value")]
    pub value: String,
    #[serde(default = "default_input_data")]
    pub input_data: String,
}

impl Default for TransactionFields {
    fn default() -> Self {
        TransactionFields {
            gas_price: default_gas_price(),
            gas_limit: default_gas_limit(),
            chain_id: default_chain_id(),
            nonce: default_nonce(),
            to: None,
            value: default_value(),
            input_data: default_input_data(),
        }
    }
}

/// Arguments with the transaction nested under `transaction`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedInput {
    pub derivation_path: String,
    pub transaction: TransactionFields,
}

/// Arguments with the transaction fields next to `derivationPath`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatInput {
    pub derivation_path: String,
    #[serde(flatten)]
    pub transaction: TransactionFields,
}

/// The two argument shapes accepted for transaction signing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignTransactionInput {
    Nested(NestedInput),
    Flat(FlatInput),
}

impl SignTransactionInput {
    /// Pick the shape by the presence of a `transaction` key
    pub fn from_value(args: &Value) -> Result<Self, serde_json::Error> {
        if args.get(keys::TRANSACTION).map_or(false, |v| !v.is_null()) {
            NestedInput::deserialize(args).map(SignTransactionInput::Nested)
        } else {
            FlatInput::deserialize(args).map(SignTransactionInput::Flat)
        }
    }
}

/// Canonical transaction signing request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignTransactionRequest {
    /// Derivation path of the signing key
    pub derivation_path: String,
    /// Transaction to sign
    pub transaction: TransactionFields,
}

impl SignTransactionRequest {
    pub fn new(derivation_path: impl Into<String>, transaction: TransactionFields) -> Self {
        SignTransactionRequest {
            derivation_path: derivation_path.into(),
            transaction,
        }
    }

    /// Resolve loosely shaped JSON arguments into a request.
    ///
    /// Fails before any field validation when the arguments are absent, are
    /// not an object, or lack the derivation path or the transaction.
    pub fn from_json<E: std::error::Error>(args: &Value) -> EthAppResult<Self, E> {
        let object = match args {
            Value::Null => return Err(EthAppError::MissingInput(errors::NO_ARGUMENTS.into())),
            Value::Object(object) => object,
            _ => return Err(EthAppError::InvalidInput(errors::NOT_AN_OBJECT.into())),
        };

        if is_missing(object, keys::DERIVATION_PATH) {
            return Err(EthAppError::MissingInput(keys::DERIVATION_PATH.into()));
        }

        let has_transaction = match object.get(keys::TRANSACTION) {
            Some(Value::Null) | None => keys::TRANSACTION_FIELDS
                .iter()
                .any(|field| !is_missing(object, field)),
            Some(_) => true,
        };
        if !has_transaction {
            return Err(EthAppError::MissingInput(keys::TRANSACTION.into()));
        }

        SignTransactionInput::from_value(args)
            .map(Into::into)
            .map_err(|e| EthAppError::InvalidInput(e.to_string()))
    }
}

fn is_missing(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).map_or(true, Value::is_null)
}

impl From<SignTransactionInput> for SignTransactionRequest {
    fn from(input: SignTransactionInput) -> Self {
        match input {
            SignTransactionInput::Nested(NestedInput {
                derivation_path,
                transaction,
            })
            | SignTransactionInput::Flat(FlatInput {
                derivation_path,
                transaction,
            }) => SignTransactionRequest {
                derivation_path,
                transaction,
            },
        }
    }
}

/// Transaction fields in the encoding the device expects
///
/// Quantities are even-length lowercase hex, `to` and `data` carry no prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    pub path: String,
    pub gas_price: String,
    pub gas_limit: String,
    pub chain_id: u64,
    pub nonce: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub value: String,
    pub data: String,
}

/// Payload dispatched for a transaction signature
pub type SigningPayload = DevicePayload<NormalizedTransaction>;

/// ECDSA components returned by the device, passed through untouched
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSignature {
    pub r: String,
    pub s: String,
    pub v: String,
}

impl RawSignature {
    pub fn new(r: impl Into<String>, s: impl Into<String>, v: impl Into<String>) -> Self {
        RawSignature {
            r: r.into(),
            s: s.into(),
            v: v.into(),
        }
    }
}

/// Parameters for personal message signing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignMessageParams {
    /// Derivation path of the signing key
    pub derivation_path: String,
    /// Message to sign
    pub message: String,
}

impl SignMessageParams {
    pub fn new(derivation_path: impl Into<String>, message: impl Into<String>) -> Self {
        SignMessageParams {
            derivation_path: derivation_path.into(),
            message: message.into(),
        }
    }
}

/// Message fields in the encoding the device expects
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFields {
    pub path: String,
    pub message: String,
}

/// Payload dispatched for a message signature
pub type MessagePayload = DevicePayload<MessageFields>;

/// Personal message signature returned by the device
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSignature {
    /// Address of the signing key
    pub address: String,
    /// Hex encoded 65 byte signature
    pub signature: String,
}
