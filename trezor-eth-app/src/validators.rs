// SPDX-License-Identifier: Apache-2.0

//! Validators run before any normalization or device call

use num_bigint::BigUint;
use num_traits::Zero;

use crate::constants::{encoding, length, path};
use crate::errors::{EthAppError, EthAppResult};
use crate::messages::errors;
use crate::types::{BipPath, TransactionFields};

fn hex_digits(value: &str) -> &str {
    value
        .strip_prefix(encoding::HEX_PREFIX)
        .unwrap_or(value)
}

/// Validate a BIP44 style Ethereum derivation path
pub fn derivation_path_validator<E: std::error::Error>(
    derivation_path: &str,
) -> EthAppResult<(), E> {
    if derivation_path.trim().is_empty() {
        return Err(EthAppError::InvalidDerivationPath(
            errors::EMPTY_PATH.to_string(),
        ));
    }

    let bip_path: BipPath = derivation_path
        .parse()
        .map_err(EthAppError::InvalidDerivationPath)?;

    if bip_path.indices.first() != Some(&(path::HARDENED | path::PURPOSE_BIP44)) {
        return Err(EthAppError::InvalidDerivationPath(
            errors::PATH_NOT_BIP44.to_string(),
        ));
    }
    if bip_path.is_hardened(1) != Some(true) {
        return Err(EthAppError::InvalidDerivationPath(
            errors::COIN_NOT_HARDENED.to_string(),
        ));
    }
    if bip_path.is_hardened(2) == Some(false) {
        return Err(EthAppError::InvalidDerivationPath(
            errors::ACCOUNT_NOT_HARDENED.to_string(),
        ));
    }

    Ok(())
}

/// Parse a hex quantity of at most 256 bits
fn hex_quantity<E: std::error::Error>(field: &str, value: &str) -> EthAppResult<BigUint, E> {
    let digits = hex_digits(value.trim());
    if digits.is_empty() || digits.len() > length::MAX_UINT256_HEX_DIGITS {
        return Err(EthAppError::InvalidTransaction(format!(
            "{} must be between 1 and {} hex digits, got `{}`",
            field,
            length::MAX_UINT256_HEX_DIGITS,
            value
        )));
    }

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EthAppError::InvalidTransaction(format!(
            "{} is not a hex number: `{}`",
            field, value
        )));
    }

    let quantity = BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(|| {
        EthAppError::InvalidTransaction(format!("{} is not a hex number: `{}`", field, value))
    })?;
    if quantity.bits() > length::MAX_UINT_BITS {
        return Err(EthAppError::InvalidTransaction(format!(
            "{} exceeds 256 bits",
            field
        )));
    }

    Ok(quantity)
}

/// Validate Ethereum address format (checksum casing is not enforced)
pub fn address_validator<E: std::error::Error>(address: &str) -> EthAppResult<(), E> {
    let digits = hex_digits(address.trim());

    if digits.len() != length::ADDRESS_HEX_DIGITS {
        return Err(EthAppError::InvalidAddress(format!(
            "Address must be {} hex digits long, got {}",
            length::ADDRESS_HEX_DIGITS,
            digits.len()
        )));
    }

    if let Some((i, c)) = digits.chars().enumerate().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(EthAppError::InvalidAddress(format!(
            "Invalid character '{}' at position {}",
            c, i
        )));
    }

    Ok(())
}

/// Validate a byte aligned hex sequence, `0x` prefix optional
pub fn hex_sequence_validator<E: std::error::Error>(
    field: &str,
    sequence: &str,
) -> EthAppResult<(), E> {
    hex::decode(hex_digits(sequence.trim()))
        .map(|_| ())
        .map_err(|e| EthAppError::InvalidTransaction(format!("{}: {}", field, e)))
}

/// Validate the transaction fields, individually and against each other
pub fn transaction_object_validator<E: std::error::Error>(
    transaction: &TransactionFields,
) -> EthAppResult<(), E> {
    let gas_price = hex_quantity("gasPrice", &transaction.gas_price)?;
    let gas_limit = hex_quantity("gasLimit", &transaction.gas_limit)?;
    hex_quantity("nonce", &transaction.nonce)?;
    hex_quantity("value", &transaction.value)?;

    if gas_price.is_zero() {
        return Err(EthAppError::InvalidTransaction(
            "gasPrice must be non-zero".to_string(),
        ));
    }
    if gas_limit.is_zero() {
        return Err(EthAppError::InvalidTransaction(
            "gasLimit must be non-zero".to_string(),
        ));
    }
    if transaction.chain_id == 0 {
        return Err(EthAppError::InvalidTransaction(
            "chainId must be non-zero".to_string(),
        ));
    }

    if let Some(to) = &transaction.to {
        address_validator(to)?;
    }
    hex_sequence_validator("inputData", &transaction.input_data)?;

    if transaction.to.is_none() && hex_digits(transaction.input_data.trim()).is_empty() {
        return Err(EthAppError::InvalidTransaction(
            errors::CONTRACT_WITHOUT_DATA.to_string(),
        ));
    }

    Ok(())
}

/// Validate a personal message
pub fn message_validator<E: std::error::Error>(message: &str) -> EthAppResult<(), E> {
    if message.len() > length::MAX_MESSAGE_SIZE {
        return Err(EthAppError::MessageTooLarge {
            size: message.len(),
            max: length::MAX_MESSAGE_SIZE,
        });
    }

    Ok(())
}
