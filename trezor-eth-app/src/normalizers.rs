// SPDX-License-Identifier: Apache-2.0

//! Normalizers turning validated input into the device wire encoding.
//!
//! Every function here is total: it expects input that already went through
//! [`crate::validators`] and never fails.

use crate::constants::{encoding, path};
use crate::types::{NormalizedTransaction, TransactionFields};

fn strip_hex_prefix(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix(encoding::HEX_PREFIX)
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

fn with_prefix(digits: String, prefix: bool) -> String {
    if prefix {
        format!("{}{}", encoding::HEX_PREFIX, digits)
    } else {
        digits
    }
}

/// Canonicalize a derivation path: `m` header, `'` hardened markers, no
/// whitespace and no empty segments.
pub fn derivation_path_normalizer(derivation_path: &str) -> String {
    let compact: String = derivation_path
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut segments = compact.split(path::DELIMITER).filter(|s| !s.is_empty());
    let mut normalized = String::from(path::HEADER);
    // header, whatever its case
    segments.next();

    for segment in segments {
        normalized.push(path::DELIMITER);
        match segment.strip_suffix(['\'', 'h', 'H']) {
            Some(index) => {
                normalized.push_str(index);
                normalized.push(path::HARDENED_MARKER);
            }
            None => normalized.push_str(segment),
        }
    }

    normalized
}

/// Lowercase hex digits, left padded to an even count, without prefix
pub fn multiple_of_two_hex_value_normalizer(value: &str) -> String {
    let digits = strip_hex_prefix(value).to_ascii_lowercase();
    if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else if digits.is_empty() {
        "00".to_string()
    } else {
        digits
    }
}

/// Lowercase (never checksum cased) address, `0x` prefixed only if `prefix`
pub fn address_normalizer(address: &str, prefix: bool) -> String {
    with_prefix(strip_hex_prefix(address).to_ascii_lowercase(), prefix)
}

/// Lowercase hex sequence, `0x` prefixed only if `prefix`
pub fn hex_sequence_normalizer(sequence: &str, prefix: bool) -> String {
    with_prefix(strip_hex_prefix(sequence).to_ascii_lowercase(), prefix)
}

/// Normalize every field of a validated transaction
pub fn normalize_transaction(
    derivation_path: &str,
    transaction: &TransactionFields,
) -> NormalizedTransaction {
    NormalizedTransaction {
        path: derivation_path_normalizer(derivation_path),
        gas_price: multiple_of_two_hex_value_normalizer(&transaction.gas_price),
        gas_limit: multiple_of_two_hex_value_normalizer(&transaction.gas_limit),
        chain_id: transaction.chain_id,
        nonce: multiple_of_two_hex_value_normalizer(&transaction.nonce),
        to: transaction
            .to
            .as_deref()
            .map(|to| address_normalizer(to, false)),
        value: multiple_of_two_hex_value_normalizer(&transaction.value),
        data: hex_sequence_normalizer(&transaction.input_data, false),
    }
}
