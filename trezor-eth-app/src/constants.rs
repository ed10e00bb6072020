// SPDX-License-Identifier: Apache-2.0

//! Protocol constants for the Ethereum app

/// Data length constants
pub mod length {
    /// Maximum BIP 32 derivation path depth
    pub const MAX_BIP32_PATH_DEPTH: usize = 10;
    /// Hex digits of an Ethereum address
    pub const ADDRESS_HEX_DIGITS: usize = 40;
    /// Hex digits of the largest 256 bit quantity
    pub const MAX_UINT256_HEX_DIGITS: usize = 64;
    /// Bit width of transaction quantities
    pub const MAX_UINT_BITS: u64 = 256;
    /// Maximum personal message size accepted by the device
    pub const MAX_MESSAGE_SIZE: usize = 1024;
}

/// BIP 32 / BIP 44 path constants
pub mod path {
    /// Offset marking a hardened derivation index
    pub const HARDENED: u32 = 0x8000_0000;
    /// BIP 44 purpose index
    pub const PURPOSE_BIP44: u32 = 44;
    /// Header every derivation path starts with
    pub const HEADER: &str = "m";
    /// Hardened segment marker in canonical form
    pub const HARDENED_MARKER: char = '\'';
    /// Segment delimiter
    pub const DELIMITER: char = '/';
}

/// JSON keys of the signing arguments
pub mod keys {
    pub const DERIVATION_PATH: &str = "derivationPath";
    pub const TRANSACTION: &str = "transaction";

    /// Transaction fields accepted next to `derivationPath`
    pub const TRANSACTION_FIELDS: [&str; 7] = [
        "gasPrice",
        "gasLimit",
        "chainId",
        "nonce",
        "to",
        "value",
        "inputData",
    ];
}

/// Encoding constants
pub mod encoding {
    /// Prefix of hex literals
    pub const HEX_PREFIX: &str = "0x";
}

/// Values applied to transaction fields the caller leaves out
pub mod defaults {
    /// 9 gwei
    pub const GAS_PRICE: &str = "218711a00";
    /// Plain value transfer
    pub const GAS_LIMIT: &str = "5208";
    /// Ethereum mainnet
    pub const CHAIN_ID: u64 = 1;
    pub const NONCE: &str = "0";
    pub const VALUE: &str = "0";
    pub const INPUT_DATA: &str = "0x";
}
