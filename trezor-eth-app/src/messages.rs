// SPDX-License-Identifier: Apache-2.0

//! Human readable warning and error text

/// Warnings emitted through the warning sink
pub mod warnings {
    /// User rejected the transaction on the device
    pub const CANCEL_TX_SIGN: &str =
        "The user cancelled signing the transaction on the Trezor device";
    /// User rejected the message on the device
    pub const CANCEL_MSG_SIGN: &str =
        "The user cancelled signing the message on the Trezor device";
}

/// Error text used by validators and the input boundary
pub mod errors {
    pub const NO_ARGUMENTS: &str = "sign request arguments";
    pub const NOT_AN_OBJECT: &str = "sign request arguments must be an object";

    pub const EMPTY_PATH: &str = "Derivation path cannot be empty";
    pub const PATH_HEADER: &str = "Derivation path must start with `m`";
    pub const PATH_NOT_BIP44: &str = "Derivation path purpose must be 44'";
    pub const COIN_NOT_HARDENED: &str = "Coin type index must be hardened";
    pub const ACCOUNT_NOT_HARDENED: &str = "Account index must be hardened";

    pub const CONTRACT_WITHOUT_DATA: &str =
        "Contract creation (no destination address) requires input data";
}
