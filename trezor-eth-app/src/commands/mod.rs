// SPDX-License-Identifier: Apache-2.0

//! Command implementations for Ethereum application

pub mod sign_message;
pub mod sign_transaction;

pub use sign_message::*;
pub use sign_transaction::*;
