// SPDX-License-Identifier: Apache-2.0

//! Payload and answer types exchanged with a Trezor device.
//!
//! A [`DevicePayload`] is a tagged request: the operation `type`, the minimum
//! firmware the device must run, and the operation specific fields flattened
//! next to them. The device replies with a [`DeviceAnswer`], an untyped JSON
//! document that each command parses into its own response type.

mod descriptors;

pub use descriptors::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{ResultExt, Snafu};

/// Errors raised while building payloads or reading answers
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PayloadError {
    /// Firmware version is not `major.minor.patch`
    #[snafu(display("invalid firmware version `{version}`"))]
    InvalidFirmwareVersion { version: String },

    /// Operation name is not part of the protocol
    #[snafu(display("unknown device operation `{name}`"))]
    UnknownOperation { name: String },

    /// Descriptor table could not be deserialized
    #[snafu(display("invalid protocol descriptor table: {source}"))]
    InvalidDescriptorTable { source: serde_json::Error },

    /// Answer does not have the shape the command expects
    #[snafu(display("malformed device answer: {source}"))]
    MalformedAnswer { source: serde_json::Error },
}

/// Tagged request sent to the device
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePayload<F> {
    /// Operation type understood by the device
    #[serde(rename = "type")]
    pub kind: String,
    /// Oldest firmware able to run this operation
    pub required_firmware: FirmwareVersion,
    /// Operation specific fields
    #[serde(flatten)]
    pub fields: F,
}

impl<F> DevicePayload<F> {
    /// Tag `fields` with the type and firmware requirement of `descriptor`
    pub fn new(descriptor: &PayloadDescriptor, fields: F) -> Self {
        DevicePayload {
            kind: descriptor.kind.clone(),
            required_firmware: descriptor.required_firmware,
            fields,
        }
    }
}

impl<F: Serialize> DevicePayload<F> {
    /// JSON form of the payload, as handed to a bridge
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Raw reply from the device
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DeviceAnswer {
    payload: Value,
}

impl DeviceAnswer {
    /// Wrap a JSON reply
    pub fn new(payload: Value) -> Self {
        DeviceAnswer { payload }
    }

    /// Untyped reply
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Deserialize the reply into the response type of a command
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        T::deserialize(&self.payload).context(MalformedAnswerSnafu)
    }
}

impl From<Value> for DeviceAnswer {
    fn from(payload: Value) -> Self {
        DeviceAnswer::new(payload)
    }
}
