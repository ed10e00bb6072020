// SPDX-License-Identifier: Apache-2.0

//! Protocol descriptor table: which payload type and firmware each device
//! operation requires.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::ResultExt;

use crate::{
    InvalidDescriptorTableSnafu, InvalidFirmwareVersionSnafu, PayloadError,
    UnknownOperationSnafu,
};

/// Device operations known to the protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// Sign an account based transaction
    SignTransaction,
    /// Sign a personal message
    SignMessage,
}

impl Operation {
    /// Every operation, in table order
    pub const ALL: [Operation; 2] = [Operation::SignTransaction, Operation::SignMessage];

    /// Name used as key in descriptor tables
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::SignTransaction => "signTransaction",
            Operation::SignMessage => "signMessage",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = PayloadError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| UnknownOperationSnafu { name }.build())
    }
}

/// Firmware version as `major.minor.patch`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirmwareVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Patch version
    pub patch: u32,
}

impl FirmwareVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        FirmwareVersion {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for FirmwareVersion {
    type Err = PayloadError;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let parts = version
            .trim()
            .split('.')
            .map(str::parse::<u32>)
            .collect::<Result<Vec<_>, _>>()
            .ok()
            .filter(|parts| parts.len() == 3)
            .ok_or_else(|| InvalidFirmwareVersionSnafu { version }.build())?;

        Ok(FirmwareVersion::new(parts[0], parts[1], parts[2]))
    }
}

impl Serialize for FirmwareVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FirmwareVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let version = String::deserialize(deserializer)?;
        version.parse().map_err(serde::de::Error::custom)
    }
}

/// Fixed `type` / `requiredFirmware` pair of one operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub required_firmware: FirmwareVersion,
}

impl PayloadDescriptor {
    pub fn new(kind: impl Into<String>, required_firmware: FirmwareVersion) -> Self {
        PayloadDescriptor {
            kind: kind.into(),
            required_firmware,
        }
    }
}

/// Immutable operation -> descriptor map
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolDescriptors {
    entries: BTreeMap<Operation, PayloadDescriptor>,
}

impl ProtocolDescriptors {
    /// Table with no operation supported
    pub fn empty() -> Self {
        ProtocolDescriptors {
            entries: BTreeMap::new(),
        }
    }

    /// Return a copy of the table with `operation` mapped to `descriptor`
    pub fn with(mut self, operation: Operation, descriptor: PayloadDescriptor) -> Self {
        self.entries.insert(operation, descriptor);
        self
    }

    /// Descriptor of `operation`, if the table supports it
    pub fn get(&self, operation: Operation) -> Option<&PayloadDescriptor> {
        self.entries.get(&operation)
    }

    /// Load a table from JSON shaped as
    /// `{"signTransaction": {"type": "...", "requiredFirmware": "1.4.0"}}`.
    ///
    /// Operations missing from the document keep their default descriptor.
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        let raw: BTreeMap<String, PayloadDescriptor> =
            serde_json::from_str(json).context(InvalidDescriptorTableSnafu)?;

        raw.into_iter()
            .try_fold(ProtocolDescriptors::default(), |table, (name, descriptor)| {
                Ok(table.with(name.parse()?, descriptor))
            })
    }
}

impl Default for ProtocolDescriptors {
    fn default() -> Self {
        ProtocolDescriptors::empty()
            .with(
                Operation::SignTransaction,
                PayloadDescriptor::new("ethereumSignTransaction", FirmwareVersion::new(1, 4, 0)),
            )
            .with(
                Operation::SignMessage,
                PayloadDescriptor::new("ethereumSignMessage", FirmwareVersion::new(1, 5, 2)),
            )
    }
}
