// SPDX-License-Identifier: Apache-2.0

//! App configuration: the protocol descriptor table and where warnings go

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use log::warn;
use trezor_payload::{PayloadError, ProtocolDescriptors};

/// Receives warnings the signing pipeline recovers from
pub trait WarningSink: Send + Sync {
    fn warning(&self, message: &str);
}

/// Forwards warnings to the `log` facade
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn warning(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Keeps every warning in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    warnings: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings received so far, in order
    pub fn warnings(&self) -> Vec<String> {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl WarningSink for RecordingSink {
    fn warning(&self, message: &str) {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// Configuration shared by every command of the Ethereum app
#[derive(Clone)]
pub struct EthAppConfig {
    /// Operation -> payload type / firmware table
    pub descriptors: ProtocolDescriptors,
    /// Destination of recoverable warnings
    pub warnings: Arc<dyn WarningSink>,
}

impl EthAppConfig {
    pub fn new(descriptors: ProtocolDescriptors, warnings: Arc<dyn WarningSink>) -> Self {
        EthAppConfig {
            descriptors,
            warnings,
        }
    }

    /// Default configuration with descriptors overridden from JSON
    pub fn from_descriptor_json(json: &str) -> Result<Self, PayloadError> {
        Ok(EthAppConfig {
            descriptors: ProtocolDescriptors::from_json(json)?,
            ..Self::default()
        })
    }
}

impl Default for EthAppConfig {
    fn default() -> Self {
        EthAppConfig::new(ProtocolDescriptors::default(), Arc::new(LogSink))
    }
}

impl fmt::Debug for EthAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthAppConfig")
            .field("descriptors", &self.descriptors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trezor_payload::{FirmwareVersion, Operation};

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.warning("first");
        sink.warning("second");
        assert_eq!(sink.warnings(), vec!["first", "second"]);
    }

    #[test]
    fn test_config_from_descriptor_json() {
        let config = EthAppConfig::from_descriptor_json(
            r#"{"signMessage": {"type": "ethereumSignMessage", "requiredFirmware": "2.0.0"}}"#,
        )
        .unwrap();

        assert_eq!(
            config
                .descriptors
                .get(Operation::SignMessage)
                .map(|d| d.required_firmware),
            Some(FirmwareVersion::new(2, 0, 0))
        );
        assert!(config.descriptors.get(Operation::SignTransaction).is_some());
    }

    #[test]
    fn test_config_rejects_bad_json() {
        assert!(EthAppConfig::from_descriptor_json("{").is_err());
    }
}
