// SPDX-License-Identifier: Apache-2.0

//! Scripted transport.
//!
//! [`MockTransport`] records every payload it is handed and replies from a
//! script, so device apps can be driven without hardware attached.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use log::debug;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use trezor_transport::{async_trait, DeviceAnswer, DevicePayload, Dispatch, DispatchError};

#[derive(Error, Debug)]
pub enum MockTransportError {
    /// Scripted device failure
    #[error("Mock device: {0}")]
    Device(String),
    /// Payload could not be turned into JSON
    #[error("Mock device: payload serialization error")]
    Serialize(#[from] serde_json::Error),
    /// Script ran out of replies
    #[error("Mock device: no reply scripted")]
    NoReply,
}

/// What the device does with the next payload
#[derive(Clone, Debug, PartialEq)]
pub enum MockReply {
    /// Answer with the given JSON document
    Answer(Value),
    /// User rejects the request on-device
    Cancel,
    /// Fail with the given bridge message
    Fail(String),
}

#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<MockReply>>,
    fallback: Option<MockReply>,
    sent: Mutex<Vec<Value>>,
}

impl MockTransport {
    /// Transport with an empty script; every dispatch fails with `NoReply`
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport replying `reply` to every payload once the script is exhausted
    pub fn replying(reply: MockReply) -> Self {
        MockTransport {
            fallback: Some(reply),
            ..Self::default()
        }
    }

    /// Transport answering every payload with `answer`
    pub fn answering(answer: Value) -> Self {
        Self::replying(MockReply::Answer(answer))
    }

    /// Queue a reply for the next unanswered payload
    pub fn push_reply(&self, reply: MockReply) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// Payloads dispatched so far, in order
    pub fn sent_payloads(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of dispatch calls so far
    pub fn dispatch_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next_reply(&self) -> Option<MockReply> {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl Dispatch for MockTransport {
    type Error = MockTransportError;

    async fn dispatch<F>(
        &self,
        payload: &DevicePayload<F>,
    ) -> Result<DeviceAnswer, DispatchError<Self::Error>>
    where
        F: Serialize + Send + Sync,
    {
        let value = payload
            .to_value()
            .map_err(|e| DispatchError::Transport(e.into()))?;

        debug!("[mock] >> {}", value);
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);

        match self.next_reply() {
            Some(MockReply::Answer(answer)) => {
                debug!("[mock] << {}", answer);
                Ok(DeviceAnswer::new(answer))
            }
            Some(MockReply::Cancel) => Err(DispatchError::Cancelled),
            Some(MockReply::Fail(message)) => Err(DispatchError::from_failure_message(
                &message,
                MockTransportError::Device(message.clone()),
            )),
            None => Err(DispatchError::Transport(MockTransportError::NoReply)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trezor_transport::{FirmwareVersion, PayloadDescriptor};

    fn payload() -> DevicePayload<Value> {
        let descriptor = PayloadDescriptor::new("ethereumSignMessage", FirmwareVersion::new(1, 5, 2));
        DevicePayload::new(&descriptor, json!({ "message": "hi" }))
    }

    #[tokio::test]
    async fn records_payloads_and_answers() {
        let transport = MockTransport::answering(json!({ "ok": true }));

        let answer = transport.dispatch(&payload()).await.unwrap();

        assert_eq!(answer.payload(), &json!({ "ok": true }));
        assert_eq!(transport.dispatch_count(), 1);
        assert_eq!(
            transport.sent_payloads()[0],
            json!({ "type": "ethereumSignMessage", "requiredFirmware": "1.5.2", "message": "hi" })
        );
    }

    #[tokio::test]
    async fn scripted_replies_come_before_the_fallback() {
        let transport = MockTransport::answering(json!(1));
        transport.push_reply(MockReply::Cancel);

        assert!(matches!(
            transport.dispatch(&payload()).await,
            Err(DispatchError::Cancelled)
        ));
        assert!(transport.dispatch(&payload()).await.is_ok());
    }

    #[tokio::test]
    async fn bridge_cancellation_text_is_a_cancellation() {
        let transport = MockTransport::replying(MockReply::Fail("Action cancelled by user".into()));
        assert!(matches!(
            transport.dispatch(&payload()).await,
            Err(DispatchError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn empty_script_fails() {
        let transport = MockTransport::new();
        assert!(matches!(
            transport.dispatch(&payload()).await,
            Err(DispatchError::Transport(MockTransportError::NoReply))
        ));
    }
}
