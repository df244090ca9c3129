//! Common test utilities
//!
//! Provides rustls crypto provider setup for the Pact tests and an in-memory
//! scripted transport for exercising the resource store without a network.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use secrets_manager_provider::model::InstanceScope;
use secrets_manager_provider::{ApiOperation, Transport, TransportError};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, Once};

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// This must be called before any async operations that use rustls.
/// Uses a `Once` to ensure it's only called once across all tests.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        // We use ring as the crypto provider (matches the library)
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

pub const REGION: &str = "us-south";
pub const INSTANCE: &str = "instance-1";

pub fn scope() -> InstanceScope {
    InstanceScope::new(REGION, INSTANCE)
}

/// One call the store made
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: ApiOperation,
    pub body: Option<Value>,
}

/// Transport answering from per-operation queues
///
/// Responses are keyed by [`ApiOperation::name`]. An operation with an empty
/// queue fails with a 500 so that unexpected calls surface in assertions.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<&'static str, VecDeque<Result<Value, TransportError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, operation: &'static str, body: Value) -> &Self {
        self.push(operation, Ok(body))
    }

    pub fn fail(&self, operation: &'static str, status: u16, message: &str) -> &Self {
        self.push(operation, Err(TransportError::new(Some(status), message)))
    }

    fn push(&self, operation: &'static str, response: Result<Value, TransportError>) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, operation: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.operation.name() == operation)
            .collect()
    }

    pub fn operation_names(&self) -> Vec<&'static str> {
        self.calls().iter().map(|c| c.operation.name()).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn invoke(
        &self,
        operation: &ApiOperation,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            operation: operation.clone(),
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .get_mut(operation.name())
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::new(
                    Some(500),
                    format!("no scripted response for {}", operation.name()),
                ))
            })
    }
}

/// Wire body of a secret in lifecycle `state`
pub fn secret_body(secret_type: &str, id: &str, state: i64, extra: Value) -> Value {
    let description = match state {
        0 => "pre_activation",
        1 => "active",
        2 => "suspended",
        3 => "deactivated",
        5 => "destroyed",
        _ => "unknown",
    };
    let mut body = json!({
        "secret_type": secret_type,
        "id": id,
        "name": "app-secret",
        "crn": format!("crn:v1:bluemix:public:secrets-manager:{REGION}:a/123:{INSTANCE}:secret:{id}"),
        "created_by": "iam-ServiceId-1",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "versions_total": 1,
        "locks_total": 0,
        "downloaded": false,
        "state": state,
        "state_description": description,
    });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    body
}
