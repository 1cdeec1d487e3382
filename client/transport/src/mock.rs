//! Scripted transport used by the repository, engine, and workflow tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use matriq_core::{CapturedImage, TransportError};

use crate::client::Transport;

/// A transport that replays canned responses in order and records every
/// call it receives.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
    calls: Mutex<Vec<String>>,
    json_bodies: Mutex<Vec<serde_json::Value>>,
    upload_fields: Mutex<Vec<String>>,
    hold: Option<Arc<Notify>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a success response with the given JSON payload.
    pub fn with_ok_json(self, value: serde_json::Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(serde_json::to_vec(&value).unwrap()));
        self
    }

    /// Queue a success response with a raw body.
    pub fn with_ok_body(self, body: impl Into<Vec<u8>>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(body.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: TransportError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Block every call until the notify handle is signalled.
    pub fn with_hold(mut self, hold: Arc<Notify>) -> Self {
        self.hold = Some(hold);
        self
    }

    /// Calls seen so far, as `"METHOD /path"` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// JSON bodies of the POST requests seen so far.
    pub fn json_bodies(&self) -> Vec<serde_json::Value> {
        self.json_bodies.lock().unwrap().clone()
    }

    /// Multipart field names of the uploads seen so far.
    pub fn upload_fields(&self) -> Vec<String> {
        self.upload_fields.lock().unwrap().clone()
    }

    async fn next(&self, call: String) -> Result<Vec<u8>, TransportError> {
        self.calls.lock().unwrap().push(call);
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::NetworkFailure("no scripted response".into())))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        self.next(format!("GET {path}")).await
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<Vec<u8>, TransportError> {
        self.json_bodies.lock().unwrap().push(body);
        self.next(format!("POST {path}")).await
    }

    async fn upload(
        &self,
        path: &str,
        field: &str,
        _image: &CapturedImage,
    ) -> Result<Vec<u8>, TransportError> {
        self.upload_fields.lock().unwrap().push(field.to_string());
        self.next(format!("UPLOAD {path}")).await
    }
}
