//! Shared test doubles: a scripted transport and a counting session.

use crate::session::SessionProvider;
use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use crm_core::Instance;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

struct Scripted {
    result: Result<Value, TransportError>,
    /// When present, the response is held back until the sender fires.
    gate: Option<oneshot::Receiver<()>>,
}

/// Transport double that replays scripted responses in call order and
/// records every request it sees.
#[derive(Default)]
pub(crate) struct FakeTransport {
    json_queue: Mutex<VecDeque<Scripted>>,
    text_queue: Mutex<VecDeque<Result<String, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, value: Value) {
        self.json_queue.lock().unwrap().push_back(Scripted {
            result: Ok(value),
            gate: None,
        });
    }

    pub fn push_error(&self, error: TransportError) {
        self.json_queue.lock().unwrap().push_back(Scripted {
            result: Err(error),
            gate: None,
        });
    }

    /// Script a response that is not delivered until `gate` fires.
    pub fn push_gated_json(&self, value: Value, gate: oneshot::Receiver<()>) {
        self.json_queue.lock().unwrap().push_back(Scripted {
            result: Ok(value),
            gate: Some(gate),
        });
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.text_queue.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, method: Method, path: &str, body: Option<&Value>, query: &[(&str, &str)]) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            body: body.cloned(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        self.record(method, path, body.as_ref(), query);
        let scripted = self
            .json_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response for {path}"));
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.result
    }

    async fn request_text(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, TransportError> {
        self.record(method, path, None, query);
        self.text_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted text response for {path}"))
    }
}

/// Session double that counts invalidations.
pub(crate) struct CountingSession {
    token: Mutex<Option<String>>,
    invalidations: AtomicUsize,
}

impl CountingSession {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
            invalidations: AtomicUsize::new(0),
        }
    }

    pub fn without_token() -> Self {
        Self {
            token: Mutex::new(None),
            invalidations: AtomicUsize::new(0),
        }
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

impl SessionProvider for CountingSession {
    fn current_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn invalidate(&self) {
        *self.token.lock().unwrap() = None;
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn instance_owned_by(owner: &str) -> Instance {
    Instance {
        id: Uuid::now_v7(),
        owned_by: owner.to_string(),
        parent_type: None,
        parent_id: None,
        attachments: Vec::new(),
        fields: serde_json::Map::new(),
    }
}

pub(crate) fn instance_json(id: Uuid, owner: &str, name: &str) -> Value {
    json!({
        "id": id.to_string(),
        "owned_by": owner,
        "parent_type": null,
        "parent_id": null,
        "attachments": [],
        "name": name
    })
}
