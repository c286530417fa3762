#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use doc_relay_gateway::api::error::AppError;
use doc_relay_gateway::config::RelayConfig;
use doc_relay_gateway::services::payload::OutboundPayload;
use doc_relay_gateway::services::relay::Relay;
use doc_relay_gateway::{AppState, create_app};
use http_body_util::BodyExt;
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "----RelayTestBoundary7MA4YWxkTrZu0gW";

/// Canned downstream behaviour for [`RecordingRelay`].
#[derive(Clone)]
pub enum Reply {
    Ok(String),
    Reject(u16, String),
    Unavailable,
}

/// Relay fake that records every payload it is handed.
pub struct RecordingRelay {
    reply: Reply,
    calls: Mutex<Vec<OutboundPayload>>,
}

impl RecordingRelay {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(json: &str) -> Arc<Self> {
        Self::new(Reply::Ok(json.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_payload(&self) -> OutboundPayload {
        self.calls.lock().unwrap().last().cloned().expect("relay was never called")
    }
}

#[async_trait]
impl Relay for RecordingRelay {
    async fn relay(&self, payload: OutboundPayload) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(payload);
        match &self.reply {
            Reply::Ok(text) => Ok(text.clone()),
            Reply::Reject(status, body) => Err(AppError::RelayRejected {
                status: *status,
                body: body.clone(),
            }),
            Reply::Unavailable => Err(AppError::RelayUnavailable("connection refused".into())),
        }
    }
}

pub fn test_app(config: RelayConfig, relay: Arc<RecordingRelay>) -> Router {
    create_app(AppState { relay, config })
}

/// Builds a multipart/form-data body by hand.
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

pub fn content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

pub fn post(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", content_type())
        .body(body)
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
