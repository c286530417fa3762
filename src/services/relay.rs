use crate::api::error::AppError;
use crate::config::{EnrichedMethod, RelayConfig};
use crate::services::payload::OutboundPayload;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use std::time::Duration;

/// Trait for the single outbound call to the downstream service
#[async_trait::async_trait]
pub trait Relay: Send + Sync {
    /// Sends the payload and returns the raw response text of a 2xx answer.
    async fn relay(&self, payload: OutboundPayload) -> Result<String, AppError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrichedBody<'a> {
    prompt: &'a str,
    phase: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clarification_response: Option<&'a str>,
}

/// Relay over HTTP with a shared, connection-pooling client.
pub struct HttpRelay {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    enriched_method: EnrichedMethod,
}

impl HttpRelay {
    pub fn new(
        url: String,
        timeout: Duration,
        enriched_method: EnrichedMethod,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            timeout,
            enriched_method,
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self, AppError> {
        Self::new(
            config.relay_url.clone(),
            config.relay_timeout,
            config.enriched_method,
        )
    }

    fn build_request(&self, payload: OutboundPayload) -> Result<reqwest::RequestBuilder, AppError> {
        let request = match payload {
            OutboundPayload::Multipart { fields, files } => {
                let mut form = Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                for file in files {
                    let length = file.bytes.len() as u64;
                    let part = Part::stream_with_length(reqwest::Body::from(file.bytes), length)
                        .file_name(file.file_name)
                        .mime_str(&file.content_type)
                        .map_err(|e| {
                            AppError::Internal(format!(
                                "Invalid document content type '{}': {}",
                                file.content_type, e
                            ))
                        })?;
                    form = form.part(file.field_name, part);
                }
                self.client.post(&self.url).multipart(form)
            }
            OutboundPayload::Enriched {
                prompt,
                phase,
                session_id,
                clarification_response,
                ..
            } => {
                let body = EnrichedBody {
                    prompt: &prompt,
                    phase: &phase,
                    session_id: session_id.as_deref(),
                    clarification_response: clarification_response.as_deref(),
                };
                match self.enriched_method {
                    EnrichedMethod::Post => self.client.post(&self.url).json(&body),
                    EnrichedMethod::Get => self.client.get(&self.url).query(&body),
                }
            }
        };
        Ok(request)
    }
}

#[async_trait::async_trait]
impl Relay for HttpRelay {
    async fn relay(&self, payload: OutboundPayload) -> Result<String, AppError> {
        tracing::info!("📦 Relaying {} payload to {}", payload.mode().as_str(), self.url);

        let response = self.build_request(payload)?.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::RelayUnavailable(format!(
                    "downstream did not answer within {:?}",
                    self.timeout
                ))
            } else {
                AppError::RelayUnavailable(e.to_string())
            }
        })?;

        let status = response.status();
        tracing::info!("📊 Downstream response: {}", status);

        let text = response
            .text()
            .await
            .map_err(|e| AppError::RelayUnavailable(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::RelayRejected {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}
