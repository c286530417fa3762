//! Upload collector: folds parser events into an [`UploadRequest`].

use crate::api::error::AppError;
use crate::config::RelayConfig;
use crate::models::{UploadRequest, UploadedFile};
use crate::services::multipart::{self, ParseEvent, UploadLimits};
use axum::extract::Request;
use bytes::{Bytes, BytesMut};
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Pending,
    Complete,
}

/// A file whose chunks are still arriving.
#[derive(Debug)]
struct OpenFile {
    field_name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    chunks: Vec<Bytes>,
}

impl OpenFile {
    fn seal(self) -> UploadedFile {
        let bytes = match self.chunks.len() {
            0 => Bytes::new(),
            1 => self.chunks.into_iter().next().unwrap_or_default(),
            _ => {
                let total = self.chunks.iter().map(Bytes::len).sum();
                let mut buffer = BytesMut::with_capacity(total);
                for chunk in &self.chunks {
                    buffer.extend_from_slice(chunk);
                }
                buffer.freeze()
            }
        };

        UploadedFile {
            field_name: self.field_name,
            file_name: self.file_name.unwrap_or_else(default_file_name),
            content_type: self.content_type,
            bytes,
        }
    }
}

/// Name given to attachments uploaded without one.
pub fn default_file_name() -> String {
    format!("document-{}.pdf", Uuid::new_v4())
}

#[derive(Debug, Default)]
pub struct UploadCollector {
    request: UploadRequest,
    open_file: Option<OpenFile>,
}

impl UploadCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one parser event. Returns `Complete` once the terminal
    /// `Finished` event has been seen; a `Failed` event becomes the error.
    pub fn apply(&mut self, event: ParseEvent) -> Result<Progress, AppError> {
        match event {
            ParseEvent::Field { name, value } => {
                self.set_field(&name, value);
            }
            ParseEvent::FileStart {
                field_name,
                file_name,
                content_type,
            } => {
                if self.open_file.is_some() {
                    return Err(AppError::MalformedMultipart(
                        "file started before the previous one ended".to_string(),
                    ));
                }
                self.open_file = Some(OpenFile {
                    field_name,
                    file_name,
                    content_type,
                    chunks: Vec::new(),
                });
            }
            ParseEvent::FileChunk(chunk) => {
                let file = self.open_file.as_mut().ok_or_else(|| {
                    AppError::MalformedMultipart("file data outside of a file part".to_string())
                })?;
                file.chunks.push(chunk);
            }
            ParseEvent::FileEnd => {
                let file = self.open_file.take().ok_or_else(|| {
                    AppError::MalformedMultipart("file end without a file part".to_string())
                })?;
                let sealed = file.seal();
                tracing::info!(
                    "✅ File processed: {} {} bytes",
                    sealed.file_name,
                    sealed.size()
                );
                self.request.attachments.push(sealed);
            }
            ParseEvent::Finished => {
                if self.open_file.is_some() {
                    return Err(AppError::MalformedMultipart(
                        "upload finished inside a file part".to_string(),
                    ));
                }
                return Ok(Progress::Complete);
            }
            ParseEvent::Failed(err) => return Err(err),
        }
        Ok(Progress::Pending)
    }

    fn set_field(&mut self, name: &str, value: String) {
        tracing::debug!("📝 Field [{}]: {} bytes", name, value.len());
        match name {
            "prompt" => self.request.prompt = value,
            "phase" => self.request.phase = value,
            "sessionId" => self.request.session_id = Some(value),
            "clarificationResponse" => self.request.clarification_response = Some(value),
            other => tracing::debug!("Ignoring unknown field '{}'", other),
        }
    }

    pub fn finish(self) -> UploadRequest {
        self.request
    }

    /// Consumes events until the upload completes, fails, or `deadline`
    /// (measured from this call) elapses. Resolves exactly once.
    pub async fn collect(
        mut self,
        events: &mut mpsc::Receiver<ParseEvent>,
        deadline: Duration,
    ) -> Result<UploadRequest, AppError> {
        let timer = tokio::time::sleep(deadline);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if self.apply(event)? == Progress::Complete {
                            return Ok(self.finish());
                        }
                    }
                    None => {
                        return Err(AppError::MalformedMultipart(
                            "upload ended without completing".to_string(),
                        ));
                    }
                },
                _ = &mut timer => {
                    tracing::warn!("⏱️  Upload not completed within {:?}", deadline);
                    return Err(AppError::UploadTimeout);
                }
            }
        }
    }
}

/// Parses the inbound multipart request into an [`UploadRequest`] under the
/// configured size, count and time limits.
pub async fn receive_upload(req: Request, config: &RelayConfig) -> Result<UploadRequest, AppError> {
    let multipart = multipart::open(req).await?;
    let (mut events, parser) = multipart::spawn_parser(multipart, UploadLimits::from_config(config));

    let outcome = UploadCollector::new()
        .collect(&mut events, config.upload_timeout)
        .await;

    // A parser still running here lost the race; stop it reading the body.
    parser.abort();
    outcome
}
