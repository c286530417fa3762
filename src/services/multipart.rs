//! Bounded multipart parser.
//!
//! Drives axum's streaming [`Multipart`] reader on its own task and turns it
//! into a flat sequence of [`ParseEvent`]s on a bounded channel. Each file is
//! announced by `FileStart`, followed by its chunks in stream order and a
//! closing `FileEnd`; the sequence always ends with exactly one `Finished` or
//! `Failed`, unless the receiving side went away first.

use crate::api::error::AppError;
use crate::config::RelayConfig;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Events buffered between the parser task and the collector.
const EVENT_BUFFER: usize = 16;

#[derive(Debug)]
pub enum ParseEvent {
    Field {
        name: String,
        value: String,
    },
    FileStart {
        field_name: String,
        file_name: Option<String>,
        content_type: Option<String>,
    },
    FileChunk(Bytes),
    FileEnd,
    Finished,
    Failed(AppError),
}

impl ParseEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ParseEvent::Finished | ParseEvent::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub max_files: usize,
}

impl UploadLimits {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            max_files: config.max_files,
        }
    }
}

/// Why the parser stopped before reaching the end of the body.
enum Halt {
    Failed(AppError),
    /// The collector dropped its receiver (deadline hit); nobody is listening.
    Detached,
}

impl From<AppError> for Halt {
    fn from(err: AppError) -> Self {
        Halt::Failed(err)
    }
}

/// Validates the content type and boundary of the inbound request and wraps
/// its body in a streaming multipart reader. No body bytes are read here.
pub async fn open(req: Request) -> Result<Multipart, AppError> {
    Multipart::from_request(req, &())
        .await
        .map_err(|rejection| AppError::MalformedMultipart(rejection.body_text()))
}

/// Starts the parser task. The returned handle can be aborted to stop reading
/// the inbound body early.
pub fn spawn_parser(
    multipart: Multipart,
    limits: UploadLimits,
) -> (mpsc::Receiver<ParseEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    let handle = tokio::spawn(async move {
        let terminal = match drive(multipart, limits, &tx).await {
            Ok(()) => ParseEvent::Finished,
            Err(Halt::Failed(err)) => ParseEvent::Failed(err),
            Err(Halt::Detached) => {
                tracing::debug!("Collector detached, parser stopping");
                return;
            }
        };
        let _ = tx.send(terminal).await;
    });

    (rx, handle)
}

async fn drive(
    mut multipart: Multipart,
    limits: UploadLimits,
    tx: &mpsc::Sender<ParseEvent>,
) -> Result<(), Halt> {
    let mut files_seen = 0usize;

    while let Some(mut field) = multipart.next_field().await.map_err(classify)? {
        let name = field.name().unwrap_or_default().to_string();

        // Parts carrying a filename attribute are files, even when it is empty.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await.map_err(classify)?;
            emit(tx, ParseEvent::Field { name, value }).await?;
            continue;
        };

        files_seen += 1;
        if files_seen > limits.max_files {
            return Err(AppError::TooManyFiles(limits.max_files).into());
        }

        let content_type = field.content_type().map(str::to_string);
        tracing::info!("📄 File detected: {} (field {})", file_name, name);

        emit(
            tx,
            ParseEvent::FileStart {
                field_name: name,
                file_name: Some(file_name.clone()).filter(|n| !n.is_empty()),
                content_type,
            },
        )
        .await?;

        let mut received = 0usize;
        while let Some(chunk) = field.chunk().await.map_err(classify)? {
            received += chunk.len();
            if received > limits.max_file_size {
                return Err(AppError::FileTooLarge(format!(
                    "{} exceeds the {} byte limit",
                    if file_name.is_empty() { "file" } else { file_name.as_str() },
                    limits.max_file_size
                ))
                .into());
            }
            emit(tx, ParseEvent::FileChunk(chunk)).await?;
        }

        emit(tx, ParseEvent::FileEnd).await?;
    }

    Ok(())
}

async fn emit(tx: &mpsc::Sender<ParseEvent>, event: ParseEvent) -> Result<(), Halt> {
    tx.send(event).await.map_err(|_| Halt::Detached)
}

fn classify(err: MultipartError) -> Halt {
    let text = err.body_text();
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge(text).into()
    } else {
        AppError::MalformedMultipart(text).into()
    }
}
