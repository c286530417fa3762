use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed multipart body: {0}")]
    MalformedMultipart(String),

    #[error("File too large: {0}")]
    FileTooLarge(String),

    #[error("Too many files: at most {0} allowed")]
    TooManyFiles(usize),

    #[error("Upload timeout")]
    UploadTimeout,

    #[error("{0}")]
    MissingPrompt(String),

    #[error("Relay unavailable: {0}")]
    RelayUnavailable(String),

    #[error("Relay rejected with status {status}")]
    RelayRejected { status: u16, body: String },

    #[error("Invalid response from downstream service: {reason}")]
    InvalidDownstreamResponse { reason: String, preview: String },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MalformedMultipart(_) => "malformed_multipart",
            AppError::FileTooLarge(_) => "file_too_large",
            AppError::TooManyFiles(_) => "too_many_files",
            AppError::UploadTimeout => "upload_timeout",
            AppError::MissingPrompt(_) => "missing_prompt",
            AppError::RelayUnavailable(_) => "relay_unavailable",
            AppError::RelayRejected { .. } => "relay_rejected",
            AppError::InvalidDownstreamResponse { .. } => "invalid_downstream_response",
            AppError::MethodNotAllowed => "method_not_allowed",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingPrompt(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();

        let body = match self {
            AppError::RelayRejected { status: upstream, body } => {
                tracing::error!("❌ Downstream rejected request ({}): {}", upstream, body);
                json!({
                    "error": code,
                    "message": message,
                    "status": upstream,
                    "details": body,
                })
            }
            AppError::InvalidDownstreamResponse { reason, preview } => {
                tracing::error!("❌ Downstream JSON parse failed: {}", reason);
                json!({
                    "error": code,
                    "message": message,
                    "rawResponse": preview,
                })
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({
                    "error": code,
                    "message": "Internal Server Error",
                })
            }
            AppError::MissingPrompt(_) | AppError::MethodNotAllowed => json!({
                "error": code,
                "message": message,
            }),
            other => {
                tracing::warn!("⚠️  Request aborted: {}", other);
                json!({
                    "error": code,
                    "message": message,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}
