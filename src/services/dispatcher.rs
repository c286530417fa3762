//! Maps the downstream answer onto the response sent back to the caller.

use crate::api::error::AppError;
use crate::models::ClarificationBody;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::Value;
use std::io::Write;
use uuid::Uuid;

/// Characters of an undecodable downstream body echoed back for diagnostics.
pub const PREVIEW_LIMIT: usize = 1000;

pub const CLARIFICATION_PHASE: &str = "clarification";
pub const CLARIFICATION_MESSAGE: &str = "Please provide additional information";

#[derive(Debug, Clone, PartialEq)]
pub enum DownstreamReply {
    Clarification {
        questions: Value,
        session_id: Option<String>,
    },
    Final(Value),
}

impl DownstreamReply {
    pub fn decode(raw: &str) -> Result<Self, AppError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| AppError::InvalidDownstreamResponse {
                reason: e.to_string(),
                preview: preview(raw, PREVIEW_LIMIT),
            })?;

        if value.get("phase").and_then(Value::as_str) == Some(CLARIFICATION_PHASE) {
            let questions = value
                .get("questions")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()));
            let session_id = value
                .get("sessionId")
                .and_then(Value::as_str)
                .map(str::to_string);
            return Ok(DownstreamReply::Clarification {
                questions,
                session_id,
            });
        }

        Ok(DownstreamReply::Final(value))
    }
}

/// First `limit` characters of `raw`, never splitting a character.
pub fn preview(raw: &str, limit: usize) -> String {
    match raw.char_indices().nth(limit) {
        Some((end, _)) => raw[..end].to_string(),
        None => raw.to_string(),
    }
}

pub fn generate_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn gzip(data: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| AppError::Internal(format!("Gzip compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| AppError::Internal(format!("Gzip finalization failed: {}", e)))
}

/// Clarifications go back as plain JSON; final results are gzip-compressed.
/// The caller's session id wins over the downstream one.
pub fn dispatch(
    reply: DownstreamReply,
    inbound_session: Option<String>,
) -> Result<Response, AppError> {
    match reply {
        DownstreamReply::Clarification {
            questions,
            session_id,
        } => {
            let session_id = inbound_session
                .filter(|s| !s.is_empty())
                .or(session_id)
                .unwrap_or_else(generate_session_id);
            tracing::info!("❓ Clarification requested for session {}", session_id);

            let body = ClarificationBody {
                phase: CLARIFICATION_PHASE.to_string(),
                questions,
                session_id,
                message: CLARIFICATION_MESSAGE.to_string(),
            };
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        DownstreamReply::Final(value) => {
            let json = serde_json::to_vec(&value)
                .map_err(|e| AppError::Internal(format!("Failed to serialize result: {}", e)))?;
            let compressed = gzip(&json)?;
            tracing::info!(
                "✅ Final result: {} bytes, {} bytes compressed",
                json.len(),
                compressed.len()
            );

            Ok((
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    ),
                    (header::CONTENT_ENCODING, HeaderValue::from_static("gzip")),
                ],
                compressed,
            )
                .into_response())
        }
    }
}
