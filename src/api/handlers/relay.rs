use crate::AppState;
use crate::api::error::AppError;
use crate::models::{ClarificationBody, ErrorBody};
use crate::services::collector::receive_upload;
use crate::services::dispatcher::{DownstreamReply, dispatch};
use crate::services::payload::PayloadAssembler;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::Response,
};

#[utoipa::path(
    post,
    path = "/api/relay",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "Fields prompt, phase, sessionId, clarificationResponse plus up to 5 documents"
    ),
    responses(
        (status = 200, description = "Clarification questions (plain JSON) or final result (gzip-encoded JSON)", body = ClarificationBody),
        (status = 400, description = "Neither prompt nor clarificationResponse given", body = ErrorBody),
        (status = 405, description = "Method not allowed", body = ErrorBody),
        (status = 500, description = "Upload, relay or downstream failure", body = ErrorBody)
    ),
    tag = "relay"
)]
pub async fn relay_upload(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, AppError> {
    let upload = receive_upload(req, &state.config).await?;
    tracing::info!(
        "📦 Upload complete: phase={}, {} attachment(s)",
        upload.phase,
        upload.attachments.len()
    );

    let session_id = upload.session_id.clone();
    let payload = PayloadAssembler::from_config(&state.config).assemble(upload)?;

    let raw = state.relay.relay(payload).await?;
    let reply = DownstreamReply::decode(&raw)?;

    dispatch(reply, session_id)
}

/// Plain `OPTIONS` requests that were not answered as CORS preflights.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
