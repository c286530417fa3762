use crate::AppState;
use crate::api::error::AppError;
use crate::config::RequiredText;
use crate::models::{EnhanceResponse, ErrorBody};
use crate::services::collector::receive_upload;
use crate::services::extractor::extract_documents;
use crate::services::payload::{enrich_prompt, validate};
use axum::{
    Json,
    extract::{Request, State},
};

/// Builds the enriched prompt and hands it back to the caller instead of
/// relaying it, so a client can inspect or forward it itself.
#[utoipa::path(
    post,
    path = "/api/enhance",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "Field prompt plus up to 5 documents"
    ),
    responses(
        (status = 200, description = "Prompt enriched with document text", body = EnhanceResponse),
        (status = 400, description = "Prompt missing", body = ErrorBody),
        (status = 500, description = "Upload failure", body = ErrorBody)
    ),
    tag = "relay"
)]
pub async fn enhance_upload(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<EnhanceResponse>, AppError> {
    let upload = receive_upload(req, &state.config).await?;
    validate(&upload, RequiredText::PromptOnly)?;

    let documents = extract_documents(&upload.attachments);
    let enhanced_prompt = enrich_prompt(&upload.prompt, &documents);
    tracing::info!(
        "📝 Enhanced prompt built from {} document(s), {} chars",
        documents.len(),
        enhanced_prompt.len()
    );

    Ok(Json(EnhanceResponse {
        enhanced_prompt,
        files_processed: documents.len(),
        original_prompt: upload.prompt,
    }))
}
