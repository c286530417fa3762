use crate::api::error::AppError;
use crate::config::{PayloadMode, RelayConfig, RequiredText};
use crate::models::{ExtractedDocument, UploadRequest};
use crate::services::extractor::extract_documents;
use bytes::Bytes;

pub const DOCUMENTS_HEADER: &str = "\n\n--- UPLOADED DOCUMENTS ---\n";

#[derive(Debug, Clone)]
pub struct OutboundFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Body of the single downstream call.
#[derive(Debug, Clone)]
pub enum OutboundPayload {
    /// Text fields followed by raw file parts.
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<OutboundFile>,
    },
    /// One enriched text value plus the conversation metadata.
    Enriched {
        prompt: String,
        phase: String,
        session_id: Option<String>,
        clarification_response: Option<String>,
        documents: usize,
    },
}

impl OutboundPayload {
    pub fn mode(&self) -> PayloadMode {
        match self {
            OutboundPayload::Multipart { .. } => PayloadMode::Multipart,
            OutboundPayload::Enriched { .. } => PayloadMode::Enriched,
        }
    }
}

/// Rejects requests carrying no usable text under the given policy.
pub fn validate(request: &UploadRequest, policy: RequiredText) -> Result<(), AppError> {
    match policy {
        RequiredText::PromptOrClarification
            if !request.has_prompt() && !request.has_clarification() =>
        {
            Err(AppError::MissingPrompt(
                "Either prompt or clarificationResponse is required".to_string(),
            ))
        }
        RequiredText::PromptOnly if !request.has_prompt() => {
            Err(AppError::MissingPrompt("Prompt is required".to_string()))
        }
        _ => Ok(()),
    }
}

/// Appends one section per document to the prompt, in the given order.
pub fn enrich_prompt(prompt: &str, documents: &[ExtractedDocument]) -> String {
    let mut enriched = prompt.to_string();
    if documents.is_empty() {
        return enriched;
    }

    enriched.push_str(DOCUMENTS_HEADER);
    for (index, doc) in documents.iter().enumerate() {
        enriched.push_str(&format!(
            "\nDocument {}: {}\nContent:\n{}\n---\n",
            index + 1,
            doc.file_name,
            doc.content
        ));
    }
    enriched
}

#[derive(Debug, Clone)]
pub struct PayloadAssembler {
    mode: PayloadMode,
    required_text: RequiredText,
    documents_field: String,
    document_content_type: String,
}

impl PayloadAssembler {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            mode: config.payload_mode,
            required_text: config.required_text,
            documents_field: config.documents_field.clone(),
            document_content_type: config.document_content_type.clone(),
        }
    }

    /// Validates the collected upload and takes ownership of its buffers.
    pub fn assemble(&self, request: UploadRequest) -> Result<OutboundPayload, AppError> {
        validate(&request, self.required_text)?;

        let payload = match self.mode {
            PayloadMode::Multipart => self.reencode(request),
            PayloadMode::Enriched => {
                let documents = extract_documents(&request.attachments);
                OutboundPayload::Enriched {
                    prompt: enrich_prompt(&request.prompt, &documents),
                    phase: request.phase,
                    session_id: request.session_id.filter(|v| !v.is_empty()),
                    clarification_response: request
                        .clarification_response
                        .filter(|v| !v.is_empty()),
                    documents: documents.len(),
                }
            }
        };

        Ok(payload)
    }

    fn reencode(&self, request: UploadRequest) -> OutboundPayload {
        let mut fields = Vec::with_capacity(4);
        let text_fields = [
            ("prompt", Some(request.prompt)),
            ("phase", Some(request.phase)),
            ("sessionId", request.session_id),
            ("clarificationResponse", request.clarification_response),
        ];
        for (name, value) in text_fields {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                fields.push((name.to_string(), value));
            }
        }

        let files = request
            .attachments
            .into_iter()
            .map(|file| OutboundFile {
                field_name: self.documents_field.clone(),
                file_name: file.file_name,
                content_type: self.document_content_type.clone(),
                bytes: file.bytes,
            })
            .collect();

        OutboundPayload::Multipart { fields, files }
    }
}
