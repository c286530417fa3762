use bytes::Bytes;
use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PHASE: &str = "initial";

/// Everything the collector gathered from one inbound multipart request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub prompt: String,
    pub phase: String,
    pub session_id: Option<String>,
    pub clarification_response: Option<String>,
    pub attachments: Vec<UploadedFile>,
}

impl Default for UploadRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            phase: DEFAULT_PHASE.to_string(),
            session_id: None,
            clarification_response: None,
            attachments: Vec::new(),
        }
    }
}

impl UploadRequest {
    pub fn has_prompt(&self) -> bool {
        !self.prompt.is_empty()
    }

    pub fn has_clarification(&self) -> bool {
        self.clarification_response
            .as_deref()
            .is_some_and(|v| !v.is_empty())
    }
}

/// A sealed attachment. The buffer is frozen once the file's last chunk arrived.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub file_name: String,
    pub content: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationBody {
    pub phase: String,
    #[schema(value_type = Object)]
    pub questions: serde_json::Value,
    pub session_id: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    pub enhanced_prompt: String,
    pub files_processed: usize,
    pub original_prompt: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
