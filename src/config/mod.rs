use std::env;
use std::time::Duration;

/// Shape of the body sent to the downstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    /// Re-encode fields and raw file bytes as multipart/form-data
    Multipart,
    /// Fold extracted document text into a single prompt value
    Enriched,
}

impl PayloadMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "multipart" | "reencode" | "re-encode" => Some(Self::Multipart),
            "enriched" | "enrich" | "text" => Some(Self::Enriched),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Multipart => "multipart",
            Self::Enriched => "enriched",
        }
    }
}

/// HTTP method used to carry an enriched payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichedMethod {
    /// JSON body
    Post,
    /// Query parameters
    Get,
}

impl EnrichedMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "post" => Some(Self::Post),
            "get" => Some(Self::Get),
            _ => None,
        }
    }
}

/// Which text fields must be present before anything is relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredText {
    PromptOrClarification,
    PromptOnly,
}

impl RequiredText {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "prompt-or-clarification" | "either" => Some(Self::PromptOrClarification),
            "prompt-only" | "prompt" => Some(Self::PromptOnly),
            _ => None,
        }
    }
}

/// Relay gateway configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Downstream endpoint receiving every relayed request
    pub relay_url: String,

    /// Outbound payload shape (default: multipart)
    pub payload_mode: PayloadMode,

    /// Method for enriched payloads (default: POST)
    pub enriched_method: EnrichedMethod,

    /// Required-field policy (default: prompt or clarificationResponse)
    pub required_text: RequiredText,

    /// Maximum size of a single uploaded file in bytes (default: 10 MB)
    pub max_file_size: usize,

    /// Maximum number of files per request (default: 5)
    pub max_files: usize,

    /// Deadline for the whole multipart upload (default: 30 s)
    pub upload_timeout: Duration,

    /// Deadline for the downstream call (default: 800 s)
    pub relay_timeout: Duration,

    /// Field name files are re-attached under (default: "documents")
    pub documents_field: String,

    /// Content type declared for re-attached files (default: "application/pdf")
    pub document_content_type: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://127.0.0.1:5678/webhook/relay".to_string(),
            payload_mode: PayloadMode::Multipart,
            enriched_method: EnrichedMethod::Post,
            required_text: RequiredText::PromptOrClarification,
            max_file_size: 10 * 1024 * 1024, // 10 MB
            max_files: 5,
            upload_timeout: Duration::from_secs(30),
            relay_timeout: Duration::from_secs(800),
            documents_field: "documents".to_string(),
            document_content_type: "application/pdf".to_string(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            relay_url: env::var("RELAY_URL").unwrap_or(default.relay_url),

            payload_mode: env::var("PAYLOAD_MODE")
                .ok()
                .and_then(|v| PayloadMode::parse(&v))
                .unwrap_or(default.payload_mode),

            enriched_method: env::var("ENRICHED_METHOD")
                .ok()
                .and_then(|v| EnrichedMethod::parse(&v))
                .unwrap_or(default.enriched_method),

            required_text: env::var("REQUIRED_TEXT")
                .ok()
                .and_then(|v| RequiredText::parse(&v))
                .unwrap_or(default.required_text),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            max_files: env::var("MAX_FILES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_files),

            upload_timeout: env::var("UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.upload_timeout),

            relay_timeout: env::var("RELAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.relay_timeout),

            documents_field: env::var("DOCUMENTS_FIELD").unwrap_or(default.documents_field),

            document_content_type: env::var("DOCUMENT_CONTENT_TYPE")
                .unwrap_or(default.document_content_type),
        }
    }

    /// Create config for local development (short relay timeout, enriched payloads)
    pub fn development() -> Self {
        Self {
            relay_url: "http://127.0.0.1:5678/webhook-test/relay".to_string(),
            payload_mode: PayloadMode::Enriched,
            relay_timeout: Duration::from_secs(60),
            ..Self::default()
        }
    }

    /// Upper bound on the whole request body: every file at its ceiling plus
    /// 1 MB of multipart framing and text fields.
    pub fn max_body_size(&self) -> usize {
        self.max_files * self.max_file_size + 1024 * 1024
    }
}
