use crate::models::{ExtractedDocument, UploadedFile};
use std::path::Path;

/// Extensions whose bytes are passed through as UTF-8 text.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "json", "csv"];

/// Best-effort text for a document. Recognized text formats are decoded
/// verbatim; everything else becomes a placeholder naming the file and size.
pub fn extract(file_name: &str, bytes: &[u8]) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    if !TEXT_EXTENSIONS.contains(&extension.as_str()) {
        return format!(
            "[File: {} ({} bytes) - Content extraction not available for this file type]",
            file_name,
            bytes.len()
        );
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::warn!("Could not decode {} as UTF-8: {}", file_name, e);
            format!("[File: {} - Error reading file content]", file_name)
        }
    }
}

pub fn extract_documents(files: &[UploadedFile]) -> Vec<ExtractedDocument> {
    files
        .iter()
        .map(|file| ExtractedDocument {
            file_name: file.file_name.clone(),
            content: extract(&file.file_name, &file.bytes),
        })
        .collect()
}
