//! Upload checks and text extraction.
//!
//! Only plain text is decoded here. PDF and word-processing uploads pass
//! validation but need an external extractor.

use crate::error::{ExtractionError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Default upload limit: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Upload formats accepted by the submission workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Doc,
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Check that `path` is an accepted format within the size limit.
pub fn validate_upload(path: &Path, max_bytes: u64) -> Result<DocumentFormat> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| ExtractionError::UnsupportedFormat(path.display().to_string()))?;
    let size = fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(ExtractionError::TooLarge {
            size,
            limit: max_bytes,
        }
        .into());
    }
    Ok(format)
}

/// Validate an upload and return its text.
pub fn extract_text(path: &Path, max_bytes: u64) -> Result<String> {
    let format = validate_upload(path, max_bytes)?;
    if format != DocumentFormat::PlainText {
        return Err(ExtractionError::UnsupportedFormat(format!(
            "{:?} extraction is not available for {}",
            format,
            path.display()
        ))
        .into());
    }
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| ExtractionError::Decode)?;
    if text.trim().is_empty() {
        return Err(ExtractionError::NoText(path.display().to_string()).into());
    }
    debug!(path = %path.display(), bytes = text.len(), "extracted plain text");
    Ok(text)
}
