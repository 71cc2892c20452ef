use std::{fs, path::Path};

use thiserror::Error;

/// Upload cap, matching what the extraction endpoint will accept.
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// User-facing rejection, raised before the AI collaborator is ever
/// invoked. No state is mutated on any of these paths.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported file type for `{0}` – use JPG, PNG, WEBP or PDF")]
    Unsupported(String),
    #[error("file too large ({size} bytes, max {MAX_UPLOAD_BYTES})")]
    TooLarge { size: u64 },
    #[error("could not read `{path}`: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A validated document ready for extraction.
pub struct Upload {
    pub mime: &'static str,
    pub data: Vec<u8>,
}

/// Sniffs the document type from magic bytes, falling back to the file
/// extension for short or ambiguous content.
fn sniff_mime(data: &[u8], path: &Path) -> Option<&'static str> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some("image/png");
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && data[8..12] == *b"WEBP" {
        return Some("image/webp");
    }
    if data.starts_with(b"%PDF") {
        return Some("application/pdf");
    }

    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        Some("png") => Some("image/png"),
        Some("webp") => Some("image/webp"),
        Some("pdf") => Some("application/pdf"),
        _ => None,
    }
}

/// Validates and loads a document for scanning. The size check runs on
/// file metadata so an oversized file is rejected without reading it.
pub fn load_upload(path: &Path) -> Result<Upload, ValidationError> {
    let meta = fs::metadata(path).map_err(|source| ValidationError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    if meta.len() > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge { size: meta.len() });
    }

    let data = fs::read(path).map_err(|source| ValidationError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    match sniff_mime(&data, path) {
        Some(mime) => Ok(Upload { mime, data }),
        None => Err(ValidationError::Unsupported(path.display().to_string())),
    }
}
