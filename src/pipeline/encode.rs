//! Document encoding: raw file bytes → base64 inline payload.
//!
//! Gemini accepts small documents inline in the JSON request body as base64
//! data tagged with a MIME type, so no separate upload step is needed.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// MIME type used when the extension is unknown.
pub const FALLBACK_MIME_TYPE: &str = "application/pdf";

/// File bytes ready to embed in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineDocument {
    pub mime_type: String,
    /// Base64 (standard alphabet, padded).
    pub data: String,
}

impl InlineDocument {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        let data = STANDARD.encode(bytes);
        debug!("Encoded document → {} bytes base64", data.len());
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// Guess a MIME type from the file extension.
pub fn infer_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        "md" => "text/markdown",
        _ => return None,
    };
    Some(mime)
}

/// [`infer_mime_type`], defaulting to [`FALLBACK_MIME_TYPE`].
pub fn mime_type_for(path: &Path) -> &'static str {
    infer_mime_type(path).unwrap_or(FALLBACK_MIME_TYPE)
}
