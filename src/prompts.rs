//! Prompt loading.
//!
//! The extraction instructions live in a plain-text file (by default
//! `prompt.txt` next to the executable) so they can be tuned without a
//! rebuild. The prompt is loaded once per run and sent unchanged with every
//! request.

use crate::error::OcrError;
use std::path::Path;
use tracing::debug;

/// Read the prompt file, trimming surrounding whitespace.
///
/// A missing path, or one that is not a regular file, is fatal.
pub async fn load_prompt(path: &Path) -> Result<String, OcrError> {
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(OcrError::PromptNotFound {
            path: path.to_path_buf(),
        });
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| OcrError::PromptUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let prompt = text.trim().to_string();
    debug!("Loaded prompt from {} ({} chars)", path.display(), prompt.len());
    Ok(prompt)
}
