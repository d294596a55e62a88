//! Input resolution: turn the user's selection into the list of files to send.
//!
//! Single-file mode validates the one path up front so a typo fails fast.
//! Directory mode lists direct entries only (no recursion) and keeps every
//! regular file whose name ends in `.pdf`, in any letter case.

use crate::config::InputSelection;
use crate::error::OcrError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the selection to an ordered list of candidate files.
///
/// Directory results keep directory-scan order.
pub async fn resolve_inputs(selection: &InputSelection) -> Result<Vec<PathBuf>, OcrError> {
    match selection {
        InputSelection::File(path) => resolve_file(path).await.map(|p| vec![p]),
        InputSelection::Directory(dir) => resolve_directory(dir).await,
    }
}

/// Case-insensitive `.pdf` suffix check on the file name.
pub fn has_pdf_suffix(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(".pdf"))
        .unwrap_or(false)
}

async fn resolve_file(path: &Path) -> Result<PathBuf, OcrError> {
    let meta = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(_) => {
            return Err(OcrError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
    };

    if !meta.is_file() {
        return Err(OcrError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    if !has_pdf_suffix(path) {
        return Err(OcrError::NotAPdf {
            path: path.to_path_buf(),
        });
    }

    debug!("Resolved single file: {}", path.display());
    Ok(path.to_path_buf())
}

async fn resolve_directory(dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let is_dir = tokio::fs::metadata(dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(OcrError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let unreadable = |source| OcrError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut found = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        if !has_pdf_suffix(&path) {
            continue;
        }
        // `metadata` follows symlinks, so a link to a PDF counts.
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => found.push(path),
            Ok(_) => debug!("Ignoring non-file entry {}", path.display()),
            Err(e) => debug!("Ignoring unreadable entry {}: {}", path.display(), e),
        }
    }

    if found.is_empty() {
        return Err(OcrError::NoPdfsFound {
            path: dir.to_path_buf(),
        });
    }

    debug!("Found {} PDF files in {}", found.len(), dir.display());
    Ok(found)
}
