//! Error types for the gemini-json-ocr library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`OcrError`] — **Fatal**: the run cannot proceed at all (no API key,
//!   missing prompt, bad input path, empty directory). Returned as
//!   `Err(OcrError)` from [`crate::scan::scan`].
//!
//! * [`FileError`] — **Non-fatal**: a single file failed (unreadable, remote
//!   call rejected, output not writable) but its siblings are fine. Stored in
//!   [`crate::output::FileReport`] so a directory run keeps going. In
//!   single-file mode it is promoted to [`OcrError::FileFailed`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the gemini-json-ocr library.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// Neither a directory nor a single file was selected.
    #[error("No input specified.\nPass a directory (positional or --directory) or --file <FILE>.")]
    NoInputSpecified,

    /// `GOOGLE_API_KEY` is unset, empty, or still the placeholder value.
    #[error("GOOGLE_API_KEY environment variable is not set.\nExport a Gemini API key or add it to .env.")]
    MissingApiKey,

    /// The prompt file does not exist or is not a regular file.
    #[error("Prompt '{path}' not found or is not a file.")]
    PromptNotFound { path: PathBuf },

    /// The prompt file exists but could not be read as UTF-8 text.
    #[error("Failed to read prompt '{path}': {source}")]
    PromptUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Single-file mode: the path does not exist.
    #[error("File '{path}' not found.")]
    FileNotFound { path: PathBuf },

    /// Single-file mode: the path exists but is not a regular file.
    #[error("'{path}' is not a regular file.")]
    NotAFile { path: PathBuf },

    /// Single-file mode: the file does not carry a `.pdf` suffix.
    #[error("File '{path}' is not a PDF (expected a .pdf extension).")]
    NotAPdf { path: PathBuf },

    /// Directory mode: the path does not exist or is not a directory.
    #[error("Directory '{path}' not found or is not a directory")]
    DirectoryNotFound { path: PathBuf },

    /// Directory mode: listing the directory failed.
    #[error("Failed to read directory '{path}': {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory mode: no direct entry ends in `.pdf`.
    #[error("No PDF files found in directory '{path}'")]
    NoPdfsFound { path: PathBuf },

    // ── Remote client errors ──────────────────────────────────────────────
    /// The HTTP client could not be constructed.
    #[error("Failed to initialise Gemini client: {0}")]
    ClientInit(String),

    // ── Single-file outcome ───────────────────────────────────────────────
    /// Single-file mode: the one file failed.
    #[error(transparent)]
    FileFailed(#[from] FileError),
}

/// A non-fatal error for a single file.
///
/// Directory runs log it and move on to the next file.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The input bytes could not be read.
    #[error("Error processing {path}: read failed: {detail}")]
    ReadFailed { path: PathBuf, detail: String },

    /// The remote model call failed: network, HTTP status, quota, malformed
    /// or empty response.
    #[error("Error processing {path}: remote invocation failed: {cause}")]
    RemoteInvocationFailed { path: PathBuf, cause: String },

    /// The `<input>.json` file could not be written.
    #[error("Error processing {path}: failed to write '{output}': {detail}")]
    WriteFailed {
        path: PathBuf,
        output: PathBuf,
        detail: String,
    },
}

/// Failure of a single remote model call, with a human-readable cause.
///
/// Network errors, HTTP error statuses, quota rejections, undecodable bodies
/// and empty answers all collapse into this one kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct RemoteError(pub String);

impl FileError {
    /// The input file this error belongs to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            FileError::ReadFailed { path, .. }
            | FileError::RemoteInvocationFailed { path, .. }
            | FileError::WriteFailed { path, .. } => path,
        }
    }
}
