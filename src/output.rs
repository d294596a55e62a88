//! Result types produced by a scan run.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The response was written to the output path.
    Written {
        response_len: usize,
        input_tokens: u32,
        output_tokens: u32,
    },
    /// The output already existed; no remote call was made.
    Skipped,
    /// Reading, the remote call, or the write failed.
    Failed { error: FileError },
}

/// Per-file record kept in [`ScanSummary::files`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub output_path: PathBuf,
    pub outcome: FileOutcome,
    pub duration_ms: u64,
}

impl FileReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, FileOutcome::Failed { .. })
    }
}

/// Aggregate of one run. Reporting only; per-file failures in directory mode
/// do not turn into an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub model: String,
    pub total_files: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_duration_ms: u64,
    pub files: Vec<FileReport>,
}

impl ScanSummary {
    pub(crate) fn new(model: &str, total_files: usize) -> Self {
        Self {
            model: model.to_string(),
            total_files,
            files: Vec::with_capacity(total_files),
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, report: FileReport) {
        match &report.outcome {
            FileOutcome::Written {
                input_tokens,
                output_tokens,
                ..
            } => {
                self.written += 1;
                self.total_input_tokens += u64::from(*input_tokens);
                self.total_output_tokens += u64::from(*output_tokens);
            }
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.files.push(report);
    }
}
