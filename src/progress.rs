//! Progress-callback trait for per-file scan events.
//!
//! Inject an [`Arc<dyn ScanProgressCallback>`] via
//! [`crate::config::ScanConfigBuilder::progress_callback`] to receive events
//! as the driver works through the resolved files. The binary uses it to
//! drive a terminal progress bar; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use gemini_json_ocr::{InputSelection, ScanConfig, ScanProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ScanProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, path: &Path, _output: &Path, response_len: usize) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} done ({} bytes)", path.display(), response_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { written: AtomicUsize::new(0) });
//!
//! let config = ScanConfig::builder()
//!     .api_key("key")
//!     .input(InputSelection::Directory("scans".into()))
//!     .progress_callback(counter as Arc<dyn ScanProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the run driver as it processes each file.
///
/// Files are handled one at a time, so events never overlap; the trait is
/// still `Send + Sync` so implementations can be shared with other threads.
/// All methods default to no-ops.
pub trait ScanProgressCallback: Send + Sync {
    /// Called once after the inputs are resolved.
    fn on_scan_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is looked at.
    ///
    /// `index` is 1-based.
    fn on_file_start(&self, path: &Path, index: usize, total_files: usize) {
        let _ = (path, index, total_files);
    }

    /// Called when the output already exists and overwrite is off.
    fn on_file_skipped(&self, path: &Path, output: &Path) {
        let _ = (path, output);
    }

    /// Called after the response was written.
    fn on_file_complete(&self, path: &Path, output: &Path, response_len: usize) {
        let _ = (path, output, response_len);
    }

    /// Called when reading, the remote call, or the write failed.
    fn on_file_error(&self, path: &Path, error: &str) {
        let _ = (path, error);
    }

    /// Called once after every file has been attempted.
    fn on_scan_complete(&self, written: usize, skipped: usize, failed: usize) {
        let _ = (written, skipped, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ScanProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ScanConfig`].
pub type ProgressCallback = Arc<dyn ScanProgressCallback>;
