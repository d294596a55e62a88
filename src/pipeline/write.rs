//! Result writer and skip policy.
//!
//! The output lives next to its input with `.json` appended to the full file
//! name, so `report.pdf` becomes `report.pdf.json`. The presence of that file
//! is the only state carried between runs: it is what makes a second run skip
//! work already done.

use crate::error::FileError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `<path>.json`, appended rather than replacing the extension.
pub fn output_path_for(path: &Path) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    os.push(".json");
    PathBuf::from(os)
}

/// True when `output` exists and `overwrite` is off.
pub async fn should_skip(output: &Path, overwrite: bool) -> bool {
    if overwrite {
        return false;
    }
    tokio::fs::try_exists(output).await.unwrap_or(false)
}

/// Write the response verbatim, replacing any previous content.
pub async fn write_response(source: &Path, output: &Path, text: &str) -> Result<(), FileError> {
    tokio::fs::write(output, text)
        .await
        .map_err(|e| FileError::WriteFailed {
            path: source.to_path_buf(),
            output: output.to_path_buf(),
            detail: e.to_string(),
        })?;
    debug!("Wrote {} bytes to {}", text.len(), output.display());
    Ok(())
}
