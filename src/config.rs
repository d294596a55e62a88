//! Configuration types for a scan run.
//!
//! Everything the run needs is captured once in [`ScanConfig`], built via
//! [`ScanConfigBuilder`]. The binary reads the environment and CLI flags and
//! hands the finished config to [`crate::scan::scan`]; the library itself never
//! consults process-wide state.

use crate::error::OcrError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Value shipped in sample `.env` files; treated the same as an unset key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// File name of the prompt looked up next to the executable.
pub const DEFAULT_PROMPT_FILE: &str = "prompt.txt";

/// Base URL of the Gemini REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Which files a run works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSelection {
    /// Every `.pdf` directly inside a directory.
    Directory(PathBuf),
    /// Exactly one file.
    File(PathBuf),
}

impl InputSelection {
    pub fn is_single_file(&self) -> bool {
        matches!(self, InputSelection::File(_))
    }
}

/// Configuration for one scan run.
///
/// # Example
/// ```rust
/// use gemini_json_ocr::{InputSelection, ScanConfig};
///
/// let config = ScanConfig::builder()
///     .api_key("AIza-example")
///     .input(InputSelection::Directory("scans".into()))
///     .overwrite(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-2.0-flash-exp");
/// ```
#[derive(Clone)]
pub struct ScanConfig {
    /// Gemini API key. Never printed by `Debug`.
    pub api_key: String,

    /// Gemini model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Base URL the client posts to. Default: [`DEFAULT_API_BASE_URL`].
    pub api_base_url: String,

    /// Directory or single file to process.
    pub input: InputSelection,

    /// Regenerate outputs that already exist. Default: false.
    pub overwrite: bool,

    /// Prompt file sent with every request.
    pub prompt_path: PathBuf,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("input", &self.input)
            .field("overwrite", &self.overwrite)
            .field("prompt_path", &self.prompt_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ScanProgressCallback>"),
            )
            .finish()
    }
}

impl ScanConfig {
    /// Create a new builder for `ScanConfig`.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }
}

/// Builder for [`ScanConfig`].
#[derive(Default)]
pub struct ScanConfigBuilder {
    api_key: Option<String>,
    model: Option<String>,
    api_base_url: Option<String>,
    input: Option<InputSelection>,
    overwrite: bool,
    prompt_path: Option<PathBuf>,
    progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ScanConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfigBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("input", &self.input)
            .field("overwrite", &self.overwrite)
            .field("prompt_path", &self.prompt_path)
            .finish()
    }
}

impl ScanConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Accepts an optional key so CLI/env values can be passed straight through.
    pub fn maybe_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn input(mut self, input: InputSelection) -> Self {
        self.input = Some(input);
        self
    }

    pub fn maybe_input(mut self, input: Option<InputSelection>) -> Self {
        self.input = input;
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.overwrite = v;
        self
    }

    pub fn prompt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompt_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Checks run in the order a user would fix them: input selection first,
    /// then the API key. Neither check touches the filesystem.
    pub fn build(self) -> Result<ScanConfig, OcrError> {
        let input = self.input.ok_or(OcrError::NoInputSpecified)?;

        let api_key = match self.api_key {
            Some(k) if is_usable_api_key(&k) => k.trim().to_string(),
            _ => return Err(OcrError::MissingApiKey),
        };

        let model = match self.model {
            Some(m) if m.trim().is_empty() => {
                return Err(OcrError::InvalidConfig("model name must not be empty".into()))
            }
            Some(m) => m.trim().to_string(),
            None => DEFAULT_MODEL.to_string(),
        };

        Ok(ScanConfig {
            api_key,
            model,
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            input,
            overwrite: self.overwrite,
            prompt_path: self.prompt_path.unwrap_or_else(default_prompt_path),
            progress_callback: self.progress_callback,
        })
    }
}

/// True when the key is non-empty and not the sample placeholder.
pub fn is_usable_api_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

/// `prompt.txt` in the directory holding the running executable.
///
/// Falls back to the working directory when the executable path is unknown.
pub fn default_prompt_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(DEFAULT_PROMPT_FILE)
}
