//! # gemini-json-ocr
//!
//! Send PDF files to Google Gemini for OCR and structured extraction, and
//! write the model's JSON answer next to each input as `<file>.json`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file or directory
//!  │
//!  ├─ 1. Input   one explicit PDF, or every *.pdf directly inside a directory
//!  ├─ 2. Skip    existing <file>.json and no --overwrite → no remote call
//!  ├─ 3. Encode  bytes → base64 inline document + MIME type
//!  ├─ 4. Model   one generateContent call, response forced to application/json
//!  └─ 5. Output  response text written verbatim to <file>.json
//! ```
//!
//! Files are processed one at a time. The response is written through as-is;
//! it is not parsed or validated.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemini_json_ocr::{scan_with_gemini, InputSelection, ScanConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::builder()
//!         .maybe_api_key(std::env::var("GOOGLE_API_KEY").ok())
//!         .input(InputSelection::File("invoice.pdf".into()))
//!         .prompt_path("prompt.txt")
//!         .build()?;
//!     let summary = scan_with_gemini(&config).await?;
//!     eprintln!("{} tokens in / {} out", summary.total_input_tokens, summary.total_output_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gemini-json-ocr` binary (clap + anyhow + tracing-subscriber + indicatif + dotenv) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod scan;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{InputSelection, ScanConfig, ScanConfigBuilder, DEFAULT_MODEL, PLACEHOLDER_API_KEY};
pub use error::{FileError, OcrError, RemoteError};
pub use output::{FileOutcome, FileReport, ScanSummary};
pub use pipeline::llm::{GeminiClient, GenerativeModel, ModelResponse};
pub use progress::{NoopProgressCallback, ProgressCallback, ScanProgressCallback};
pub use scan::{scan, scan_with_gemini};
