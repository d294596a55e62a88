//! Run driver: resolve inputs, then skip, invoke and write each file in turn.
//!
//! ```text
//! Init ──▶ ResolveInputs ──▶ per file: Skip | Invoke → Write | Error ──▶ Done
//! ```
//!
//! Files are processed strictly one after another; each remote call is awaited
//! before the next file is looked at. In directory mode every file stands on
//! its own and failures are only reported. In single-file mode the outcome of
//! the one file is the outcome of the run.

use crate::config::{InputSelection, ScanConfig};
use crate::error::OcrError;
use crate::output::{FileOutcome, FileReport, ScanSummary};
use crate::pipeline::llm::{self, GeminiClient, GenerativeModel};
use crate::pipeline::{input, write};
use crate::prompts::load_prompt;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// Run a scan with the production Gemini client.
///
/// # Example
/// ```rust,no_run
/// use gemini_json_ocr::{scan_with_gemini, InputSelection, ScanConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ScanConfig::builder()
///     .api_key(std::env::var("GOOGLE_API_KEY")?)
///     .input(InputSelection::Directory("scans".into()))
///     .prompt_path("prompt.txt")
///     .build()?;
/// let summary = scan_with_gemini(&config).await?;
/// eprintln!("{} written, {} skipped, {} failed", summary.written, summary.skipped, summary.failed);
/// # Ok(())
/// # }
/// ```
pub async fn scan_with_gemini(config: &ScanConfig) -> Result<ScanSummary, OcrError> {
    let client = GeminiClient::from_config(config)?;
    scan(config, &client).await
}

/// Run a scan against any [`GenerativeModel`].
///
/// # Errors
/// Fatal conditions only: missing prompt, bad input path, no PDFs found, and
/// in single-file mode a failure of that file. Per-file failures in directory
/// mode are recorded in the returned summary instead.
pub async fn scan<M: GenerativeModel>(
    config: &ScanConfig,
    model: &M,
) -> Result<ScanSummary, OcrError> {
    let total_start = Instant::now();

    // ── Init ─────────────────────────────────────────────────────────────
    let prompt = load_prompt(&config.prompt_path).await?;

    // ── Resolve inputs ───────────────────────────────────────────────────
    let files = input::resolve_inputs(&config.input).await?;
    let total = files.len();
    match &config.input {
        InputSelection::Directory(dir) => {
            info!("Found {} PDF files in {}", total, dir.display())
        }
        InputSelection::File(path) => info!("Processing single file {}", path.display()),
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_scan_start(total);
    }

    // ── Per file ─────────────────────────────────────────────────────────
    let mut summary = ScanSummary::new(model.model_name(), total);
    for (i, path) in files.iter().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(path, i + 1, total);
        }
        let report = process_one(model, path, &prompt, config).await;
        summary.record(report);
    }

    summary.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Scan complete: {} written, {} skipped, {} failed, {}ms",
        summary.written, summary.skipped, summary.failed, summary.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_scan_complete(summary.written, summary.skipped, summary.failed);
    }

    // ── Done ─────────────────────────────────────────────────────────────
    if config.input.is_single_file() {
        if let Some(FileOutcome::Failed { error }) = summary.files.first().map(|r| &r.outcome) {
            return Err(OcrError::FileFailed(error.clone()));
        }
    }

    Ok(summary)
}

/// Skip, or invoke the model and write the response, for one file.
async fn process_one<M: GenerativeModel>(
    model: &M,
    path: &Path,
    prompt: &str,
    config: &ScanConfig,
) -> FileReport {
    let start = Instant::now();
    let output_path = write::output_path_for(path);
    let name = display_name(path);

    let outcome = if write::should_skip(&output_path, config.overwrite).await {
        info!(
            "Skipping {} as {} already exists. Use --overwrite to overwrite.",
            name,
            output_path.display()
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_skipped(path, &output_path);
        }
        FileOutcome::Skipped
    } else {
        info!("Processing file: {}", name);
        let result = match llm::process_file(model, path, prompt).await {
            Ok(response) => write::write_response(path, &output_path, &response.text)
                .await
                .map(|()| response),
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => {
                info!(
                    "Results for {} have been written to {}",
                    name,
                    output_path.display()
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_complete(path, &output_path, response.text.len());
                }
                FileOutcome::Written {
                    response_len: response.text.len(),
                    input_tokens: response.input_tokens,
                    output_tokens: response.output_tokens,
                }
            }
            Err(error) => {
                error!("{}", error);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_error(path, &error.to_string());
                }
                FileOutcome::Failed { error }
            }
        }
    };

    FileReport {
        path: path.to_path_buf(),
        output_path,
        outcome,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
