//! CLI binary for gemini-json-ocr.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `ScanConfig` and reports per-file results.

use anyhow::{Context, Result};
use clap::Parser;
use gemini_json_ocr::{
    scan_with_gemini, InputSelection, ProgressCallback, ScanConfig, ScanProgressCallback,
    ScanSummary, DEFAULT_MODEL,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar anchored at the bottom of the terminal
/// plus one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the file currently in flight.
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Spinner until the number of files is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Resolving inputs…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Scanning");
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ScanProgressCallback for CliProgressCallback {
    fn on_scan_start(&self, total_files: usize) {
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_files} PDF file(s)…"))
        ));
    }

    fn on_file_start(&self, path: &Path, _index: usize, _total_files: usize) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.bar.set_message(file_name(path));
    }

    fn on_file_skipped(&self, path: &Path, output: &Path) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {}  {}  {}",
            dim("↷"),
            file_name(path),
            dim(&format!("skipped, {} exists", output.display())),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_complete(&self, path: &Path, output: &Path, response_len: usize) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {}  →  {}  {}  {}",
            green("✓"),
            file_name(path),
            output.display(),
            dim(&format!("{response_len:>6} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, path: &Path, error: &str) {
        let secs = self.elapsed_secs();

        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 120 {
            format!("{}\u{2026}", error.chars().take(119).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {}  {}  {}",
            red("✗"),
            file_name(path),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_scan_complete(&self, written: usize, skipped: usize, failed: usize) {
        self.bar.finish_and_clear();

        let mark = if failed == 0 { green("✔") } else { cyan("⚠") };
        eprintln!(
            "{} {} written, {} skipped, {} failed",
            mark,
            bold(&written.to_string()),
            skipped,
            if failed == 0 {
                failed.to_string()
            } else {
                red(&failed.to_string())
            },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every PDF in a directory (non-recursive)
  gemini-json-ocr ./scans

  # Same, with the option form
  gemini-json-ocr --directory ./scans

  # A single file; writes invoice.pdf.json next to it
  gemini-json-ocr --file invoice.pdf

  # Regenerate outputs that already exist
  gemini-json-ocr --overwrite ./scans

  # Custom prompt and model
  GEMINI_MODEL=gemini-1.5-pro gemini-json-ocr --prompt ./prompts/receipts.txt ./receipts

OUTPUT:
  For every input <file>.pdf the raw JSON answer of the model is written to
  <file>.pdf.json. Existing outputs are skipped unless --overwrite is given,
  so an interrupted run can simply be started again.

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY      Gemini API key (required)
  GEMINI_MODEL        Model ID (default: gemini-2.0-flash-exp)
  GEMINI_OCR_PROMPT   Prompt file (default: prompt.txt next to the executable)
  DEBUG               Any non-empty value enables debug logging
  RUST_LOG            Full tracing filter override

  A .env file next to the executable is loaded at startup; variables that
  are already set take precedence.
"#;

/// Send PDF files to Google Gemini and write the JSON response next to each file.
#[derive(Parser, Debug)]
#[command(
    name = "gemini-json-ocr",
    version,
    about = "Process PDF files using Gemini and write <file>.json next to each input",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to directory containing PDFs.
    #[arg(value_name = "DIRECTORY")]
    directory: Option<PathBuf>,

    /// Path to directory containing PDFs (takes precedence over the positional form).
    #[arg(long = "directory", value_name = "DIRECTORY")]
    directory_opt: Option<PathBuf>,

    /// Process a single PDF file.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["directory", "directory_opt"])]
    file: Option<PathBuf>,

    /// Overwrite existing JSON files.
    #[arg(long)]
    overwrite: bool,

    /// Prompt file sent with every request.
    #[arg(long, value_name = "PATH", env = "GEMINI_OCR_PROMPT")]
    prompt: Option<PathBuf>,

    /// Gemini API key.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model ID.
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Gemini REST base URL (proxies, local test servers).
    #[arg(long, env = "GEMINI_API_BASE_URL", hide = true)]
    api_base_url: Option<String>,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DEBUG", value_parser = clap::builder::FalseyValueParser::new())]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// `--file`, else `--directory`, else the positional directory.
    fn input_selection(&self) -> Option<InputSelection> {
        if let Some(ref file) = self.file {
            return Some(InputSelection::File(file.clone()));
        }
        self.directory_opt
            .as_ref()
            .or(self.directory.as_ref())
            .map(|d| InputSelection::Directory(d.clone()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs when it is visible.
    let show_progress = !cli.quiet
        && !cli.no_progress
        && !cli.json
        && !cli.verbose
        && io::stderr().is_terminal();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut config = build_config(&cli)?;
    tracing::debug!("{:?}", config);

    let progress = show_progress.then(CliProgressCallback::new_dynamic);
    if let Some(ref cb) = progress {
        config.progress_callback = Some(Arc::clone(cb) as ProgressCallback);
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let result = scan_with_gemini(&config).await;
    if let Some(ref cb) = progress {
        cb.bar.finish_and_clear();
    }
    let summary = result.context("Scan failed")?;

    if cli.json {
        let json =
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        print_summary(&summary);
    }

    Ok(())
}

/// Map CLI args to `ScanConfig`.
fn build_config(cli: &Cli) -> Result<ScanConfig> {
    let mut builder = ScanConfig::builder()
        .maybe_input(cli.input_selection())
        .maybe_api_key(cli.api_key.clone())
        .model(cli.model.clone())
        .overwrite(cli.overwrite);

    if let Some(ref prompt) = cli.prompt {
        builder = builder.prompt_path(prompt);
    }
    if let Some(ref url) = cli.api_base_url {
        builder = builder.api_base_url(url.clone());
    }
    builder.build().context("Invalid configuration")
}

/// Load `.env` from the executable's directory, keeping variables already set.
fn load_dotenv() {
    let path = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|d| d.join(".env")));
    if let Some(path) = path.filter(|p| p.is_file()) {
        // Missing keys surface later through config validation.
        let _ = dotenv::from_path(&path);
    }
}

fn print_summary(summary: &ScanSummary) {
    eprintln!(
        "Processed {} file(s) in {}ms: {} written, {} skipped, {} failed",
        summary.total_files,
        summary.total_duration_ms,
        summary.written,
        summary.skipped,
        summary.failed
    );
    if summary.written > 0 {
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&summary.total_input_tokens.to_string()),
            dim(&summary.total_output_tokens.to_string()),
        );
    }
}
