//! Binary-level tests for the paths that never reach the network: argument
//! handling, configuration errors, input errors and skip behaviour.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("gemini-json-ocr").unwrap();
    for var in [
        "GOOGLE_API_KEY",
        "GEMINI_MODEL",
        "GEMINI_OCR_PROMPT",
        "GEMINI_API_BASE_URL",
        "DEBUG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Temp dir holding `prompt.txt` and an empty `scans/` directory.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("prompt.txt"), "Extract all fields as JSON.").unwrap();
    fs::create_dir(dir.path().join("scans")).unwrap();
    dir
}

fn prompt(ws: &TempDir) -> std::path::PathBuf {
    ws.path().join("prompt.txt")
}

fn scans(ws: &TempDir) -> std::path::PathBuf {
    ws.path().join("scans")
}

fn write_pdf(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"%PDF-1.4\n%%EOF\n").unwrap();
}

#[test]
fn help_lists_options() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--file"))
        .stdout(predicate::str::contains("--directory"))
        .stdout(predicate::str::contains("--overwrite"));
}

#[test]
fn no_input_is_a_usage_error() {
    cmd()
        .env("GOOGLE_API_KEY", "test-key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input specified"));
}

#[test]
fn file_and_directory_conflict() {
    let ws = workspace();
    write_pdf(&scans(&ws), "a.pdf");
    cmd()
        .env("GOOGLE_API_KEY", "test-key")
        .arg(scans(&ws))
        .arg("--file")
        .arg(scans(&ws).join("a.pdf"))
        .assert()
        .failure();
}

#[test]
fn missing_api_key_aborts_before_inputs() {
    let ws = workspace();
    write_pdf(&scans(&ws), "a.pdf");

    cmd()
        .arg("--prompt")
        .arg(prompt(&ws))
        .arg(scans(&ws))
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOOGLE_API_KEY"));

    assert!(!scans(&ws).join("a.pdf.json").exists());
}

#[test]
fn placeholder_api_key_is_rejected() {
    let ws = workspace();
    cmd()
        .env("GOOGLE_API_KEY", "YOUR_API_KEY")
        .arg("--prompt")
        .arg(prompt(&ws))
        .arg(scans(&ws))
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOOGLE_API_KEY"));
}

#[test]
fn missing_prompt_is_fatal() {
    let ws = workspace();
    write_pdf(&scans(&ws), "a.pdf");

    cmd()
        .env("GOOGLE_API_KEY", "test-key")
        .arg("--prompt")
        .arg(ws.path().join("nope.txt"))
        .arg(scans(&ws))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found or is not a file"));
}

#[test]
fn empty_directory_reports_no_pdfs() {
    let ws = workspace();
    fs::write(scans(&ws).join("notes.txt"), "x").unwrap();

    cmd()
        .env("GOOGLE_API_KEY", "test-key")
        .arg("--prompt")
        .arg(prompt(&ws))
        .arg(scans(&ws))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF files found"));
}

#[test]
fn missing_directory_is_fatal() {
    let ws = workspace();
    cmd()
        .env("GOOGLE_API_KEY", "test-key")
        .arg("--prompt")
        .arg(prompt(&ws))
        .arg("--directory")
        .arg(ws.path().join("does-not-exist"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found or is not a directory"));
}

#[test]
fn single_file_not_found_writes_nothing() {
    let ws = workspace();
    let ghost = scans(&ws).join("ghost.pdf");

    cmd()
        .env("GOOGLE_API_KEY", "test-key")
        .arg("--prompt")
        .arg(prompt(&ws))
        .arg("--file")
        .arg(&ghost)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    assert!(!scans(&ws).join("ghost.pdf.json").exists());
}

#[test]
fn single_file_wrong_extension() {
    let ws = workspace();
    let txt = scans(&ws).join("notes.txt");
    fs::write(&txt, "x").unwrap();

    cmd()
        .env("GOOGLE_API_KEY", "test-key")
        .arg("--prompt")
        .arg(prompt(&ws))
        .arg("--file")
        .arg(&txt)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a PDF"));
}

#[test]
fn single_file_existing_output_is_skipped_and_unchanged() {
    let ws = workspace();
    write_pdf(&scans(&ws), "a.pdf");
    let out = scans(&ws).join("a.pdf.json");
    let previous = "{\"total\": \"12.50\"}\n";
    fs::write(&out, previous).unwrap();

    cmd()
        .env("GOOGLE_API_KEY", "test-key")
        .arg("--prompt")
        .arg(prompt(&ws))
        .arg("--file")
        .arg(scans(&ws).join("a.pdf"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping a.pdf"));

    assert_eq!(fs::read_to_string(&out).unwrap(), previous);
}

#[test]
fn all_skipped_directory_run_succeeds_with_json_summary() {
    let ws = workspace();
    write_pdf(&scans(&ws), "a.pdf");
    write_pdf(&scans(&ws), "B.PDF");
    fs::write(scans(&ws).join("a.pdf.json"), "{}").unwrap();
    fs::write(scans(&ws).join("B.PDF.json"), "{}").unwrap();

    let output = cmd()
        .env("GOOGLE_API_KEY", "test-key")
        .env("GEMINI_MODEL", "gemini-test-model")
        .arg("--prompt")
        .arg(prompt(&ws))
        .arg("--json")
        .arg("--directory")
        .arg(scans(&ws))
        .output()
        .unwrap();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total_files"], 2);
    assert_eq!(summary["skipped"], 2);
    assert_eq!(summary["written"], 0);
    assert_eq!(summary["model"], "gemini-test-model");
}

#[test]
fn quiet_directory_run_still_reports_failed_files() {
    let ws = workspace();
    write_pdf(&scans(&ws), "a.pdf");

    // Nothing listens on port 1, so the remote call fails with a refused connection.
    cmd()
        .env("GOOGLE_API_KEY", "test-key")
        .arg("-q")
        .arg("--prompt")
        .arg(prompt(&ws))
        .arg("--api-base-url")
        .arg("http://127.0.0.1:1/v1beta/models")
        .arg(scans(&ws))
        .assert()
        .success()
        .stderr(predicate::str::contains("Error processing"))
        .stderr(predicate::str::contains("a.pdf"))
        .stderr(predicate::str::contains("remote invocation failed"));

    assert!(!scans(&ws).join("a.pdf.json").exists());
}
