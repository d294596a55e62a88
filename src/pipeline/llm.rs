//! Remote model interaction: one `generateContent` call per file.
//!
//! [`GenerativeModel`] is the seam between the run driver and the network.
//! [`GeminiClient`] talks to the Gemini REST API; tests swap in a fake that
//! records calls. The request carries the prompt, the inline document and a
//! directive that the answer must be `application/json`. The answer is
//! returned as raw text and never parsed here.
//!
//! No retries and no client-side timeout: a failed call is reported once and
//! the driver moves on.

use crate::config::ScanConfig;
use crate::error::{FileError, OcrError, RemoteError};
use crate::pipeline::encode::{mime_type_for, InlineDocument};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// MIME type the model is asked to answer with.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Text and usage returned by one model call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A multimodal model that turns a prompt plus one document into JSON text.
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, for logs and the summary.
    fn model_name(&self) -> &str;

    /// Issue exactly one request and return the raw response text.
    fn generate_json(
        &self,
        prompt: &str,
        document: &InlineDocument,
    ) -> impl Future<Output = Result<ModelResponse, RemoteError>> + Send;
}

/// Read `path`, send it with `prompt`, and return the model's answer.
///
/// Every failure is mapped to a [`FileError`] so the caller can decide
/// whether it is fatal.
pub async fn process_file<M: GenerativeModel>(
    model: &M,
    path: &Path,
    prompt: &str,
) -> Result<ModelResponse, FileError> {
    debug!("Processing with {}: {}", model.model_name(), path.display());

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FileError::ReadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let mime_type = mime_type_for(path);
    let document = InlineDocument::from_bytes(&bytes, mime_type);
    debug!("{}: {} bytes as {}", path.display(), bytes.len(), mime_type);

    let start = Instant::now();
    let response = model
        .generate_json(prompt, &document)
        .await
        .map_err(|e| FileError::RemoteInvocationFailed {
            path: path.to_path_buf(),
            cause: e.0,
        })?;

    debug!(
        "{}: {} input tokens, {} output tokens, {:?}",
        path.display(),
        response.input_tokens,
        response.output_tokens,
        start.elapsed()
    );
    debug!("Received response from {}: {}", model.model_name(), response.text);

    Ok(response)
}

// ── Gemini REST client ───────────────────────────────────────────────────

/// Gemini `generateContent` client holding the API key.
///
/// Built once per run and shared by reference across all files.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    /// Build a client from a validated config.
    pub fn from_config(config: &ScanConfig) -> Result<Self, OcrError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| OcrError::ClientInit(e.to_string()))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/{model}:generateContent`
    pub fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_json(
        &self,
        prompt: &str,
        document: &InlineDocument,
    ) -> Result<ModelResponse, RemoteError> {
        let body = build_request(prompt, document);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError(format!("request to {} failed: {}", self.model, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(RemoteError(describe_http_error(status.as_u16(), &text)));
        }

        parse_response(&text)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    status: Option<String>,
}

/// Request layout: prompt text, then the document, in a single user turn.
fn build_request<'a>(prompt: &'a str, document: &'a InlineDocument) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                RequestPart {
                    text: Some(prompt),
                    inline_data: None,
                },
                RequestPart {
                    text: None,
                    inline_data: Some(Blob {
                        mime_type: &document.mime_type,
                        data: &document.data,
                    }),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE,
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn parse_response(body: &str) -> Result<ModelResponse, RemoteError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| RemoteError(format!("malformed response: {e}")))?;

    let (input_tokens, output_tokens) = parsed
        .usage_metadata
        .as_ref()
        .map(|u| (u.prompt_token_count, u.candidates_token_count))
        .unwrap_or((0, 0));

    let first = parsed.candidates.first();
    let text: Option<String> = first
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .filter(|t| !t.is_empty());

    match text {
        Some(text) => Ok(ModelResponse {
            text,
            input_tokens,
            output_tokens,
        }),
        None => {
            let mut cause = String::from("response contained no text");
            if let Some(reason) = parsed
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                cause.push_str(&format!(" (prompt blocked: {reason})"));
            } else if let Some(reason) = first.and_then(|c| c.finish_reason.as_deref()) {
                cause.push_str(&format!(" (finish reason: {reason})"));
            }
            Err(RemoteError(cause))
        }
    }
}

/// Prefer the API's own error message; fall back to the raw body.
fn describe_http_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => match err.error.status {
            Some(s) => format!("HTTP {status} {s}: {}", err.error.message),
            None => format!("HTTP {status}: {}", err.error.message),
        },
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => format!("HTTP {status}: {}", body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputSelection;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn client_for(base_url: &str) -> GeminiClient {
        let config = ScanConfig::builder()
            .api_key("secret-key")
            .model("gemini-test")
            .api_base_url(base_url)
            .input(InputSelection::File("a.pdf".into()))
            .build()
            .unwrap();
        GeminiClient::from_config(&config).unwrap()
    }

    /// Answer exactly one HTTP request on 127.0.0.1 and return the base URL
    /// plus a handle yielding the raw request that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v1beta/models", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 8192];
            while !request_complete(&request) {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    /// Headers received and the body is as long as `Content-Length` says.
    fn request_complete(buf: &[u8]) -> bool {
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        buf.len() >= end + 4 + length
    }

    #[test]
    fn request_layout() {
        let doc = InlineDocument::from_bytes(b"%PDF", "application/pdf");
        let json = serde_json::to_value(build_request("Extract fields", &doc)).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(parts[0]["text"], "Extract fields");
        assert!(parts[0].get("inlineData").is_none());
        assert_eq!(parts[1]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[1]["inlineData"]["data"], doc.data.as_str());
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn parse_joins_text_parts_and_usage() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": " 1}"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 1200, "candidatesTokenCount": 34, "totalTokenCount": 1234}
        }"#;
        let r = parse_response(body).unwrap();
        assert_eq!(r.text, r#"{"a": 1}"#);
        assert_eq!(r.input_tokens, 1200);
        assert_eq!(r.output_tokens, 34);
    }

    #[test]
    fn text_is_not_validated_as_json() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"not json at all"}]}}]}"#;
        assert_eq!(parse_response(body).unwrap().text, "not json at all");
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = parse_response(body).unwrap_err();
        assert!(err.0.contains("no text"), "got: {err}");
        assert!(err.0.contains("SAFETY"), "got: {err}");
    }

    #[test]
    fn malformed_body_is_an_error() {
        let err = parse_response("<html>oops</html>").unwrap_err();
        assert!(err.0.starts_with("malformed response"), "got: {err}");
    }

    #[test]
    fn http_error_uses_api_message() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            describe_http_error(429, body),
            "HTTP 429 RESOURCE_EXHAUSTED: Resource has been exhausted"
        );
        assert_eq!(describe_http_error(502, "Bad Gateway"), "HTTP 502: Bad Gateway");
        assert_eq!(describe_http_error(500, ""), "HTTP 500");
    }

    #[test]
    fn endpoint_and_debug() {
        let config = ScanConfig::builder()
            .api_key("secret-key")
            .model("gemini-1.5-pro")
            .api_base_url("http://localhost:9999/v1beta/models/")
            .input(InputSelection::File("a.pdf".into()))
            .build()
            .unwrap();
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-1.5-pro");
        assert!(!format!("{client:?}").contains("secret-key"));
    }

    #[tokio::test]
    async fn http_error_status_becomes_remote_failure() {
        let (base_url, server) = serve_once(
            "429 Too Many Requests",
            r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let err = process_file(&client_for(&base_url), &path, "Extract fields")
            .await
            .unwrap_err();

        match err {
            FileError::RemoteInvocationFailed { path: p, cause } => {
                assert_eq!(p, path);
                assert_eq!(cause, "HTTP 429 RESOURCE_EXHAUSTED: Resource has been exhausted");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let request = server.await.unwrap();
        assert!(
            request.starts_with("POST /v1beta/models/gemini-test:generateContent HTTP/1.1"),
            "got: {request}"
        );
        assert!(
            request.to_ascii_lowercase().contains("x-goog-api-key: secret-key"),
            "got: {request}"
        );
    }

    #[tokio::test]
    async fn success_returns_text_and_sends_json_directive() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"total\": \"9.99\"}"}]}}],
                "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 3}}"#,
        )
        .await;
        let doc = InlineDocument::from_bytes(b"%PDF-1.4", "application/pdf");

        let response = client_for(&base_url)
            .generate_json("Extract fields", &doc)
            .await
            .unwrap();

        assert_eq!(response.text, r#"{"total": "9.99"}"#);
        assert_eq!((response.input_tokens, response.output_tokens), (7, 3));

        let request = server.await.unwrap();
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: secret-key"));
        assert!(request.contains(r#""responseMimeType":"application/json""#), "got: {request}");
        assert!(request.contains(&doc.data), "document payload missing");
    }

    #[tokio::test]
    async fn unreadable_input_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        // Reading a directory as a file fails before any request is made.
        let path = dir.path().join("folder.pdf");
        std::fs::create_dir(&path).unwrap();

        let err = process_file(&client_for("http://127.0.0.1:1/v1beta/models"), &path, "p")
            .await
            .unwrap_err();

        assert!(
            matches!(&err, FileError::ReadFailed { path: p, .. } if p == &path),
            "got: {err:?}"
        );
    }
}
