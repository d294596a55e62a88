//! Pipeline stages for one scan run.
//!
//! Each submodule implements exactly one step, applied to every file in turn:
//!
//! ```text
//! input ──▶ encode ──▶ llm ──▶ write
//! (paths)   (base64)  (Gemini) (<file>.json)
//! ```
//!
//! 1. [`input`]  — resolve the selection to the list of PDF paths
//! 2. [`encode`] — infer the MIME type and base64-wrap the file bytes
//! 3. [`llm`]    — one `generateContent` call asking for JSON; the only stage
//!    with network I/O
//! 4. [`write`]  — output path, skip policy, verbatim write

pub mod encode;
pub mod input;
pub mod llm;
pub mod write;
