//! Result reporting.
//!
//! Renders one line per job to a writer, either as `[RESULT]` text with an
//! escaped preview of the response, or as JSON lines.

use std::io::Write;

use serde::Serialize;
use tracing::warn;

use crate::dispatch::{BatchSummary, DispatchError, ItemResult, ResultSink};

/// Escaped prefix of `bytes`, at most `limit` input bytes long.
///
/// Non-printable bytes are shown as escapes (`\r`, `\n`, `\x00`); `...` marks
/// a truncated prefix.
pub fn preview(bytes: &[u8], limit: usize) -> String {
    let shown = &bytes[..bytes.len().min(limit)];
    let mut out: String = shown
        .iter()
        .flat_map(|b| std::ascii::escape_default(*b))
        .map(char::from)
        .collect();
    if bytes.len() > limit {
        out.push_str("...");
    }
    out
}

/// One reported job outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultLine {
    pub index: usize,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultLine {
    pub fn from_result(index: usize, result: &ItemResult, preview_len: usize) -> Self {
        match result {
            Ok(response) => Self {
                index,
                ok: true,
                status: response.status,
                bytes: response.body.len(),
                elapsed_ms: Some(response.elapsed.as_millis() as u64),
                preview: Some(preview(&response.body, preview_len)),
                error: None,
            },
            Err(e) => Self {
                index,
                ok: false,
                status: match e {
                    DispatchError::Transport(crate::transport::TransportError::Status {
                        status,
                        ..
                    }) => Some(*status),
                    _ => None,
                },
                bytes: 0,
                elapsed_ms: None,
                preview: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Plain-text rendering.
    pub fn to_text(&self) -> String {
        let mut line = format!("[RESULT] #{}", self.index);
        if let Some(status) = self.status {
            line.push_str(&format!(" {status}"));
        }
        if let Some(ms) = self.elapsed_ms {
            line.push_str(&format!(" {ms}ms"));
        }
        match (&self.preview, &self.error) {
            (_, Some(error)) => line.push_str(&format!(" error: {error}")),
            (Some(preview), None) => line.push_str(&format!(" {preview}")),
            (None, None) => {}
        }
        line
    }
}

/// Sink writing one line per result to `out`.
pub struct ReportSink<W> {
    out: W,
    json: bool,
    preview_len: usize,
}

impl<W: Write + Send + 'static> ReportSink<W> {
    pub fn new(out: W, json: bool, preview_len: usize) -> Self {
        Self {
            out,
            json,
            preview_len,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!(error = %e, "failed to write result");
        }
    }
}

impl<W: Write + Send + 'static> ResultSink for ReportSink<W> {
    fn on_item_result(&mut self, index: usize, result: ItemResult) {
        let line = ResultLine::from_result(index, &result, self.preview_len);
        let rendered = if self.json {
            serde_json::to_string(&line).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
        } else {
            line.to_text()
        };
        self.emit(&rendered);
    }

    fn on_batch_complete(&mut self, summary: &BatchSummary) {
        let rendered = if self.json {
            serde_json::json!({ "summary": summary }).to_string()
        } else {
            format!(
                "[DONE] {} requests: {} ok, {} failed, {} cancelled in {}ms",
                summary.done,
                summary.succeeded,
                summary.failed,
                summary.cancelled,
                summary.elapsed.as_millis()
            )
        };
        self.emit(&rendered);
    }
}
