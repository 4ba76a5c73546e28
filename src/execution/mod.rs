//! Execution workflow: wire types, error taxonomy and the request controller.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod client;
pub mod controller;
pub mod surface;

pub use client::{Backend, HttpBackend};
pub use controller::{ExecutionController, Outcome};
pub use surface::{BusySurface, OutputSurface};

/// Which trigger started a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Run,
    /// The debug/compile action; sends `debug: true`.
    Compile,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Run => "run",
            Mode::Compile => "compile",
        }
    }

    pub fn is_debug(self) -> bool {
        matches!(self, Mode::Compile)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of the outbound POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub code: String,
    #[serde(rename = "debug")]
    pub debug_mode: bool,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>, mode: Mode) -> Self {
        Self {
            code: code.into(),
            debug_mode: mode.is_debug(),
        }
    }
}

/// Response payload reported by the execution service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub const PROCESSING_MESSAGE: &str = "Processing...";
pub const SUCCESS_FALLBACK: &str = "Code executed successfully.";
pub const FAILURE_FALLBACK: &str = "An error occurred.";

impl ExecutionResult {
    /// Text to show and whether it is an error. Empty fields fall back.
    pub fn display_text(&self) -> (&str, bool) {
        if self.success {
            let text = non_empty(self.output.as_deref()).unwrap_or(SUCCESS_FALLBACK);
            (text, false)
        } else {
            let text = non_empty(self.error.as_deref()).unwrap_or(FAILURE_FALLBACK);
            (text, true)
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Trimmed input was empty. Raised before any request is made.
#[derive(Debug, thiserror::Error)]
#[error("Please enter some code to {mode}.")]
pub struct EmptyInput {
    pub mode: Mode,
}

/// Failures a [`Backend`] can report; the controller absorbs all of them.
/// `success: false` payloads are not errors at this level, they arrive as an
/// `ExecutionResult`.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Request failed with HTTP status {status}")]
    Transport { status: u16 },
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for SubmitError {
    fn from(err: reqwest::Error) -> Self {
        // Status errors are mapped before this point; everything else is a
        // connect, timeout or body decode failure.
        match err.status() {
            Some(status) if !status.is_success() => SubmitError::Transport {
                status: status.as_u16(),
            },
            _ => SubmitError::Network(describe(&err)),
        }
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let next = cause.to_string();
        if !text.contains(&next) {
            text.push_str(": ");
            text.push_str(&next);
        }
        source = cause.source();
    }
    text
}
