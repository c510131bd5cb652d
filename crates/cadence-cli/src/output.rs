//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: readable text for humans, stable JSON for scripts.

use serde::Serialize;
use std::io::{self, Write};

use cadence_core::CoreError;

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E1001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }
}

impl From<&CoreError> for CliError {
    fn from(err: &CoreError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: err.suggestion().map(str::to_string),
            error_code: Some(err.error_code().to_string()),
        }
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode the value is serialized with `serde_json`; in human mode
/// the `human_fn` closure produces the text.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render a success message to stdout.
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "ok": true, "message": message });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "✓ {message}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_from_core_error_carries_code_and_suggestion() {
        let core = CoreError::UnknownTracker {
            id: cadence_core::TrackerId(7),
        };
        let cli = CliError::from(&core);
        assert_eq!(cli.error_code.as_deref(), Some("E2001"));
        assert!(cli.suggestion.is_some());
        assert!(cli.message.contains('7'));
    }

    #[test]
    fn cli_error_serializes_without_empty_fields() {
        let err = CliError::new("boom");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"message":"boom"}"#);
    }

    #[test]
    fn render_writes_json() {
        let result = render(OutputMode::Json, &serde_json::json!({"a": 1}), |_, _| Ok(()));
        assert!(result.is_ok());
    }

    #[test]
    fn render_error_human() {
        let err = CliError::new("failed");
        assert!(render_error(OutputMode::Human, &err).is_ok());
    }

    #[test]
    fn render_success_json() {
        assert!(render_success(OutputMode::Json, "it worked").is_ok());
    }
}
