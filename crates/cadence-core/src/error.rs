//! Error taxonomy for the core.
//!
//! Three recoverable families (unparseable text, unknown entity, bad history
//! index) plus store failures. A failed store commit aborts the in-flight
//! mutation; the repository's in-memory state is left as it was before the
//! operation. Stale label/row lookups are deliberately *not* an error
//! variant: the page-render contract makes them return `None`.

use crate::model::TrackerId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Unparseable date/duration/completion text. Recoverable; no state
    /// was mutated.
    #[error("cannot parse '{input}': {reason}")]
    InvalidFormat { input: String, reason: String },

    /// An operation referenced a tracker id that does not exist.
    #[error("no tracker with id {id}")]
    UnknownTracker { id: TrackerId },

    /// An operation referenced a settings key that does not exist.
    #[error("unknown setting '{key}'")]
    UnknownSetting { key: String },

    /// A history edit referenced an entry outside the current history.
    #[error("history entry {index} out of range ({len} entries)")]
    HistoryIndex { index: usize, len: usize },

    /// The persistence layer is unavailable or a commit failed.
    #[error("store failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl CoreError {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFormat { .. } => "E1001",
            Self::UnknownTracker { .. } => "E2001",
            Self::UnknownSetting { .. } => "E2002",
            Self::HistoryIndex { .. } => "E2003",
            Self::Store(_) => "E5001",
        }
    }

    /// Optional remediation hint surfaced to the caller.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidFormat { .. } => {
                Some("Use '<datetime>[, <duration>]', e.g. 'now' or '2025-03-01 8:00, -1h30m'.")
            }
            Self::UnknownTracker { .. } => Some("Run `cad list` to see tracker ids."),
            Self::UnknownSetting { .. } => {
                Some("Valid settings: ampm, yearfirst, dayfirst, eta.")
            }
            Self::HistoryIndex { .. } => {
                Some("Run `cad show <id>` to see the current history entries.")
            }
            Self::Store(_) => Some("Check that the data directory is writable."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;
    use crate::model::TrackerId;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique_and_machine_friendly() {
        let all = [
            CoreError::InvalidFormat {
                input: "x".into(),
                reason: "y".into(),
            },
            CoreError::UnknownTracker { id: TrackerId(1) },
            CoreError::UnknownSetting { key: "k".into() },
            CoreError::HistoryIndex { index: 3, len: 1 },
            CoreError::Store(anyhow::anyhow!("boom")),
        ];

        let mut seen = HashSet::new();
        for err in &all {
            let code = err.error_code();
            assert!(seen.insert(code), "duplicate code {code}");
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_includes_the_offending_input() {
        let err = CoreError::InvalidFormat {
            input: "yesterday-ish".into(),
            reason: "unrecognized datetime".into(),
        };
        let text = err.to_string();
        assert!(text.contains("yesterday-ish"));
        assert!(text.contains("unrecognized datetime"));
    }
}
