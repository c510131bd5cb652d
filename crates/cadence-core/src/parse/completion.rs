//! Completion-string parsing.
//!
//! A completion is `"<datetime>[, <duration>]"`; a batch is completions
//! joined by `"; "`. Batch parsing collects every failure instead of
//! stopping at the first so the caller sees all bad entries at once.

use chrono::{Duration, NaiveDateTime};

use super::duration::parse_duration;
use super::instant::{DateParsePrefs, parse_instant};
use crate::error::CoreError;
use crate::model::Completion;

/// Parse `"<datetime>[, <duration>]"`. The duration defaults to zero.
pub fn parse_completion(
    input: &str,
    prefs: DateParsePrefs,
    now: NaiveDateTime,
) -> Result<Completion, CoreError> {
    let (dt_part, td_part) = match input.split_once(',') {
        Some((dt, td)) => (dt.trim(), Some(td.trim())),
        None => (input.trim(), None),
    };

    let at = parse_instant(dt_part, prefs, now)?;
    let adjust = match td_part {
        Some(td) if !td.is_empty() => parse_duration(td)?,
        _ => Duration::zero(),
    };
    Ok(Completion::new(at, adjust))
}

/// Parse a `"; "`-separated batch, aggregating all failures into one
/// [`CoreError::InvalidFormat`].
pub fn parse_completions(
    input: &str,
    prefs: DateParsePrefs,
    now: NaiveDateTime,
) -> Result<Vec<Completion>, CoreError> {
    let mut completions = Vec::new();
    let mut failures = Vec::new();
    for part in input.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match parse_completion(part, prefs, now) {
            Ok(completion) => completions.push(completion),
            Err(err) => failures.push(err.to_string()),
        }
    }

    if failures.is_empty() {
        Ok(completions)
    } else {
        Err(CoreError::InvalidFormat {
            input: input.to_string(),
            reason: failures.join("; "),
        })
    }
}
