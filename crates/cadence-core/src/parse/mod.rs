//! Pure, collaborator-facing parsing helpers for instants, durations, and
//! completion strings.

pub mod completion;
pub mod duration;
pub mod instant;

pub use completion::{parse_completion, parse_completions};
pub use duration::{format_duration, format_duration_short, parse_duration};
pub use instant::{DateParsePrefs, parse_instant};
