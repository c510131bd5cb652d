//! Core entities: completions, trackers, and derived statistics.

pub mod completion;
pub mod stats;
pub mod tracker;

pub use completion::Completion;
pub use stats::{Stats, Trend};
pub use tracker::{MAX_HISTORY, Tracker, TrackerId, TrackerRecord};
