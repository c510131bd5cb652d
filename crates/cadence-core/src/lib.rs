//! cadence-core library.
//!
//! Tracks recurring events with no fixed schedule and forecasts, from the
//! observed completion history alone, when each one is next expected. The
//! [`repo::Repository`] is the single entry point: it owns the tracker
//! collection, the settings map, sorting and pagination, and persistence
//! through a [`store::Store`].

pub mod error;
pub mod fmt;
pub mod model;
pub mod page;
pub mod parse;
pub mod repo;
pub mod rollover;
pub mod settings;
pub mod store;

pub use error::CoreError;
pub use model::{Completion, MAX_HISTORY, Stats, Tracker, TrackerId, Trend};
pub use page::{PAGE_SIZE, PageRender};
pub use repo::{Repository, SortOrder};
pub use settings::{SettingKey, Settings};
