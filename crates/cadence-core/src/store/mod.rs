//! The persistent store boundary.
//!
//! A [`Store`] holds one [`Root`] record: the settings map, the tracker
//! records, the next-id counter, and the shell's view state. The repository
//! commits the whole root after every successful mutating operation, so no
//! reader ever observes a partially applied change.

pub mod memory;
pub mod sqlite;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::TrackerRecord;
use crate::repo::SortOrder;
use crate::settings::Settings;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Shell view state carried alongside the root so a non-resident shell can
/// keep its sort order, active page, and day-rollover marker across
/// invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub sort: SortOrder,
    pub page: usize,
    pub last_rollover: Option<NaiveDate>,
}

/// The single root record of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub settings: Settings,
    pub trackers: Vec<TrackerRecord>,
    pub next_id: u64,
    pub view: ViewState,
}

impl Default for Root {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            trackers: Vec::new(),
            next_id: 1,
            view: ViewState::default(),
        }
    }
}

/// Transactional root-record storage.
pub trait Store {
    /// Load the root record, initializing it on first use.
    fn load(&mut self) -> Result<Root, CoreError>;

    /// Atomically replace the durable root with `root`.
    fn commit(&mut self, root: &Root) -> Result<(), CoreError>;

    /// Release the store. Any uncommitted state is discarded.
    fn close(self: Box<Self>) -> Result<(), CoreError>;
}
