//! In-memory store.
//!
//! Used as the degraded fallback when the on-disk store cannot be opened,
//! and as a test double. Commits are atomic but not durable.

use super::{Root, Store};
use crate::error::CoreError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    root: Root,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a prepared root (test seeding).
    #[must_use]
    pub const fn with_root(root: Root) -> Self {
        Self { root }
    }
}

impl Store for MemoryStore {
    fn load(&mut self) -> Result<Root, CoreError> {
        Ok(self.root.clone())
    }

    fn commit(&mut self, root: &Root) -> Result<(), CoreError> {
        self.root = root.clone();
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), CoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::model::{Tracker, TrackerId};
    use crate::store::{Root, Store};

    #[test]
    fn load_reflects_the_last_commit() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().expect("load"), Root::default());

        let mut root = Root::default();
        root.trackers
            .push(Tracker::new(TrackerId(1), "stretch").to_record());
        root.next_id = 2;
        store.commit(&root).expect("commit");
        assert_eq!(store.load().expect("reload"), root);
    }
}
