//! The tracker repository.
//!
//! Owns the tracker collection, assigns identifiers, computes sort order,
//! paginates list renders, and holds the settings map. Exactly one logical
//! operation runs at a time (`&mut self`); every successful mutating
//! operation commits the whole root to the store before returning, and a
//! failed commit rolls the in-memory state back so the caller never sees a
//! half-applied operation.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{Completion, Tracker, TrackerId};
use crate::page::{PAGE_SIZE, PageEntry, PageRender, label_for};
use crate::parse::{parse_completion, parse_completions};
use crate::rollover::DayRollover;
use crate::settings::{SettingKey, Settings};
use crate::store::{MemoryStore, Root, SqliteStore, Store, ViewState};

/// Listing order for the tracker collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Forecast,
    Latest,
    Name,
    Id,
}

impl SortOrder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Forecast => "forecast",
            Self::Latest => "latest",
            Self::Name => "name",
            Self::Id => "id",
        }
    }

    /// Parse a strategy name; anything unrecognized falls back to
    /// `forecast`.
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Self::Latest,
            "name" => Self::Name,
            "id" => Self::Id,
            "forecast" => Self::Forecast,
            other => {
                warn!(strategy = other, "unknown sort strategy, using forecast");
                Self::Forecast
            }
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Repository {
    store: Box<dyn Store>,
    degraded: bool,
    trackers: BTreeMap<TrackerId, Tracker>,
    next_id: u64,
    settings: Settings,
    sort: SortOrder,
    active_page: usize,
    /// The most recent page render; dropped on any mutation, sort change,
    /// or page change so label/row lookups can never resolve against a
    /// stale ordering.
    last_render: Option<PageRender>,
    rollover: DayRollover,
}

impl Repository {
    /// Open the repository against the store at `path`.
    ///
    /// If the store cannot be opened or loaded the repository degrades to
    /// an empty, non-persistent in-memory collection; the degradation is
    /// logged and visible through [`Self::degraded`], never silent.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let result = SqliteStore::open(path)
            .map_err(CoreError::Store)
            .and_then(|store| Self::with_store(Box::new(store)));
        match result {
            Ok(repo) => repo,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "store unavailable, running in-memory only; changes will not persist"
                );
                let mut repo = Self::with_store(Box::new(MemoryStore::new()))
                    .unwrap_or_else(|_| unreachable!("memory store load cannot fail"));
                repo.degraded = true;
                repo
            }
        }
    }

    /// Construct against an explicit store (dependency injection; tests use
    /// a [`MemoryStore`]).
    pub fn with_store(mut store: Box<dyn Store>) -> Result<Self, CoreError> {
        let root = store.load()?;
        let eta = root.settings.eta;
        let trackers: BTreeMap<TrackerId, Tracker> = root
            .trackers
            .into_iter()
            .map(|record| (record.id, Tracker::from_record(record, eta)))
            .collect();
        // The persisted counter is authoritative unless it lags the data.
        let next_id = trackers
            .keys()
            .next_back()
            .map_or(root.next_id, |max| root.next_id.max(max.0 + 1));

        let mut repo = Self {
            store,
            degraded: false,
            trackers,
            next_id,
            settings: root.settings,
            sort: root.view.sort,
            active_page: root.view.page,
            last_render: None,
            rollover: DayRollover::new(root.view.last_rollover),
        };
        repo.active_page = repo.active_page.min(repo.page_count() - 1);
        Ok(repo)
    }

    /// True when the repository fell back to the in-memory store at startup.
    #[must_use]
    pub const fn degraded(&self) -> bool {
        self.degraded
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        self.sort
    }

    #[must_use]
    pub const fn active_page(&self) -> usize {
        self.active_page
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TrackerId) -> Option<&Tracker> {
        self.trackers.get(&id)
    }

    /// Release the repository, closing the store.
    pub fn close(self) -> Result<(), CoreError> {
        self.store.close()
    }

    // ── Mutating operations ─────────────────────────────────────────────

    /// Create a tracker with an empty history and return its id.
    pub fn add_tracker(&mut self, name: &str) -> Result<TrackerId, CoreError> {
        let id = TrackerId(self.next_id);
        self.trackers.insert(id, Tracker::new(id, name));
        self.next_id += 1;
        if let Err(err) = self.persist() {
            self.trackers.remove(&id);
            self.next_id -= 1;
            return Err(err);
        }
        self.last_render = None;
        info!(%id, name, "added tracker");
        Ok(id)
    }

    /// Remove a tracker. Deleting an id that is already absent is a no-op,
    /// not an error.
    pub fn delete_tracker(&mut self, id: TrackerId) -> Result<(), CoreError> {
        let Some(removed) = self.trackers.remove(&id) else {
            debug!(%id, "delete of absent tracker ignored");
            return Ok(());
        };
        let previous_page = self.active_page;
        self.active_page = self.active_page.min(self.page_count() - 1);
        if let Err(err) = self.persist() {
            self.trackers.insert(id, removed);
            self.active_page = previous_page;
            return Err(err);
        }
        self.last_render = None;
        info!(%id, "deleted tracker");
        Ok(())
    }

    pub fn rename_tracker(&mut self, id: TrackerId, name: &str) -> Result<(), CoreError> {
        let eta = self.settings.eta;
        self.mutate_tracker(id, |tracker| {
            tracker.rename(name, eta);
            Ok(())
        })
    }

    pub fn record_completion(
        &mut self,
        id: TrackerId,
        completion: Completion,
    ) -> Result<(), CoreError> {
        let eta = self.settings.eta;
        self.mutate_tracker(id, |tracker| {
            tracker.record_completion(completion, eta);
            Ok(())
        })
    }

    /// Parse and record a single `"<datetime>[, <duration>]"` completion.
    pub fn record_completion_text(
        &mut self,
        id: TrackerId,
        text: &str,
    ) -> Result<(), CoreError> {
        let completion = parse_completion(text, self.settings.date_prefs(), now())?;
        self.record_completion(id, completion)
    }

    /// Replace the entire history (bulk edit).
    pub fn record_completions(
        &mut self,
        id: TrackerId,
        completions: Vec<Completion>,
    ) -> Result<(), CoreError> {
        let eta = self.settings.eta;
        self.mutate_tracker(id, |tracker| {
            tracker.record_completions(completions, eta);
            Ok(())
        })
    }

    /// Parse a `"; "`-separated batch and replace the history with it.
    pub fn record_completions_text(
        &mut self,
        id: TrackerId,
        text: &str,
    ) -> Result<(), CoreError> {
        let completions = parse_completions(text, self.settings.date_prefs(), now())?;
        self.record_completions(id, completions)
    }

    /// Remove one history entry by 0-based index.
    pub fn remove_completion(&mut self, id: TrackerId, index: usize) -> Result<(), CoreError> {
        let eta = self.settings.eta;
        self.mutate_tracker(id, |tracker| tracker.remove_completion(index, eta))
    }

    /// Replace one history entry by 0-based index.
    pub fn replace_completion(
        &mut self,
        id: TrackerId,
        index: usize,
        completion: Completion,
    ) -> Result<(), CoreError> {
        let eta = self.settings.eta;
        self.mutate_tracker(id, |tracker| {
            tracker.replace_completion(index, completion, eta)
        })
    }

    /// Apply `op` to a clone of the tracker, commit, and only then swap the
    /// clone in. On any failure the repository is unchanged.
    fn mutate_tracker(
        &mut self,
        id: TrackerId,
        op: impl FnOnce(&mut Tracker) -> Result<(), CoreError>,
    ) -> Result<(), CoreError> {
        let Some(current) = self.trackers.get(&id) else {
            return Err(CoreError::UnknownTracker { id });
        };
        let mut updated = current.clone();
        op(&mut updated)?;

        let previous = self.trackers.insert(id, updated);
        if let Err(err) = self.persist() {
            if let Some(previous) = previous {
                self.trackers.insert(id, previous);
            }
            return Err(err);
        }
        self.last_render = None;
        Ok(())
    }

    // ── Sorting and pagination ──────────────────────────────────────────

    /// Set the active sort strategy. Unknown names fall back to `forecast`.
    pub fn set_sort(&mut self, order: SortOrder) -> Result<(), CoreError> {
        let previous = self.sort;
        self.sort = order;
        if let Err(err) = self.persist() {
            self.sort = previous;
            return Err(err);
        }
        self.last_render = None;
        Ok(())
    }

    /// Number of pages (at least 1).
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.trackers.len().div_ceil(PAGE_SIZE).max(1)
    }

    /// Activate `page` if it is in range; out-of-range requests are
    /// silently ignored, leaving the active page unchanged.
    pub fn set_active_page(&mut self, page: usize) -> Result<(), CoreError> {
        if page >= self.page_count() {
            debug!(page, pages = self.page_count(), "page out of range, ignored");
            return Ok(());
        }
        if page == self.active_page {
            return Ok(());
        }
        let previous = self.active_page;
        self.active_page = page;
        if let Err(err) = self.persist() {
            self.active_page = previous;
            return Err(err);
        }
        self.last_render = None;
        Ok(())
    }

    pub fn next_page(&mut self) -> Result<(), CoreError> {
        self.set_active_page(self.active_page + 1)
    }

    pub fn previous_page(&mut self) -> Result<(), CoreError> {
        match self.active_page.checked_sub(1) {
            Some(page) => self.set_active_page(page),
            None => Ok(()),
        }
    }

    pub fn first_page(&mut self) -> Result<(), CoreError> {
        self.set_active_page(0)
    }

    /// Render the requested page (activating it if in range) and remember
    /// the render for label/row lookups. The previous render, if any, is
    /// discarded: its labels are position-dependent and must not survive.
    pub fn list_page(&mut self, page: usize) -> Result<PageRender, CoreError> {
        self.set_active_page(page)?;
        Ok(self.render_active_page())
    }

    /// Render the active page.
    pub fn render_active_page(&mut self) -> PageRender {
        let pages = self.page_count();
        let window_scale = i32::try_from(self.settings.eta).unwrap_or(i32::MAX);
        let entries: Vec<PageEntry> = {
            let mut sorted: Vec<&Tracker> = self.trackers.values().collect();
            let order = self.sort;
            sorted.sort_by(|a, b| compare(order, a, b));
            sorted
                .iter()
                .skip(self.active_page * PAGE_SIZE)
                .take(PAGE_SIZE)
                .enumerate()
                .map(|(index, tracker)| PageEntry {
                    label: label_for(index).unwrap_or('?'),
                    row: index + 1,
                    id: tracker.id(),
                    name: tracker.name().to_string(),
                    forecast: tracker.stats().next_expected,
                    window: tracker
                        .stats()
                        .next_expected
                        .map(|_| tracker.stats().spread * window_scale),
                    latest: tracker.stats().last_completion,
                })
                .collect()
        };
        let render = PageRender {
            page: self.active_page,
            pages,
            entries,
        };
        self.last_render = Some(render.clone());
        render
    }

    /// Resolve a label against the most recent render of `page`. Returns
    /// `None` when no render exists, the render was for a different page,
    /// or the label is unassigned — a stale mapping is never served.
    #[must_use]
    pub fn tracker_by_label(&self, page: usize, label: char) -> Option<&Tracker> {
        let render = self.last_render.as_ref().filter(|r| r.page == page)?;
        self.trackers.get(&render.id_for_label(label)?)
    }

    /// Resolve a 1-based row number against the most recent render of
    /// `page`, with the same staleness contract as
    /// [`Self::tracker_by_label`].
    #[must_use]
    pub fn tracker_by_row(&self, page: usize, row: usize) -> Option<&Tracker> {
        let render = self.last_render.as_ref().filter(|r| r.page == page)?;
        self.trackers.get(&render.id_for_row(row)?)
    }

    // ── Settings ────────────────────────────────────────────────────────

    /// Current value of a settings key, rendered as text.
    pub fn setting(&self, key: &str) -> Result<String, CoreError> {
        let key: SettingKey = key.parse()?;
        Ok(self.settings.get(key))
    }

    /// Set a settings key from text. Unrecognized keys and unparseable
    /// values leave everything unchanged. Changing `eta` recomputes every
    /// tracker's statistics.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let key: SettingKey = key.parse()?;
        let previous = self.settings;
        self.settings.set(key, value)?;
        if let Err(err) = self.persist() {
            self.settings = previous;
            return Err(err);
        }
        if self.settings.eta != previous.eta {
            self.refresh_all();
        }
        info!(%key, value, "updated setting");
        Ok(())
    }

    /// Reset all settings to the fixed default set and recompute.
    pub fn restore_defaults(&mut self) -> Result<(), CoreError> {
        let previous = self.settings;
        self.settings = Settings::default();
        if let Err(err) = self.persist() {
            self.settings = previous;
            return Err(err);
        }
        self.refresh_all();
        info!("restored default settings");
        Ok(())
    }

    /// Force-recompute every tracker's derived statistics. Statistics are
    /// never persisted, so no commit is needed.
    pub fn refresh_all(&mut self) {
        let eta = self.settings.eta;
        for tracker in self.trackers.values_mut() {
            tracker.recompute(eta);
        }
        self.last_render = None;
        debug!(count = self.trackers.len(), "refreshed tracker statistics");
    }

    // ── Day rollover ────────────────────────────────────────────────────

    /// Observe `today`; returns `true` at most once per calendar-day
    /// transition. The caller runs its backup/rotation collaborator when
    /// this fires. Serialized with every other operation via `&mut self`.
    pub fn on_day_rollover(&mut self, today: NaiveDate) -> Result<bool, CoreError> {
        let previous = self.rollover;
        if !self.rollover.observe(today) {
            return Ok(false);
        }
        if let Err(err) = self.persist() {
            self.rollover = previous;
            return Err(err);
        }
        info!(%today, "day rollover");
        Ok(true)
    }

    // ── Persistence ─────────────────────────────────────────────────────

    fn persist(&mut self) -> Result<(), CoreError> {
        let root = Root {
            settings: self.settings,
            trackers: self.trackers.values().map(Tracker::to_record).collect(),
            next_id: self.next_id,
            view: ViewState {
                sort: self.sort,
                page: self.active_page,
                last_rollover: self.rollover.last(),
            },
        };
        self.store.commit(&root)
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

type TierKey = (u8, Option<NaiveDateTime>, TrackerId);

/// Forecast order: trackers with a forecast first (ascending), then those
/// with only a last completion, then the rest by id.
fn forecast_key(tracker: &Tracker) -> TierKey {
    let stats = tracker.stats();
    match (stats.next_expected, stats.last_completion) {
        (Some(next), _) => (0, Some(next), tracker.id()),
        (None, Some(last)) => (1, Some(last), tracker.id()),
        (None, None) => (2, None, tracker.id()),
    }
}

/// Latest order: last completion primary, forecast secondary, empties last.
fn latest_key(tracker: &Tracker) -> TierKey {
    let stats = tracker.stats();
    match (stats.last_completion, stats.next_expected) {
        (Some(last), _) => (0, Some(last), tracker.id()),
        (None, Some(next)) => (1, Some(next), tracker.id()),
        (None, None) => (2, None, tracker.id()),
    }
}

fn compare(order: SortOrder, a: &Tracker, b: &Tracker) -> Ordering {
    match order {
        SortOrder::Forecast => forecast_key(a).cmp(&forecast_key(b)),
        SortOrder::Latest => latest_key(a).cmp(&latest_key(b)),
        SortOrder::Name => a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())),
        SortOrder::Id => a.id().cmp(&b.id()),
    }
}
