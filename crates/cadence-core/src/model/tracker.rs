//! The tracker entity: one recurring item and its completion history.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::completion::Completion;
use super::stats::Stats;
use crate::error::CoreError;
use crate::fmt::{format_dt, format_dt_long};
use crate::parse::duration::format_duration;

/// Maximum retained history length; oldest completions are dropped on
/// overflow. Chosen for display: 6 rows of 2, 4 of 3, 3 of 4, or 2 of 6.
pub const MAX_HISTORY: usize = 12;

/// Integer tracker identity: unique within a repository for its lifetime,
/// monotonically increasing, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TrackerId(pub u64);

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackerId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| CoreError::InvalidFormat {
                input: s.to_string(),
                reason: "tracker id must be a non-negative integer".to_string(),
            })
    }
}

/// The persisted shape of a tracker. Derived statistics are never stored;
/// they are recomputed from history on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerRecord {
    pub id: TrackerId,
    pub name: String,
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
    pub history: Vec<Completion>,
}

/// One recurring item: a name, an ordered capped completion history, and a
/// statistics snapshot recomputed at the end of every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracker {
    id: TrackerId,
    name: String,
    history: Vec<Completion>,
    created: NaiveDateTime,
    modified: NaiveDateTime,
    stats: Stats,
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl Tracker {
    /// Construct a new tracker with an empty history. Only the repository
    /// creates trackers; it supplies the next id.
    #[must_use]
    pub fn new(id: TrackerId, name: impl Into<String>) -> Self {
        let created = now();
        let tracker = Self {
            id,
            name: name.into(),
            history: Vec::new(),
            created,
            modified: created,
            stats: Stats::empty(),
        };
        debug!(id = %tracker.id, name = %tracker.name, "created tracker");
        tracker
    }

    /// Rehydrate from a persisted record, recomputing statistics.
    #[must_use]
    pub fn from_record(record: TrackerRecord, eta: u32) -> Self {
        let mut tracker = Self {
            id: record.id,
            name: record.name,
            history: record.history,
            created: record.created,
            modified: record.modified,
            stats: Stats::empty(),
        };
        tracker.normalize_history();
        tracker.recompute(eta);
        tracker
    }

    #[must_use]
    pub fn to_record(&self) -> TrackerRecord {
        TrackerRecord {
            id: self.id,
            name: self.name.clone(),
            created: self.created,
            modified: self.modified,
            history: self.history.clone(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> TrackerId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn history(&self) -> &[Completion] {
        &self.history
    }

    #[must_use]
    pub const fn created(&self) -> NaiveDateTime {
        self.created
    }

    #[must_use]
    pub const fn modified(&self) -> NaiveDateTime {
        self.modified
    }

    /// The current statistics snapshot. Never stale: every mutating
    /// operation recomputes it before returning.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Insert a completion preserving ascending instant order, dropping the
    /// oldest entries beyond [`MAX_HISTORY`]. Always succeeds.
    pub fn record_completion(&mut self, completion: Completion, eta: u32) {
        self.history.push(completion);
        self.normalize_history();
        self.touch(eta);
    }

    /// Replace the entire history (bulk edit). Same ordering and truncation
    /// rules as [`Self::record_completion`].
    pub fn record_completions(&mut self, completions: Vec<Completion>, eta: u32) {
        self.history = completions;
        self.normalize_history();
        self.touch(eta);
    }

    /// Remove the history entry at `index` (0-based, in ascending order).
    pub fn remove_completion(&mut self, index: usize, eta: u32) -> Result<(), CoreError> {
        if index >= self.history.len() {
            return Err(CoreError::HistoryIndex {
                index,
                len: self.history.len(),
            });
        }
        self.history.remove(index);
        self.touch(eta);
        Ok(())
    }

    /// Replace the history entry at `index` with `completion`.
    pub fn replace_completion(
        &mut self,
        index: usize,
        completion: Completion,
        eta: u32,
    ) -> Result<(), CoreError> {
        if index >= self.history.len() {
            return Err(CoreError::HistoryIndex {
                index,
                len: self.history.len(),
            });
        }
        self.history[index] = completion;
        self.normalize_history();
        self.touch(eta);
        Ok(())
    }

    /// Rename the tracker. Statistics do not depend on the name but are
    /// recomputed anyway so every mutation follows the same discipline.
    pub fn rename(&mut self, name: impl Into<String>, eta: u32) {
        self.name = name.into();
        self.touch(eta);
    }

    /// Recompute the statistics snapshot from the current history.
    pub fn recompute(&mut self, eta: u32) {
        self.stats = Stats::compute(&self.history, eta);
    }

    /// Sort ascending by instant and truncate to the newest [`MAX_HISTORY`].
    /// The sort is stable, so completions at identical instants keep their
    /// insertion order.
    fn normalize_history(&mut self) {
        self.history.sort_by_key(|c| c.at);
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }

    fn touch(&mut self, eta: u32) {
        self.modified = now();
        self.recompute(eta);
    }

    /// Read-only text projection of the history:
    /// `"2025-03-01 08:00, +0m; 2025-03-02 08:30, -1h"`.
    #[must_use]
    pub fn format_history(&self) -> String {
        self.history
            .iter()
            .map(|c| format!("{}, {}", format_dt_long(c.at, false), format_duration(c.adjust)))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Read-only multi-line summary of the tracker and its statistics.
    #[must_use]
    pub fn format_summary(&self, ampm: bool) -> String {
        let history = self
            .history
            .iter()
            .map(|c| format!("{} {}", format_dt(c.at), format_duration(c.adjust)))
            .collect::<Vec<_>>()
            .join(", ");
        let intervals = self
            .stats
            .intervals
            .iter()
            .map(|iv| format_duration(*iv))
            .collect::<Vec<_>>()
            .join(", ");
        let average = self.stats.average.map_or_else(
            || "~".to_string(),
            |avg| {
                let trend = self.stats.trend.map_or(String::new(), |t| t.to_string());
                format!("{}{trend}", format_duration(avg))
            },
        );
        let opt_dt = |value: Option<NaiveDateTime>| {
            value.map_or_else(|| "~".to_string(), |dt| format_dt_long(dt, ampm))
        };
        format!(
            "name:        {}\n\
             id:          {}\n\
             created:     {}\n\
             modified:    {}\n\
             completions: ({})\n\
             \u{20}  {}\n\
             intervals:   ({})\n\
             \u{20}  {}\n\
             \u{20}  average:  {}\n\
             \u{20}  spread:   {}\n\
             forecast:    {}\n\
             \u{20}  early:    {}\n\
             \u{20}  late:     {}",
            self.name,
            self.id,
            format_dt_long(self.created, ampm),
            format_dt_long(self.modified, ampm),
            self.history.len(),
            history,
            self.stats.intervals.len(),
            intervals,
            average,
            format_duration(self.stats.spread),
            opt_dt(self.stats.next_expected),
            opt_dt(self.stats.early),
            opt_dt(self.stats.late),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_HISTORY, Tracker, TrackerId};
    use crate::model::completion::Completion;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn d0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
    }

    fn tracker() -> Tracker {
        Tracker::new(TrackerId(1), "vitamins")
    }

    #[test]
    fn new_tracker_is_empty_with_no_forecast() {
        let t = tracker();
        assert!(t.history().is_empty());
        assert!(t.stats().next_expected.is_none());
        assert_eq!(t.created(), t.modified());
    }

    #[test]
    fn record_out_of_order_completions_keeps_history_ascending() {
        let mut t = tracker();
        t.record_completion(Completion::at(d0() + Duration::hours(48)), 2);
        t.record_completion(Completion::at(d0()), 2);
        t.record_completion(Completion::at(d0() + Duration::hours(24)), 2);

        let instants: Vec<_> = t.history().iter().map(|c| c.at).collect();
        assert_eq!(
            instants,
            vec![d0(), d0() + Duration::hours(24), d0() + Duration::hours(48)]
        );
        assert_eq!(t.stats().next_expected, Some(d0() + Duration::hours(72)));
    }

    #[test]
    fn history_is_capped_dropping_the_earliest() {
        let mut t = tracker();
        for i in 0..=MAX_HISTORY {
            t.record_completion(Completion::at(d0() + Duration::hours(i as i64)), 2);
        }
        assert_eq!(t.history().len(), MAX_HISTORY);
        // The earliest (i == 0) was dropped.
        assert_eq!(t.history()[0].at, d0() + Duration::hours(1));
    }

    #[test]
    fn record_completions_replaces_history() {
        let mut t = tracker();
        t.record_completion(Completion::at(d0()), 2);
        t.record_completions(
            vec![
                Completion::at(d0() + Duration::days(10)),
                Completion::at(d0() + Duration::days(9)),
            ],
            2,
        );
        assert_eq!(t.history().len(), 2);
        assert_eq!(t.history()[0].at, d0() + Duration::days(9));
    }

    #[test]
    fn remove_and_replace_validate_the_index() {
        let mut t = tracker();
        t.record_completion(Completion::at(d0()), 2);

        assert!(t.remove_completion(1, 2).is_err());
        assert!(
            t.replace_completion(5, Completion::at(d0()), 2)
                .is_err()
        );

        t.replace_completion(0, Completion::at(d0() + Duration::hours(1)), 2)
            .expect("replace in range");
        assert_eq!(t.history()[0].at, d0() + Duration::hours(1));

        t.remove_completion(0, 2).expect("remove in range");
        assert!(t.history().is_empty());
        assert!(t.stats().last_completion.is_none());
    }

    #[test]
    fn rename_recomputes_and_touches() {
        let mut t = tracker();
        t.rename("vitamins (daily)", 2);
        assert_eq!(t.name(), "vitamins (daily)");
        assert!(t.modified() >= t.created());
    }

    #[test]
    fn record_roundtrips_and_recomputes_stats() {
        let mut t = tracker();
        t.record_completion(Completion::at(d0()), 2);
        t.record_completion(Completion::at(d0() + Duration::hours(24)), 2);

        let record = t.to_record();
        let back = Tracker::from_record(record, 2);
        assert_eq!(back, t);
        assert_eq!(back.stats().average, Some(Duration::hours(24)));
    }

    #[test]
    fn format_history_lists_completions_in_order() {
        let mut t = tracker();
        t.record_completion(Completion::at(d0()), 2);
        t.record_completion(
            Completion::new(d0() + Duration::hours(24), Duration::minutes(-10)),
            2,
        );
        let text = t.format_history();
        assert_eq!(text, "2025-02-01 07:00, +0m; 2025-02-02 07:00, -10m");
    }

    #[test]
    fn format_summary_shows_sentinels_for_empty_history() {
        let t = tracker();
        let text = t.format_summary(false);
        assert!(text.contains("name:        vitamins"));
        assert!(text.contains("completions: (0)"));
        assert!(text.contains("forecast:    ~"));
    }
}
