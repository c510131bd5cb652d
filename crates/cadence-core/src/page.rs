//! Page renders.
//!
//! A [`PageRender`] is the value object produced by one call to
//! `Repository::list_page`: the windowed, sorted tracker rows with their
//! single-letter labels. Label→id and row→id lookups live *inside* the
//! render, so a mapping can never outlive the render that produced it.

use chrono::{Duration, NaiveDateTime};

use crate::fmt::format_date;
use crate::model::TrackerId;
use crate::parse::duration::format_duration_short;

/// Trackers per page; one per selection label `a..z`.
pub const PAGE_SIZE: usize = 26;

const LABELS: &[u8; PAGE_SIZE] = b"abcdefghijklmnopqrstuvwxyz";

const OPEN_CIRCLE: char = '○';
const CLOSED_CIRCLE: char = '⏺';

/// The label for the `index`-th row of a page (0-based).
#[must_use]
pub const fn label_for(index: usize) -> Option<char> {
    if index < PAGE_SIZE {
        Some(LABELS[index] as char)
    } else {
        None
    }
}

/// One listed tracker row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub label: char,
    /// 1-based row number within the page.
    pub row: usize,
    pub id: TrackerId,
    pub name: String,
    pub forecast: Option<NaiveDateTime>,
    /// η·spread, the half-width of the confidence window; `None` when the
    /// tracker has no forecast.
    pub window: Option<Duration>,
    pub latest: Option<NaiveDateTime>,
}

/// The result of rendering one page of the tracker list.
///
/// Valid only until the next render: any mutation, sort change, or page
/// change invalidates the ordering this render was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRender {
    /// 0-based index of the rendered page.
    pub page: usize,
    /// Total page count (at least 1).
    pub pages: usize,
    pub entries: Vec<PageEntry>,
}

impl PageRender {
    #[must_use]
    pub fn id_for_label(&self, label: char) -> Option<TrackerId> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.id)
    }

    /// Look up by 1-based row number.
    #[must_use]
    pub fn id_for_row(&self, row: usize) -> Option<TrackerId> {
        self.entries.iter().find(|e| e.row == row).map(|e| e.id)
    }

    /// Page indicator, e.g. `○ ○ ⏺ ○` for page 3 of 4.
    #[must_use]
    pub fn banner(&self) -> String {
        (0..self.pages)
            .map(|i| {
                if i == self.page {
                    CLOSED_CIRCLE
                } else {
                    OPEN_CIRCLE
                }
            })
            .map(String::from)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Formatted text: a column header followed by one row per tracker.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut lines = vec![" tag   forecast  window    latest    name".to_string()];
        for entry in &self.entries {
            let forecast = entry
                .forecast
                .map_or_else(|| format!("{:^8}", "~"), format_date);
            let latest = entry
                .latest
                .map_or_else(|| format!("{:^8}", "~"), format_date);
            let window = entry.window.filter(|w| *w != Duration::zero()).map_or_else(
                || format!("{:^8}", "~"),
                |w| format!("{:<8}", format_duration_short(w)),
            );
            lines.push(format!(
                " {}     {forecast}  {window}  {latest}  {}",
                entry.label, entry.name
            ));
        }
        lines.join("\n")
    }
}
