//! Derived forecast statistics.
//!
//! A [`Stats`] snapshot is always a pure function of a tracker's history plus
//! the repository-wide confidence multiplier η. It is cached on the tracker
//! purely for read efficiency and recomputed synchronously at the end of
//! every mutation, never rebuilt lazily on read.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::completion::Completion;

/// Direction of the most recent interval relative to the average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Flat => "→",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of everything derived from a completion history.
///
/// Fields that require at least one interval are `None` when the history has
/// fewer than two completions. `spread` is zero (not `None`) below two
/// intervals so callers can scale it without unwrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub intervals: Vec<Duration>,
    pub last_completion: Option<NaiveDateTime>,
    pub average: Option<Duration>,
    pub spread: Duration,
    pub next_expected: Option<NaiveDateTime>,
    pub early: Option<NaiveDateTime>,
    pub late: Option<NaiveDateTime>,
    pub trend: Option<Trend>,
}

impl Stats {
    /// The all-sentinel snapshot for an empty history.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            intervals: Vec::new(),
            last_completion: None,
            average: None,
            spread: Duration::zero(),
            next_expected: None,
            early: None,
            late: None,
            trend: None,
        }
    }

    /// Compute the snapshot for `history`, which must be ascending by instant.
    ///
    /// Interval `i` runs from completion `i`'s instant to completion `i+1`'s
    /// *adjusted* instant. `eta` scales the spread into the early/late
    /// confidence window.
    #[must_use]
    pub fn compute(history: &[Completion], eta: u32) -> Self {
        let mut stats = Self::empty();
        let Some(last) = history.last() else {
            return stats;
        };
        stats.last_completion = Some(last.at);

        stats.intervals = history
            .windows(2)
            .map(|pair| pair[1].adjusted() - pair[0].at)
            .collect();
        let count = stats.intervals.len();
        if count == 0 {
            return stats;
        }

        let average = if count == 1 {
            stats.intervals[0]
        } else {
            let total = stats
                .intervals
                .iter()
                .fold(Duration::zero(), |acc, iv| acc + *iv);
            total / i32::try_from(count).unwrap_or(i32::MAX)
        };
        stats.average = Some(average);

        if count >= 2 {
            let total_dev = stats.intervals.iter().fold(Duration::zero(), |acc, iv| {
                acc + if *iv < average {
                    average - *iv
                } else {
                    *iv - average
                }
            });
            stats.spread = total_dev / i32::try_from(count).unwrap_or(i32::MAX);
        }

        // Adjustments parse up to the full duration range, which is far wider
        // than the datetime range. Saturate rather than overflow.
        let next = saturating_add(last.at, average);
        let window = stats
            .spread
            .checked_mul(i32::try_from(eta).unwrap_or(i32::MAX))
            .unwrap_or(Duration::MAX);
        stats.next_expected = Some(next);
        stats.early = Some(saturating_sub(next, window));
        stats.late = Some(saturating_add(next, window));

        let last_interval = stats.intervals[count - 1];
        stats.trend = Some(match last_interval.cmp(&average) {
            Ordering::Greater => Trend::Up,
            Ordering::Less => Trend::Down,
            Ordering::Equal => Trend::Flat,
        });

        stats
    }
}

fn saturating_add(dt: NaiveDateTime, delta: Duration) -> NaiveDateTime {
    dt.checked_add_signed(delta)
        .unwrap_or(if delta < Duration::zero() {
            NaiveDateTime::MIN
        } else {
            NaiveDateTime::MAX
        })
}

fn saturating_sub(dt: NaiveDateTime, delta: Duration) -> NaiveDateTime {
    dt.checked_sub_signed(delta)
        .unwrap_or(if delta < Duration::zero() {
            NaiveDateTime::MAX
        } else {
            NaiveDateTime::MIN
        })
}
