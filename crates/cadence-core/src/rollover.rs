//! Day-rollover detection.
//!
//! The shell's periodic tick (or a one-shot CLI startup) feeds the current
//! date into [`DayRollover::observe`]; it reports `true` at most once per
//! calendar-day transition so the backup/rotation collaborator fires exactly
//! once per day. The caller serializes the observation with repository
//! mutations; this type carries no locking of its own.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayRollover {
    last: Option<NaiveDate>,
}

impl DayRollover {
    #[must_use]
    pub const fn new(last: Option<NaiveDate>) -> Self {
        Self { last }
    }

    /// The most recently observed date.
    #[must_use]
    pub const fn last(&self) -> Option<NaiveDate> {
        self.last
    }

    /// Record `today`; returns `true` exactly when the date advanced past
    /// the previously observed one. The first observation ever is treated
    /// as a transition.
    pub fn observe(&mut self, today: NaiveDate) -> bool {
        let fired = match self.last {
            Some(last) => today > last,
            None => true,
        };
        if fired {
            self.last = Some(today);
        }
        fired
    }
}
