use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One recorded occurrence of a tracked event.
///
/// `at` is the instant the event was actually (or notionally) completed.
/// `adjust` is a signed offset applied to the *next* interval computation,
/// used to backdate a fictitious prior completion when bootstrapping an
/// expected interval for a new tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub at: NaiveDateTime,
    pub adjust: Duration,
}

impl Completion {
    #[must_use]
    pub const fn new(at: NaiveDateTime, adjust: Duration) -> Self {
        Self { at, adjust }
    }

    /// A completion with no backdating adjustment.
    #[must_use]
    pub const fn at(at: NaiveDateTime) -> Self {
        Self {
            at,
            adjust: Duration::zero(),
        }
    }

    /// The instant with the adjustment applied, used as the *end* of the
    /// interval that starts at the previous completion.
    ///
    /// Saturates at the representable datetime range.
    #[must_use]
    pub fn adjusted(&self) -> NaiveDateTime {
        self.at
            .checked_add_signed(self.adjust)
            .unwrap_or(if self.adjust < Duration::zero() {
                NaiveDateTime::MIN
            } else {
                NaiveDateTime::MAX
            })
    }
}

/// Persisted shape: `(instant, adjustment-seconds)`.
#[derive(Serialize, Deserialize)]
struct CompletionRepr(NaiveDateTime, i64);

impl Serialize for Completion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CompletionRepr(self.at, self.adjust.num_seconds()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Completion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let CompletionRepr(at, secs) = CompletionRepr::deserialize(deserializer)?;
        let adjust = Duration::try_seconds(secs)
            .ok_or_else(|| serde::de::Error::custom("completion adjustment out of range"))?;
        Ok(Self { at, adjust })
    }
}
