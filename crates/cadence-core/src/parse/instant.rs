//! Free-text instant parsing.
//!
//! Accepts the literal token `now`, a date (`2025-03-01`, `25-3-1`,
//! `3/5/2025`, ...), a time (`8:30`, `8:30pm` — applied to today), or a date
//! followed by a time (space- or `T`-separated). Ambiguous all-numeric dates
//! are resolved with the repository's `yearfirst` / `dayfirst` preferences.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::CoreError;

/// Ambiguous-date resolution preferences, taken from the settings map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParsePrefs {
    /// Assume the year comes first in an ambiguous all-numeric date.
    pub yearfirst: bool,
    /// Assume the day precedes the month in the remaining two fields.
    pub dayfirst: bool,
}

impl Default for DateParsePrefs {
    fn default() -> Self {
        Self {
            yearfirst: true,
            dayfirst: false,
        }
    }
}

fn invalid(input: &str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidFormat {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Two-digit years pivot at 70: `69 -> 2069`, `70 -> 1970`.
const fn expand_year(raw: u32, digits: usize) -> i32 {
    #[allow(clippy::cast_possible_wrap)]
    let raw = raw as i32;
    if digits > 2 {
        raw
    } else if raw < 70 {
        2000 + raw
    } else {
        1900 + raw
    }
}

struct DateField {
    value: u32,
    digits: usize,
}

impl DateField {
    /// A field that can only be a year (four digits, or out of day range).
    const fn must_be_year(&self) -> bool {
        self.digits >= 4 || self.value > 31
    }
}

fn split_date(token: &str, input: &str) -> Result<Vec<DateField>, CoreError> {
    token
        .split(['-', '/', '.'])
        .map(|part| {
            let value: u32 = part
                .parse()
                .map_err(|_| invalid(input, format!("invalid date field '{part}'")))?;
            Ok(DateField {
                value,
                digits: part.len(),
            })
        })
        .collect()
}

fn resolve_date(
    fields: &[DateField],
    prefs: DateParsePrefs,
    today: NaiveDate,
    input: &str,
) -> Result<NaiveDate, CoreError> {
    let (year, month, day) = match fields {
        [a, b] => {
            // Month/day (or day/month) of the current year.
            let (m, d) = if prefs.dayfirst {
                (b.value, a.value)
            } else {
                (a.value, b.value)
            };
            (chrono::Datelike::year(&today), m, d)
        }
        [a, b, c] => {
            let year_first = a.must_be_year() || (prefs.yearfirst && !c.must_be_year());
            if year_first {
                let (m, d) = if prefs.dayfirst {
                    (c.value, b.value)
                } else {
                    (b.value, c.value)
                };
                (expand_year(a.value, a.digits), m, d)
            } else {
                let (m, d) = if prefs.dayfirst {
                    (b.value, a.value)
                } else {
                    (a.value, b.value)
                };
                (expand_year(c.value, c.digits), m, d)
            }
        }
        _ => return Err(invalid(input, "expected 2 or 3 date fields")),
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| invalid(input, format!("invalid calendar date {year}-{month}-{day}")))
}

fn parse_time(token: &str, input: &str) -> Result<NaiveTime, CoreError> {
    let lower = token.to_ascii_lowercase();
    let (digits, meridiem) = if let Some(stripped) = lower.strip_suffix("am") {
        (stripped.trim_end(), Some(false))
    } else if let Some(stripped) = lower.strip_suffix("pm") {
        (stripped.trim_end(), Some(true))
    } else {
        (lower.as_str(), None)
    };

    let fields: Vec<u32> = digits
        .split(':')
        .map(|part| {
            part.parse()
                .map_err(|_| invalid(input, format!("invalid time field '{part}'")))
        })
        .collect::<Result<_, _>>()?;

    let (mut hour, minute, second) = match fields[..] {
        [h, m] => (h, m, 0),
        [h, m, s] => (h, m, s),
        _ => return Err(invalid(input, "expected HH:MM or HH:MM:SS")),
    };

    match meridiem {
        Some(true) if hour < 12 => hour += 12,
        Some(false) if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| invalid(input, format!("invalid time of day {hour}:{minute:02}")))
}

/// Parse a free-text instant. `now` is the caller's current wall-clock time,
/// passed explicitly so callers and tests control it.
pub fn parse_instant(
    input: &str,
    prefs: DateParsePrefs,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input, "empty datetime"));
    }
    if trimmed.eq_ignore_ascii_case("now") {
        return Ok(now);
    }

    // ISO 'T' separator: treat as the space form.
    let normalized = if trimmed.contains('T') && !trimmed.contains(' ') {
        trimmed.replacen('T', " ", 1)
    } else {
        trimmed.to_string()
    };

    let mut date_token: Option<String> = None;
    let mut time_token: Option<String> = None;
    for token in normalized.split_whitespace() {
        let lower = token.to_ascii_lowercase();
        if lower == "am" || lower == "pm" {
            // Detached meridiem belongs to the preceding time token.
            match time_token.as_mut() {
                Some(time) => time.push_str(&lower),
                None => return Err(invalid(input, "am/pm without a time")),
            }
        } else if token.contains(':') {
            if time_token.is_some() {
                return Err(invalid(input, "more than one time"));
            }
            time_token = Some(token.to_string());
        } else {
            if date_token.is_some() {
                return Err(invalid(input, "more than one date"));
            }
            date_token = Some(token.to_string());
        }
    }

    let date = match &date_token {
        Some(token) => resolve_date(&split_date(token, input)?, prefs, now.date(), input)?,
        None => now.date(),
    };
    let time = match &time_token {
        Some(token) => parse_time(token, input)?,
        None => NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default(),
    };

    if date_token.is_none() && time_token.is_none() {
        return Err(invalid(input, "unrecognized datetime"));
    }

    Ok(NaiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::{DateParsePrefs, parse_instant};
    use chrono::{NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn ymd_hm(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    const YF: DateParsePrefs = DateParsePrefs {
        yearfirst: true,
        dayfirst: false,
    };
    const MF: DateParsePrefs = DateParsePrefs {
        yearfirst: false,
        dayfirst: false,
    };
    const DF: DateParsePrefs = DateParsePrefs {
        yearfirst: false,
        dayfirst: true,
    };

    #[test]
    fn literal_now() {
        assert_eq!(parse_instant("now", YF, now()).unwrap(), now());
        assert_eq!(parse_instant(" NOW ", YF, now()).unwrap(), now());
    }

    #[test]
    fn iso_date_and_time() {
        assert_eq!(
            parse_instant("2025-03-01 08:30", YF, now()).unwrap(),
            ymd_hm(2025, 3, 1, 8, 30)
        );
        assert_eq!(
            parse_instant("2025-03-01T08:30", YF, now()).unwrap(),
            ymd_hm(2025, 3, 1, 8, 30)
        );
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(
            parse_instant("2025-03-01", YF, now()).unwrap(),
            ymd_hm(2025, 3, 1, 0, 0)
        );
    }

    #[test]
    fn time_only_is_today() {
        assert_eq!(
            parse_instant("8:05", YF, now()).unwrap(),
            ymd_hm(2025, 6, 15, 8, 5)
        );
        assert_eq!(
            parse_instant("8:05pm", YF, now()).unwrap(),
            ymd_hm(2025, 6, 15, 20, 5)
        );
        assert_eq!(
            parse_instant("12:01 AM", YF, now()).unwrap(),
            ymd_hm(2025, 6, 15, 0, 1)
        );
    }

    #[test]
    fn ambiguous_date_honors_yearfirst_and_dayfirst() {
        // 01-02-03 under each preference combination.
        assert_eq!(
            parse_instant("01-02-03", YF, now()).unwrap(),
            ymd_hm(2001, 2, 3, 0, 0)
        );
        assert_eq!(
            parse_instant("01-02-03", MF, now()).unwrap(),
            ymd_hm(2003, 1, 2, 0, 0)
        );
        assert_eq!(
            parse_instant("01-02-03", DF, now()).unwrap(),
            ymd_hm(2003, 2, 1, 0, 0)
        );
        assert_eq!(
            parse_instant(
                "01-02-03",
                DateParsePrefs {
                    yearfirst: true,
                    dayfirst: true
                },
                now()
            )
            .unwrap(),
            ymd_hm(2001, 3, 2, 0, 0)
        );
    }

    #[test]
    fn four_digit_year_wins_over_preferences() {
        assert_eq!(
            parse_instant("3/5/2025", YF, now()).unwrap(),
            ymd_hm(2025, 3, 5, 0, 0)
        );
        assert_eq!(
            parse_instant("3/5/2025", DF, now()).unwrap(),
            ymd_hm(2025, 5, 3, 0, 0)
        );
    }

    #[test]
    fn month_day_of_current_year() {
        assert_eq!(
            parse_instant("3/5", MF, now()).unwrap(),
            ymd_hm(2025, 3, 5, 0, 0)
        );
        assert_eq!(
            parse_instant("3/5", DF, now()).unwrap(),
            ymd_hm(2025, 5, 3, 0, 0)
        );
    }

    #[test]
    fn rejects_nonsense() {
        for bad in ["", "tomorrow", "2025-13-40", "25:99", "1-2-3-4", "8:00 8:00"] {
            assert!(parse_instant(bad, YF, now()).is_err(), "accepted {bad:?}");
        }
    }
}
