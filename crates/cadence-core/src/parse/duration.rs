//! Signed duration parsing and formatting.
//!
//! The accepted grammar is a stream of `[+|-]<n><unit>` tokens where unit is
//! one of `d h m s` or the spelled-out `day(s) hour(s) minute(s) second(s)`
//! forms (with an optional space between the number and the word). Signed
//! amounts accumulate per unit, so `2d-3h5m` means two days minus three
//! hours plus five minutes.

use chrono::Duration;

use crate::error::CoreError;

fn invalid(input: &str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidFormat {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Parse a duration token stream. Fails with
/// [`CoreError::InvalidFormat`] when no token matches.
pub fn parse_duration(input: &str) -> Result<Duration, CoreError> {
    let s = input.trim();
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut matched = false;
    // Accumulated per-unit amounts: days, hours, minutes, seconds.
    let mut totals = [0_i64; 4];

    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let mut sign = 1_i64;
        match bytes[i] {
            b'+' => i += 1,
            b'-' => {
                sign = -1;
                i += 1;
            }
            _ => {}
        }

        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start {
            return Err(invalid(input, "expected a number"));
        }
        let amount: i64 = s[digits_start..i]
            .parse()
            .map_err(|_| invalid(input, "number too large"))?;

        // Spelled-out units may be separated from the number by one space.
        if i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        let unit_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let slot = match s[unit_start..i].to_ascii_lowercase().as_str() {
            "d" | "day" | "days" => 0,
            "h" | "hour" | "hours" => 1,
            "m" | "minute" | "minutes" => 2,
            "s" | "second" | "seconds" => 3,
            "" => return Err(invalid(input, "missing unit (d, h, m or s)")),
            other => return Err(invalid(input, format!("invalid unit '{other}'"))),
        };
        totals[slot] = totals[slot]
            .checked_add(sign * amount)
            .ok_or_else(|| invalid(input, "duration out of range"))?;
        matched = true;
    }

    if !matched {
        return Err(invalid(input, "no duration found"));
    }

    // Per-unit amounts can individually or jointly exceed the representable
    // duration range; reject instead of panicking.
    let mut total = Duration::try_days(totals[0])
        .ok_or_else(|| invalid(input, "duration out of range"))?;
    for part in [
        Duration::try_hours(totals[1]),
        Duration::try_minutes(totals[2]),
        Duration::try_seconds(totals[3]),
    ] {
        let part = part.ok_or_else(|| invalid(input, "duration out of range"))?;
        total = total
            .checked_add(&part)
            .ok_or_else(|| invalid(input, "duration out of range"))?;
    }
    Ok(total)
}

fn components(total_seconds: i64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = String::new();
    for (amount, unit) in [(days, 'd'), (hours, 'h'), (minutes, 'm'), (seconds, 's')] {
        if amount != 0 {
            parts.push_str(&amount.to_string());
            parts.push(unit);
        }
    }
    if parts.is_empty() {
        parts.push_str("0m");
    }
    parts
}

/// Signed rendering that round-trips through [`parse_duration`]:
/// `+1d21h5m`, `-10m`, `+0m`.
#[must_use]
pub fn format_duration(td: Duration) -> String {
    let total = td.num_seconds();
    let sign = if total >= 0 { '+' } else { '-' };
    format!("{sign}{}", components(total.abs()))
}

/// Unsigned, at most two leading components, for narrow list columns:
/// `1d21h`, `10m`, `0m`.
#[must_use]
pub fn format_duration_short(td: Duration) -> String {
    let full = components(td.num_seconds().abs());
    let mut out = String::new();
    let mut taken = 0;
    for ch in full.chars() {
        out.push(ch);
        if ch.is_ascii_alphabetic() {
            taken += 1;
            if taken == 2 {
                break;
            }
        }
    }
    out
}
