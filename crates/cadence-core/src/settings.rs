//! Repository-wide settings.
//!
//! Four keys: `ampm` (12-hour display), `yearfirst` / `dayfirst`
//! (ambiguous-date parsing), and `eta` (the confidence multiplier η that
//! scales spread into the early/late forecast window).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::parse::instant::DateParsePrefs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display 12-hour times with am/pm when true, 24-hour times otherwise.
    pub ampm: bool,
    /// When parsing ambiguous dates, assume the year comes first.
    pub yearfirst: bool,
    /// When parsing ambiguous dates, assume the day precedes the month.
    pub dayfirst: bool,
    /// Multiple of spread used for the early-to-late confidence interval.
    pub eta: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ampm: true,
            yearfirst: true,
            dayfirst: false,
            eta: 2,
        }
    }
}

/// The recognized settings keys. `η` is accepted as an alias for `eta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Ampm,
    Yearfirst,
    Dayfirst,
    Eta,
}

impl SettingKey {
    pub const ALL: [Self; 4] = [Self::Ampm, Self::Yearfirst, Self::Dayfirst, Self::Eta];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Ampm => "ampm",
            Self::Yearfirst => "yearfirst",
            Self::Dayfirst => "dayfirst",
            Self::Eta => "eta",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ampm" => Ok(Self::Ampm),
            "yearfirst" => Ok(Self::Yearfirst),
            "dayfirst" => Ok(Self::Dayfirst),
            "eta" | "η" => Ok(Self::Eta),
            _ => Err(CoreError::UnknownSetting { key: s.to_string() }),
        }
    }
}

fn parse_bool(key: SettingKey, value: &str) -> Result<bool, CoreError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(CoreError::InvalidFormat {
            input: value.to_string(),
            reason: format!("'{key}' takes true or false"),
        }),
    }
}

impl Settings {
    /// Current value of `key`, rendered as text.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::Ampm => self.ampm.to_string(),
            SettingKey::Yearfirst => self.yearfirst.to_string(),
            SettingKey::Dayfirst => self.dayfirst.to_string(),
            SettingKey::Eta => self.eta.to_string(),
        }
    }

    /// Set `key` from its text form. Fails with `InvalidFormat` when the
    /// value does not parse; the settings are unchanged on failure.
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<(), CoreError> {
        match key {
            SettingKey::Ampm => self.ampm = parse_bool(key, value)?,
            SettingKey::Yearfirst => self.yearfirst = parse_bool(key, value)?,
            SettingKey::Dayfirst => self.dayfirst = parse_bool(key, value)?,
            SettingKey::Eta => {
                self.eta = value
                    .trim()
                    .parse()
                    .map_err(|_| CoreError::InvalidFormat {
                        input: value.to_string(),
                        reason: "'eta' takes a non-negative integer".to_string(),
                    })?;
            }
        }
        Ok(())
    }

    /// The ambiguous-date parsing preferences for the instant parser.
    #[must_use]
    pub const fn date_prefs(&self) -> DateParsePrefs {
        DateParsePrefs {
            yearfirst: self.yearfirst,
            dayfirst: self.dayfirst,
        }
    }
}
