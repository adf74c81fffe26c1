//! Storage Keys
//!
//! Every event is stored as its own object under a path derived from the
//! observed capture time:
//!
//! ```text
//! KeyLayout::Clock   2024/01/02/03:04:05.000006   (default)
//! KeyLayout::Nested  2024/01/02/03/04/05.000006
//! ```
//!
//! Every component has a fixed width (year 4, fraction 6, everything else
//! 2), so lexicographic order equals chronological order at microsecond
//! resolution. Two events captured in the same microsecond map to the same
//! key and the later write replaces the earlier one.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Path layout for storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyLayout {
    /// `YYYY/MM/DD/HH:MM:SS.ffffff`
    #[default]
    Clock,
    /// `YYYY/MM/DD/HH/MM/SS.ffffff`
    Nested,
}

impl KeyLayout {
    /// Parse from a string (case-insensitive).
    pub fn from_str_config(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "clock" => Ok(KeyLayout::Clock),
            "nested" => Ok(KeyLayout::Nested),
            other => Err(CoreError::InvalidLayout(other.to_string())),
        }
    }
}

/// Hierarchical, time-sortable object path for one event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn from_time(time: &DateTime<Utc>) -> Self {
        Self::with_layout(time, KeyLayout::Clock)
    }

    pub fn with_layout(time: &DateTime<Utc>, layout: KeyLayout) -> Self {
        // chrono encodes a leap second as nanos >= 1e9; pin it to the
        // last microsecond of the second to keep the fraction six digits.
        let micros = time.timestamp_subsec_micros().min(999_999);
        let key = match layout {
            KeyLayout::Clock => format!(
                "{:04}/{:02}/{:02}/{:02}:{:02}:{:02}.{:06}",
                time.year(),
                time.month(),
                time.day(),
                time.hour(),
                time.minute(),
                time.second(),
                micros
            ),
            KeyLayout::Nested => format!(
                "{:04}/{:02}/{:02}/{:02}/{:02}/{:02}.{:06}",
                time.year(),
                time.month(),
                time.day(),
                time.hour(),
                time.minute(),
                time.second(),
                micros
            ),
        };
        StorageKey(key)
    }

    /// Decode a key in either layout back into its capture time.
    pub fn parse(key: &str) -> Result<DateTime<Utc>> {
        let invalid = || CoreError::InvalidKey(key.to_string());
        let parts: Vec<&str> = key.split('/').collect();

        let (date, hms, fraction) = match parts.as_slice() {
            [y, m, d, clock] => {
                let (hms, fraction) = clock.split_once('.').ok_or_else(invalid)?;
                let hms: Vec<&str> = hms.split(':').collect();
                if hms.len() != 3 {
                    return Err(invalid());
                }
                ([*y, *m, *d], [hms[0], hms[1], hms[2]], fraction)
            }
            [y, m, d, h, min, sec] => {
                let (sec, fraction) = sec.split_once('.').ok_or_else(invalid)?;
                ([*y, *m, *d], [*h, *min, sec], fraction)
            }
            _ => return Err(invalid()),
        };

        let year = fixed_width(date[0], 4).ok_or_else(invalid)?;
        let month = fixed_width(date[1], 2).ok_or_else(invalid)?;
        let day = fixed_width(date[2], 2).ok_or_else(invalid)?;
        let hour = fixed_width(hms[0], 2).ok_or_else(invalid)?;
        let minute = fixed_width(hms[1], 2).ok_or_else(invalid)?;
        let second = fixed_width(hms[2], 2).ok_or_else(invalid)?;
        let micros = fixed_width(fraction, 6).ok_or_else(invalid)?;

        let naive = NaiveDate::from_ymd_opt(year as i32, month, day)
            .and_then(|d| d.and_hms_micro_opt(hour, minute, second, micros))
            .ok_or_else(invalid)?;
        Ok(Utc.from_utc_datetime(&naive))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn fixed_width(component: &str, width: usize) -> Option<u32> {
    if component.len() != width || !component.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    component.parse().ok()
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<StorageKey> for String {
    fn from(key: StorageKey) -> Self {
        key.0
    }
}
