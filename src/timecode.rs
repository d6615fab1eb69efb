use std::fmt;
use std::str::FromStr;

use crate::errors::SubtitleError;

// @module: Conversion between fractional seconds and SRT timecodes

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// A subtitle timestamp in `HH:MM:SS,mmm` form.
///
/// Seconds (as `f64`) are the canonical unit in the rest of the crate; a
/// `Timecode` only exists at the subtitle text boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timecode {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
    pub milliseconds: u16,
}

impl Timecode {
    /// Build a timecode from a whole number of milliseconds
    pub fn from_millis(total_ms: u64) -> Self {
        Self {
            hours: total_ms / MS_PER_HOUR,
            minutes: ((total_ms % MS_PER_HOUR) / MS_PER_MINUTE) as u8,
            seconds: ((total_ms % MS_PER_MINUTE) / MS_PER_SECOND) as u8,
            milliseconds: (total_ms % MS_PER_SECOND) as u16,
        }
    }

    /// Total length in milliseconds
    pub fn total_millis(&self) -> u64 {
        self.hours * MS_PER_HOUR
            + self.minutes as u64 * MS_PER_MINUTE
            + self.seconds as u64 * MS_PER_SECOND
            + self.milliseconds as u64
    }
}

/// Convert fractional seconds into a timecode.
///
/// The value is rounded half-up to the nearest millisecond before being split
/// into hours, minutes, seconds and milliseconds, so `2.3` becomes
/// `00:00:02,300` rather than the truncated `00:00:02,299`.
pub fn to_timecode(seconds: f64) -> Result<Timecode, SubtitleError> {
    if seconds.is_nan() {
        return Err(SubtitleError::invalid_time(seconds, "not a number"));
    }
    if seconds.is_infinite() {
        return Err(SubtitleError::invalid_time(seconds, "not finite"));
    }
    if seconds < 0.0 {
        return Err(SubtitleError::invalid_time(seconds, "negative time"));
    }

    let total_ms = (seconds * MS_PER_SECOND as f64).round() as u64;
    Ok(Timecode::from_millis(total_ms))
}

/// Convert a timecode back into fractional seconds
pub fn to_seconds(timecode: &Timecode) -> f64 {
    timecode.total_millis() as f64 / MS_PER_SECOND as f64
}

/// Parse a decimal seconds string such as `"3.2"` into a timecode
pub fn parse_seconds(raw: &str) -> Result<Timecode, SubtitleError> {
    let trimmed = raw.trim();
    let seconds: f64 = trimmed
        .parse()
        .map_err(|_| SubtitleError::invalid_time(trimmed, "not a decimal number of seconds"))?;
    to_timecode(seconds)
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            self.hours, self.minutes, self.seconds, self.milliseconds
        )
    }
}

impl FromStr for Timecode {
    type Err = SubtitleError;

    /// Parse `HH:MM:SS,mmm` (a `.` millisecond separator is accepted too)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let parts: Vec<&str> = raw.split(&[':', ',', '.'][..]).collect();
        if parts.len() != 4 {
            return Err(SubtitleError::invalid_time(raw, "expected HH:MM:SS,mmm"));
        }
        if parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
            return Err(SubtitleError::invalid_time(raw, "non-numeric timecode component"));
        }

        let number = |part: &str| {
            part.parse::<u64>()
                .map_err(|_| SubtitleError::invalid_time(raw, "timecode component out of range"))
        };
        let hours = number(parts[0])?;
        let minutes = number(parts[1])?;
        let seconds = number(parts[2])?;
        let millis = number(parts[3])?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 || parts[3].len() > 3 {
            return Err(SubtitleError::invalid_time(raw, "timecode component out of range"));
        }

        Ok(Timecode {
            hours,
            minutes: minutes as u8,
            seconds: seconds as u8,
            milliseconds: millis as u16,
        })
    }
}
