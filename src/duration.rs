use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VastError;

/// A VAST clock duration, rendered on the wire as `HH:MM:SS` with an
/// optional `.mmm` millisecond suffix.
///
/// The wire format allows unbounded hours; minutes and seconds are capped
/// at 59 and milliseconds at 999. The empty string and the literal token
/// `undefined` both decode to a zero duration, which is how ad servers
/// signal "duration unknown" without failing the whole document.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Duration(u64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub fn from_millis(millis: u64) -> Self {
        Duration(millis)
    }

    pub fn from_secs(secs: u64) -> Self {
        Duration(secs * 1_000)
    }

    pub fn from_hours(hours: u64) -> Self {
        Duration(hours * 3_600_000)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_secs(self) -> u64 {
        self.0 / 1_000
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3_600_000;
        let minutes = self.0 % 3_600_000 / 60_000;
        let seconds = self.0 % 60_000 / 1_000;
        let millis = self.0 % 1_000;
        if millis == 0 {
            write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
        } else {
            write!(f, "{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
        }
    }
}

impl FromStr for Duration {
    type Err = VastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("undefined") {
            return Ok(Duration::ZERO);
        }
        let invalid = || VastError::InvalidDuration(s.to_string());
        let parts: Vec<&str> = trimmed.splitn(3, ':').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let mut millis = 0u64;
        let mut seconds_field = parts[2];
        if let Some(dot) = seconds_field.find('.') {
            // A leading dot is not a valid fractional second
            if dot == 0 {
                return Err(invalid());
            }
            let fraction: i32 = seconds_field[dot + 1..].parse().map_err(|_| invalid())?;
            if !(0..=999).contains(&fraction) {
                return Err(invalid());
            }
            millis += fraction as u64;
            seconds_field = &seconds_field[..dot];
        }
        let hours: u64 = parts[0].parse().map_err(|_| invalid())?;
        let minutes: u64 = parts[1].parse().map_err(|_| invalid())?;
        let seconds: u64 = seconds_field.parse().map_err(|_| invalid())?;
        if minutes > 59 || seconds > 59 {
            return Err(invalid());
        }
        millis += ((hours * 60 + minutes) * 60 + seconds) * 1_000;
        Ok(Duration(millis))
    }
}
