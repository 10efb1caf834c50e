use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::duration::Duration;
use crate::error::VastError;

/// A point in playback time: either a clock duration or a fraction of the
/// total video duration.
///
/// The wire form is either the `Duration` clock text or `<integer>%`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
pub enum Offset {
    Time(Duration),
    /// Fraction of the video duration, in the range 0.0 to 1.0
    Percent(f32),
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Time(duration) => fmt::Display::fmt(duration, f),
            Offset::Percent(percent) => write!(f, "{}%", (percent * 100.0) as i32),
        }
    }
}

impl FromStr for Offset {
    type Err = VastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(prefix) = s.strip_suffix('%') {
            // Percentages are capped to the signed 8-bit range on the wire
            let percent: i8 = prefix
                .parse()
                .map_err(|_| VastError::InvalidOffset(s.to_string()))?;
            return Ok(Offset::Percent(percent as f32 / 100.0));
        }
        Ok(Offset::Time(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_percent_truncated() {
        assert_eq!(Offset::Percent(0.0).to_string(), "0%");
        assert_eq!(Offset::Percent(0.1).to_string(), "10%");
        assert_eq!(Offset::Percent(0.156).to_string(), "15%");
    }

    #[test]
    fn encodes_time_as_clock_text() {
        assert_eq!(Offset::Time(Duration::ZERO).to_string(), "00:00:00");
        assert_eq!(
            Offset::Time(Duration::from_secs(90)).to_string(),
            "00:01:30"
        );
    }

    #[test]
    fn decodes_percent() {
        assert_eq!("0%".parse::<Offset>().unwrap(), Offset::Percent(0.0));
        assert_eq!("10%".parse::<Offset>().unwrap(), Offset::Percent(0.1));
    }

    #[test]
    fn decodes_clock_text_as_time() {
        assert_eq!(
            "00:00:00".parse::<Offset>().unwrap(),
            Offset::Time(Duration::ZERO)
        );
        assert_eq!(
            "00:00:05.500".parse::<Offset>().unwrap(),
            Offset::Time(Duration::from_millis(5_500))
        );
    }

    #[test]
    fn rejects_non_numeric_percent() {
        let err = "abc%".parse::<Offset>().unwrap_err();
        assert_eq!(err.to_string(), "invalid offset: abc%");
        // Out of the signed 8-bit range
        assert!(matches!(
            "200%".parse::<Offset>(),
            Err(VastError::InvalidOffset(_))
        ));
    }

    #[test]
    fn percent_and_duration_errors_are_distinct() {
        assert!(matches!(
            "abc%".parse::<Offset>(),
            Err(VastError::InvalidOffset(_))
        ));
        assert!(matches!(
            "abc".parse::<Offset>(),
            Err(VastError::InvalidDuration(_))
        ));
    }
}
