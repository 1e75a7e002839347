//! Daily time window for habits ("09:00 - 10:00").

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

const TIME_FORMAT: &str = "%H:%M";

/// The part of each day in which a habit is meant to be done.
///
/// Serialized as the human-readable form: an empty string for `AllDay`,
/// `"HH:MM - HH:MM"` for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeFrame {
    #[default]
    AllDay,
    Window { start: NaiveTime, end: NaiveTime },
}

impl TimeFrame {
    pub fn window(start: NaiveTime, end: NaiveTime) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::validation(
                "Time frame must end after it starts",
            ));
        }
        Ok(Self::Window { start, end })
    }

    /// Parse `"HH:MM - HH:MM"`. Blank input means the whole day.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::AllDay);
        }
        let (start, end) = input.split_once('-').ok_or_else(|| {
            DomainError::parse(format!("Expected 'HH:MM - HH:MM', got '{}'", input))
        })?;
        let start = NaiveTime::parse_from_str(start.trim(), TIME_FORMAT)
            .map_err(|e| DomainError::parse(format!("Invalid start time '{}': {}", start, e)))?;
        let end = NaiveTime::parse_from_str(end.trim(), TIME_FORMAT)
            .map_err(|e| DomainError::parse(format!("Invalid end time '{}': {}", end, e)))?;
        Self::window(start, end)
    }

    /// True once the window for the day has closed.
    pub fn has_ended(&self, time: NaiveTime) -> bool {
        match self {
            Self::AllDay => false,
            Self::Window { end, .. } => time > *end,
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllDay => Ok(()),
            Self::Window { start, end } => write!(
                f,
                "{} - {}",
                start.format(TIME_FORMAT),
                end.format(TIME_FORMAT)
            ),
        }
    }
}

impl TryFrom<String> for TimeFrame {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TimeFrame> for String {
    fn from(frame: TimeFrame) -> String {
        frame.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_window() {
        let frame = TimeFrame::parse("09:00 - 10:30").unwrap();
        assert_eq!(
            frame,
            TimeFrame::Window {
                start: t(9, 0),
                end: t(10, 30)
            }
        );
        assert_eq!(frame.to_string(), "09:00 - 10:30");
    }

    #[test]
    fn blank_is_all_day() {
        assert_eq!(TimeFrame::parse("  ").unwrap(), TimeFrame::AllDay);
        assert!(!TimeFrame::AllDay.has_ended(t(23, 59)));
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(TimeFrame::parse("10:00 - 09:00").is_err());
        assert!(TimeFrame::parse("nonsense").is_err());
    }

    #[test]
    fn window_ends_after_end_time() {
        let frame = TimeFrame::parse("09:00 - 10:00").unwrap();
        assert!(!frame.has_ended(t(10, 0)));
        assert!(frame.has_ended(t(10, 1)));
    }
}
