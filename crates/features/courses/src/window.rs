//! Time windows deciding whether a course, or its registration, is open.

use crate::error::CourseError;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Date layouts accepted for window bounds, most precise first.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive period of local time.
///
/// Course files describe it as `true`/absent (always open), `false` (never open), or
/// `"start/end"` where either bound may be left blank. A single date without a slash
/// opens the window from that date on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessibleTime {
    #[default]
    Always,
    Never,
    Between { start: Option<NaiveDateTime>, end: Option<NaiveDateTime> },
}

impl AccessibleTime {
    /// Reads a window from the raw course-file value.
    ///
    /// # Errors
    /// Returns [`CourseError::InvalidWindow`] for values that are neither booleans nor
    /// strings, and for strings holding unparseable dates.
    pub fn from_value(value: Option<&Value>) -> Result<Self, CourseError> {
        match value {
            None | Some(Value::Null | Value::Bool(true)) => Ok(Self::Always),
            Some(Value::Bool(false)) => Ok(Self::Never),
            Some(Value::String(raw)) => raw.parse(),
            Some(other) => Err(CourseError::InvalidWindow {
                message: format!("Expected a boolean or a date range, got {other}").into(),
                context: None,
            }),
        }
    }

    /// True if the window contains the current local time.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open_at(Local::now().naive_local())
    }

    /// True if the window contains `when`.
    #[must_use]
    pub fn is_open_at(&self, when: NaiveDateTime) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Between { start, end } => {
                start.is_none_or(|start| start <= when) && end.is_none_or(|end| when <= end)
            },
        }
    }
}

impl FromStr for AccessibleTime {
    type Err = CourseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::Always);
        }

        let (start, end) = raw.split_once('/').unwrap_or((raw, ""));
        Ok(Self::Between { start: parse_bound(start)?, end: parse_bound(end)? })
    }
}

impl fmt::Display for AccessibleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::Never => f.write_str("never"),
            Self::Between { start, end } => {
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                f.write_str("/")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                Ok(())
            },
        }
    }
}

/// Parses one side of a window; a blank side is unbounded.
fn parse_bound(raw: &str) -> Result<Option<NaiveDateTime>, CourseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(parsed));
        }
    }

    // "%Y-%m-%d %H": chrono refuses a time without minutes.
    if let Some((date, hour)) = raw.split_once(' ')
        && let (Ok(date), Ok(hour)) = (NaiveDate::parse_from_str(date, DATE_FORMAT), hour.parse())
        && let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0)
    {
        return Ok(Some(date.and_time(time)));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Ok(Some(date.and_time(NaiveTime::MIN)));
    }

    Err(CourseError::InvalidWindow {
        message: format!("Unknown date format '{raw}'").into(),
        context: None,
    })
}
