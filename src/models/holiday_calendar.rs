//! Public holiday calendar.
//!
//! This module contains the [`HolidayCalendar`] type: a set of civil dates with
//! no time-of-day or timezone component.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The date format of calendar entries.
pub const HOLIDAY_DATE_FORMAT: &str = "%Y-%m-%d";

/// A set of public holiday dates.
///
/// Blank lines are ignored when parsing, duplicates collapse into one entry,
/// and any other line that is not a `YYYY-MM-DD` date rejects the whole
/// calendar.
///
/// # Example
///
/// ```
/// use payroll_engine::models::HolidayCalendar;
/// use chrono::NaiveDate;
///
/// let calendar = HolidayCalendar::parse("2026-01-01\n\n2026-12-25\n").unwrap();
/// assert_eq!(calendar.len(), 2);
/// assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2026, 12, 25).unwrap()));
/// assert!(!calendar.is_holiday(NaiveDate::from_ymd_opt(2026, 12, 24).unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Creates an empty calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a calendar from text, one date per line.
    pub fn parse(text: &str) -> EngineResult<Self> {
        Self::from_lines(text.lines())
    }

    /// Builds a calendar from a sequence of date strings.
    ///
    /// Line numbers in errors are 1-based positions in the sequence.
    pub fn from_lines<I, S>(lines: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dates = BTreeSet::new();

        for (index, line) in lines.into_iter().enumerate() {
            let entry = line.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let date = NaiveDate::parse_from_str(entry, HOLIDAY_DATE_FORMAT).map_err(|_| {
                EngineError::MalformedHolidayEntry {
                    line: index + 1,
                    value: entry.to_string(),
                }
            })?;
            dates.insert(date);
        }

        Ok(Self { dates })
    }

    /// Returns true if the date is a public holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Adds a date. Returns false if it was already present.
    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    /// Removes a date. Returns false if it was not present.
    pub fn remove(&mut self, date: NaiveDate) -> bool {
        self.dates.remove(&date)
    }

    /// Returns the number of distinct dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true if the calendar has no dates.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Iterates the dates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }
}

impl FromIterator<NaiveDate> for HolidayCalendar {
    fn from_iter<T: IntoIterator<Item = NaiveDate>>(iter: T) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}
