//! Working day counting for salaried employees.

use chrono::{Datelike, NaiveDate, Weekday};

/// The weekday that never counts as a working day.
pub const EXCLUDED_WEEKDAY: Weekday = Weekday::Tue;

/// Counts the working days in the calendar month containing `date`.
///
/// Every day of the month counts except those falling on
/// [`EXCLUDED_WEEKDAY`].
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::working_days_in_month;
///
/// // January 2026 has 31 days and 4 Tuesdays.
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// assert_eq!(working_days_in_month(date), 27);
///
/// // February 2026 has 28 days and 4 Tuesdays.
/// let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
/// assert_eq!(working_days_in_month(date), 24);
/// ```
pub fn working_days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .filter(|d| d.weekday() != EXCLUDED_WEEKDAY)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_thirty_one_day_month_with_four_tuesdays() {
        assert_eq!(working_days_in_month(date(2026, 1, 1)), 27);
        assert_eq!(working_days_in_month(date(2026, 1, 31)), 27);
    }

    #[test]
    fn test_thirty_one_day_month_with_five_tuesdays() {
        // March 2026: Tuesdays on 3, 10, 17, 24, 31
        assert_eq!(working_days_in_month(date(2026, 3, 12)), 26);
    }

    #[test]
    fn test_thirty_day_month() {
        // April 2026: Tuesdays on 7, 14, 21, 28
        assert_eq!(working_days_in_month(date(2026, 4, 30)), 26);
    }

    #[test]
    fn test_leap_february() {
        // February 2028: 29 days, Tuesdays on 1, 8, 15, 22, 29
        assert_eq!(working_days_in_month(date(2028, 2, 10)), 24);
    }

    #[test]
    fn test_december_does_not_run_into_next_year() {
        // December 2026: Tuesdays on 1, 8, 15, 22, 29
        assert_eq!(working_days_in_month(date(2026, 12, 31)), 26);
    }
}
