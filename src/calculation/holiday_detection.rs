//! Public holiday detection.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, HolidayCalendar};

/// Whether a shift falls on a public holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayDetection {
    /// True if the clock-in date is in the calendar.
    pub is_holiday: bool,
    /// The audit step recording this detection.
    pub audit_step: AuditStep,
}

/// Detects whether a shift is a public holiday shift.
///
/// Only the civil date of `clock_in` is consulted; a shift that starts the
/// evening before a holiday and runs into it is not a holiday shift.
///
/// # Example
///
/// ```
/// use chrono::NaiveDateTime;
/// use payroll_engine::calculation::detect_holiday;
/// use payroll_engine::models::HolidayCalendar;
///
/// let calendar = HolidayCalendar::parse("2026-01-01\n").unwrap();
/// let clock_in = NaiveDateTime::parse_from_str("2026-01-01 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
///
/// assert!(detect_holiday(clock_in, &calendar, 1).is_holiday);
/// ```
pub fn detect_holiday(
    clock_in: NaiveDateTime,
    calendar: &HolidayCalendar,
    step_number: u32,
) -> HolidayDetection {
    let date = clock_in.date();
    let is_holiday = calendar.is_holiday(date);

    let reasoning = if is_holiday {
        format!("{} is in the holiday calendar", date)
    } else {
        format!("{} is not in the holiday calendar", date)
    };

    HolidayDetection {
        is_holiday,
        audit_step: AuditStep {
            step_number,
            rule_id: "holiday_detection".to_string(),
            rule_name: "Public Holiday Detection".to_string(),
            input: serde_json::json!({
                "clock_in": clock_in.to_string(),
                "date": date.to_string(),
                "calendar_size": calendar.len()
            }),
            output: serde_json::json!({ "is_holiday": is_holiday }),
            reasoning,
        },
    }
}
