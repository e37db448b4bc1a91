//! Hourly rate derivation and regular/overtime splitting.
//!
//! Part-time employees are paid their stored hourly rate. Full-time employees
//! have their monthly salary spread across the working days of the shift's
//! month at eight hours a day.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, Employee, PayBasis};

use super::working_days::working_days_in_month;

/// Hours in a full-time working day, used to convert salary to a rate.
pub const HOURS_PER_WORKING_DAY: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// The effective hourly rate and hour split for one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSplitResult {
    /// The hourly rate applied to the shift.
    pub hourly_rate: Decimal,
    /// Hours up to the overtime threshold.
    pub regular_hours: Decimal,
    /// Hours beyond the overtime threshold.
    pub overtime_hours: Decimal,
    /// The threshold that was applied.
    pub overtime_threshold: Decimal,
    /// Working days used for a salary conversion; `None` for hourly employees.
    pub working_days: Option<u32>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Splits adjusted hours at a threshold into `(regular, overtime)`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::split_hours;
/// use rust_decimal::Decimal;
///
/// let (regular, overtime) = split_hours(Decimal::new(10, 0), Decimal::new(8, 0));
/// assert_eq!(regular, Decimal::new(8, 0));
/// assert_eq!(overtime, Decimal::new(2, 0));
/// ```
pub fn split_hours(adjusted_hours: Decimal, threshold: Decimal) -> (Decimal, Decimal) {
    let regular = adjusted_hours.min(threshold).max(Decimal::ZERO);
    let overtime = (adjusted_hours - threshold).max(Decimal::ZERO);
    (regular, overtime)
}

/// Derives the hourly rate and regular/overtime split for a shift.
///
/// # Arguments
///
/// * `employee` - The employee who worked the shift
/// * `adjusted_hours` - Hours after break deduction and rounding
/// * `clock_in` - Shift start; its month decides the salary conversion
/// * `default_threshold` - Threshold for employees without one
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use chrono::NaiveDateTime;
/// use payroll_engine::calculation::rate_and_split;
/// use payroll_engine::config::DEFAULT_OVERTIME_THRESHOLD;
/// use payroll_engine::models::{Employee, PayBasis};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     name: "Sam".to_string(),
///     pay_basis: PayBasis::FullTime { base_salary: Decimal::new(2600, 0) },
///     overtime_threshold: None,
/// };
/// let clock_in = NaiveDateTime::parse_from_str("2026-01-05 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
///
/// let result = rate_and_split(&employee, Decimal::new(9, 0), clock_in, DEFAULT_OVERTIME_THRESHOLD, 1);
/// assert_eq!(result.working_days, Some(27));
/// assert_eq!(result.hourly_rate.round_dp(2), Decimal::new(1204, 2));
/// assert_eq!(result.overtime_hours, Decimal::ONE);
/// ```
pub fn rate_and_split(
    employee: &Employee,
    adjusted_hours: Decimal,
    clock_in: NaiveDateTime,
    default_threshold: Decimal,
    step_number: u32,
) -> RateSplitResult {
    let threshold = employee.overtime_threshold_or(default_threshold);
    let (regular_hours, overtime_hours) = split_hours(adjusted_hours, threshold);

    let (hourly_rate, working_days, rate_reasoning) = match employee.pay_basis {
        PayBasis::PartTime { hourly_rate } => (
            hourly_rate,
            None,
            format!("part-time stored rate ${}", hourly_rate.normalize()),
        ),
        PayBasis::FullTime { base_salary } => {
            let days = working_days_in_month(clock_in.date());
            let rate = base_salary / (Decimal::from(days) * HOURS_PER_WORKING_DAY);
            (
                rate,
                Some(days),
                format!(
                    "full-time salary ${} / ({} working days x {}h) = ${}",
                    base_salary.normalize(),
                    days,
                    HOURS_PER_WORKING_DAY,
                    rate.round_dp(4).normalize()
                ),
            )
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "rate_and_split".to_string(),
        rule_name: "Hourly Rate and Overtime Split".to_string(),
        input: serde_json::json!({
            "status": employee.status(),
            "adjusted_hours": adjusted_hours.normalize().to_string(),
            "overtime_threshold": threshold.normalize().to_string(),
            "month": clock_in.format("%Y-%m").to_string()
        }),
        output: serde_json::json!({
            "hourly_rate": hourly_rate.normalize().to_string(),
            "working_days": working_days,
            "regular_hours": regular_hours.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string()
        }),
        reasoning: format!(
            "{}; {} hours split at {} hour threshold into {} regular and {} overtime",
            rate_reasoning,
            adjusted_hours.normalize(),
            threshold.normalize(),
            regular_hours.normalize(),
            overtime_hours.normalize()
        ),
    };

    RateSplitResult {
        hourly_rate,
        regular_hours,
        overtime_hours,
        overtime_threshold: threshold,
        working_days,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_OVERTIME_THRESHOLD;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn part_time(rate: &str, threshold: Option<&str>) -> Employee {
        Employee {
            name: "Alex".to_string(),
            pay_basis: PayBasis::PartTime {
                hourly_rate: dec(rate),
            },
            overtime_threshold: threshold.map(dec),
        }
    }

    fn full_time(salary: &str) -> Employee {
        Employee {
            name: "Sam".to_string(),
            pay_basis: PayBasis::FullTime {
                base_salary: dec(salary),
            },
            overtime_threshold: None,
        }
    }

    #[test]
    fn test_split_at_threshold_has_no_overtime() {
        assert_eq!(split_hours(dec("8"), dec("8")), (dec("8"), dec("0")));
    }

    #[test]
    fn test_split_under_threshold() {
        assert_eq!(split_hours(dec("6.5"), dec("8")), (dec("6.5"), dec("0")));
    }

    #[test]
    fn test_zero_threshold_makes_everything_overtime() {
        assert_eq!(split_hours(dec("5"), dec("0")), (dec("0"), dec("5")));
    }

    #[test]
    fn test_part_time_uses_stored_rate() {
        let result = rate_and_split(
            &part_time("10", None),
            dec("8"),
            make_datetime("2026-01-05 09:00:00"),
            DEFAULT_OVERTIME_THRESHOLD,
            2,
        );
        assert_eq!(result.hourly_rate, dec("10"));
        assert_eq!(result.working_days, None);
        assert_eq!(result.regular_hours, dec("8"));
        assert_eq!(result.overtime_hours, dec("0"));
        assert_eq!(result.audit_step.step_number, 2);
    }

    #[test]
    fn test_employee_threshold_overrides_default() {
        let result = rate_and_split(
            &part_time("10", Some("6")),
            dec("8"),
            make_datetime("2026-01-05 09:00:00"),
            DEFAULT_OVERTIME_THRESHOLD,
            1,
        );
        assert_eq!(result.overtime_threshold, dec("6"));
        assert_eq!(result.regular_hours, dec("6"));
        assert_eq!(result.overtime_hours, dec("2"));
    }

    #[test]
    fn test_full_time_rate_uses_working_days_of_shift_month() {
        let result = rate_and_split(
            &full_time("2600"),
            dec("9"),
            make_datetime("2026-01-20 09:00:00"),
            DEFAULT_OVERTIME_THRESHOLD,
            1,
        );
        assert_eq!(result.working_days, Some(27));
        assert_eq!(result.hourly_rate, dec("2600") / dec("216"));
        assert_eq!(result.hourly_rate.round_dp(2), dec("12.04"));
    }

    #[test]
    fn test_full_time_rate_changes_with_month() {
        // February 2026 has 24 working days: 2496 / 192 = 13
        let result = rate_and_split(
            &full_time("2496"),
            dec("8"),
            make_datetime("2026-02-10 09:00:00"),
            DEFAULT_OVERTIME_THRESHOLD,
            1,
        );
        assert_eq!(result.working_days, Some(24));
        assert_eq!(result.hourly_rate, dec("13"));
    }

    #[test]
    fn test_regular_plus_overtime_equals_adjusted() {
        for hours in ["0", "3.5", "8", "8.5", "14"] {
            let result = rate_and_split(
                &part_time("10", None),
                dec(hours),
                make_datetime("2026-01-05 09:00:00"),
                DEFAULT_OVERTIME_THRESHOLD,
                1,
            );
            assert_eq!(result.regular_hours + result.overtime_hours, dec(hours));
        }
    }
}
