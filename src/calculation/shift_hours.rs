//! Adjusted hours calculation functionality.
//!
//! This module converts a raw clock-in/clock-out pair into adjusted worked
//! hours by applying the configured break deduction and rounding rule.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::{RoundingMode, ShiftHoursPolicy};
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

/// The result of converting a raw shift duration into adjusted hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustedHoursResult {
    /// Raw duration in hours, before any deduction.
    pub raw_hours: Decimal,
    /// The break deducted (zero for exempt shifts).
    pub break_deduction: Decimal,
    /// Worked hours after deduction and rounding, never negative.
    pub adjusted_hours: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

impl RoundingMode {
    /// Applies the rounding rule to a number of hours.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::RoundingMode;
    /// use rust_decimal::Decimal;
    ///
    /// let hours = Decimal::new(775, 2); // 7.75
    /// assert_eq!(RoundingMode::FloorHalf.apply(hours), Decimal::new(75, 1));
    /// assert_eq!(RoundingMode::NearestHalf.apply(hours), Decimal::new(8, 0));
    /// assert_eq!(RoundingMode::FloorHour.apply(hours), Decimal::new(7, 0));
    /// ```
    pub fn apply(self, hours: Decimal) -> Decimal {
        match self {
            RoundingMode::FloorHalf => (hours * Decimal::TWO).floor() / Decimal::TWO,
            RoundingMode::NearestHalf => {
                (hours * Decimal::TWO)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    / Decimal::TWO
            }
            RoundingMode::FloorHour => hours.floor(),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            RoundingMode::FloorHalf => "floor_half",
            RoundingMode::NearestHalf => "nearest_half",
            RoundingMode::FloorHour => "floor_hour",
        }
    }
}

impl ShiftHoursPolicy {
    /// Returns the break deducted from a shift of `raw_hours`.
    ///
    /// Shifts at or below the eligibility threshold get no break; otherwise
    /// the first matching tier decides.
    pub fn break_deduction(&self, raw_hours: Decimal) -> Decimal {
        if raw_hours <= self.break_eligibility_threshold {
            return Decimal::ZERO;
        }
        self.break_deduction_tiers
            .iter()
            .find(|tier| tier.matches(raw_hours))
            .map(|tier| tier.deduction_hours)
            .unwrap_or(Decimal::ZERO)
    }

    /// Computes adjusted hours for a clock-in/clock-out pair.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDateTime;
    /// use payroll_engine::config::ShiftHoursPolicy;
    /// use rust_decimal::Decimal;
    ///
    /// let clock_in = NaiveDateTime::parse_from_str("2026-01-05 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let clock_out = NaiveDateTime::parse_from_str("2026-01-05 18:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    ///
    /// let adjusted = ShiftHoursPolicy::standard().adjusted_hours(clock_in, clock_out).unwrap();
    /// assert_eq!(adjusted, Decimal::new(8, 0));
    /// ```
    pub fn adjusted_hours(
        &self,
        clock_in: NaiveDateTime,
        clock_out: NaiveDateTime,
    ) -> EngineResult<Decimal> {
        calculate_adjusted_hours(clock_in, clock_out, self, 1).map(|r| r.adjusted_hours)
    }
}

/// Calculates adjusted worked hours for a shift.
///
/// # Arguments
///
/// * `clock_in` - Shift start
/// * `clock_out` - Shift end, strictly after `clock_in`
/// * `policy` - The break deduction and rounding rule
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// An [`AdjustedHoursResult`], or [`EngineError::MalformedTimestamp`] if the
/// duration is zero or negative.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDateTime;
/// use payroll_engine::calculation::calculate_adjusted_hours;
/// use payroll_engine::config::ShiftHoursPolicy;
/// use rust_decimal::Decimal;
///
/// let clock_in = NaiveDateTime::parse_from_str("2026-01-05 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let clock_out = NaiveDateTime::parse_from_str("2026-01-05 16:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
///
/// let result = calculate_adjusted_hours(clock_in, clock_out, &ShiftHoursPolicy::standard(), 1).unwrap();
/// assert_eq!(result.break_deduction, Decimal::new(5, 1));
/// assert_eq!(result.adjusted_hours, Decimal::new(65, 1));
/// ```
pub fn calculate_adjusted_hours(
    clock_in: NaiveDateTime,
    clock_out: NaiveDateTime,
    policy: &ShiftHoursPolicy,
    step_number: u32,
) -> EngineResult<AdjustedHoursResult> {
    let seconds = (clock_out - clock_in).num_seconds();
    if seconds <= 0 {
        return Err(EngineError::MalformedTimestamp {
            value: clock_out.to_string(),
            message: format!("clock-out is not after clock-in ({})", clock_in),
        });
    }

    let raw_hours = Decimal::new(seconds, 0) / Decimal::new(3600, 0);
    let break_deduction = policy.break_deduction(raw_hours);
    let rounded = policy.rounding_mode.apply(raw_hours - break_deduction);
    let adjusted_hours = rounded.max(Decimal::ZERO);

    let reasoning = if break_deduction.is_zero() {
        format!(
            "{} raw hours not above {} hour eligibility threshold, no break deducted; {} gives {} hours",
            raw_hours.round_dp(4).normalize(),
            policy.break_eligibility_threshold.normalize(),
            policy.rounding_mode.as_str(),
            adjusted_hours.normalize()
        )
    } else {
        format!(
            "{} raw hours less {} hour break; {} gives {} hours",
            raw_hours.round_dp(4).normalize(),
            break_deduction.normalize(),
            policy.rounding_mode.as_str(),
            adjusted_hours.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "adjusted_hours".to_string(),
        rule_name: "Break Deduction and Rounding".to_string(),
        input: serde_json::json!({
            "clock_in": clock_in.to_string(),
            "clock_out": clock_out.to_string(),
            "raw_hours": raw_hours.round_dp(4).normalize().to_string(),
            "break_eligibility_threshold": policy.break_eligibility_threshold.normalize().to_string(),
            "rounding_mode": policy.rounding_mode.as_str()
        }),
        output: serde_json::json!({
            "break_deduction": break_deduction.normalize().to_string(),
            "adjusted_hours": adjusted_hours.normalize().to_string()
        }),
        reasoning,
    };

    Ok(AdjustedHoursResult {
        raw_hours,
        break_deduction,
        adjusted_hours,
        audit_step,
    })
}
