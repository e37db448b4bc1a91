//! Holiday premium application.
//!
//! Converts regular and overtime hours into pay using the premium schedule
//! for the employee's status. Full-time ordinary hours on a normal day carry a
//! zero multiplier since the monthly salary already covers them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PremiumConfig;
use crate::models::{AuditStep, Employee};

/// Regular and overtime pay for one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumPayResult {
    /// Multiplier applied to regular hours.
    pub regular_multiplier: Decimal,
    /// Multiplier applied to overtime hours.
    pub overtime_multiplier: Decimal,
    /// Pay for regular hours.
    pub regular_pay: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Applies the premium schedule to a shift's hours.
///
/// # Arguments
///
/// * `employee` - The employee; status selects the schedule
/// * `hourly_rate` - The effective hourly rate for the shift
/// * `regular_hours` - Hours up to the overtime threshold
/// * `overtime_hours` - Hours beyond the overtime threshold
/// * `is_holiday` - Whether the shift starts on a public holiday
/// * `premiums` - The premium schedules
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::apply_holiday_premium;
/// use payroll_engine::config::PremiumConfig;
/// use payroll_engine::models::{Employee, PayBasis};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     name: "Alex".to_string(),
///     pay_basis: PayBasis::PartTime { hourly_rate: Decimal::new(10, 0) },
///     overtime_threshold: None,
/// };
/// let result = apply_holiday_premium(
///     &employee,
///     Decimal::new(10, 0),
///     Decimal::new(8, 0),
///     Decimal::new(2, 0),
///     true,
///     &PremiumConfig::default(),
///     1,
/// );
/// assert_eq!(result.regular_pay, Decimal::new(160, 0));
/// assert_eq!(result.overtime_pay, Decimal::new(60, 0));
/// ```
pub fn apply_holiday_premium(
    employee: &Employee,
    hourly_rate: Decimal,
    regular_hours: Decimal,
    overtime_hours: Decimal,
    is_holiday: bool,
    premiums: &PremiumConfig,
    step_number: u32,
) -> PremiumPayResult {
    let status = employee.status();
    let (regular_multiplier, overtime_multiplier) =
        premiums.schedule_for(status).multipliers(is_holiday);

    let regular_pay = regular_hours * hourly_rate * regular_multiplier;
    let overtime_pay = overtime_hours * hourly_rate * overtime_multiplier;

    let day = if is_holiday { "holiday" } else { "ordinary day" };
    let reasoning = format!(
        "{} on {}: regular {}h x ${} x {} = ${}, overtime {}h x ${} x {} = ${}",
        status,
        day,
        regular_hours.normalize(),
        hourly_rate.round_dp(4).normalize(),
        regular_multiplier.normalize(),
        regular_pay.round_dp(4).normalize(),
        overtime_hours.normalize(),
        hourly_rate.round_dp(4).normalize(),
        overtime_multiplier.normalize(),
        overtime_pay.round_dp(4).normalize()
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "holiday_premium".to_string(),
        rule_name: "Holiday Premium".to_string(),
        input: serde_json::json!({
            "status": status,
            "is_holiday": is_holiday,
            "hourly_rate": hourly_rate.normalize().to_string(),
            "regular_hours": regular_hours.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string()
        }),
        output: serde_json::json!({
            "regular_multiplier": regular_multiplier.normalize().to_string(),
            "overtime_multiplier": overtime_multiplier.normalize().to_string(),
            "regular_pay": regular_pay.normalize().to_string(),
            "overtime_pay": overtime_pay.normalize().to_string()
        }),
        reasoning,
    };

    PremiumPayResult {
        regular_multiplier,
        overtime_multiplier,
        regular_pay,
        overtime_pay,
        audit_step,
    }
}
