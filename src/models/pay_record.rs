//! Pay record models.
//!
//! This module contains the [`ItemizedPayRecord`] produced for every shift, the
//! per-employee [`PayrollTotals`], and the [`AuditStep`] recording each rule
//! applied along the way.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::employee::EmploymentStatus;
use super::shift::SourceRow;

/// A single step in the audit trail recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "holiday_detection".to_string(),
///     rule_name: "Public Holiday Detection".to_string(),
///     input: serde_json::json!({"date": "2026-01-01"}),
///     output: serde_json::json!({"is_holiday": true}),
///     reasoning: "2026-01-01 is in the holiday calendar".to_string(),
/// };
/// assert_eq!(step.rule_id, "holiday_detection");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number within one record.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The itemized pay for one shift.
///
/// `total_pay` is always exactly `regular_pay + overtime_pay`, and
/// `regular_hours + overtime_hours` is always `adjusted_hours`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedPayRecord {
    /// The source row, unchanged.
    pub source: SourceRow,
    /// The resolved employee name.
    pub employee_name: String,
    /// Clock-in timestamp.
    pub clock_in: NaiveDateTime,
    /// Clock-out timestamp.
    pub clock_out: NaiveDateTime,
    /// Worked hours after break deduction and rounding.
    pub adjusted_hours: Decimal,
    /// The effective hourly rate.
    pub hourly_rate: Decimal,
    /// Hours up to the overtime threshold.
    pub regular_hours: Decimal,
    /// Hours beyond the overtime threshold.
    pub overtime_hours: Decimal,
    /// Whether the clock-in date is a public holiday.
    pub is_holiday: bool,
    /// Pay for regular hours.
    pub regular_pay: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// `regular_pay + overtime_pay`.
    pub total_pay: Decimal,
    /// The rules applied to produce this record, in order.
    #[serde(default)]
    pub audit_steps: Vec<AuditStep>,
}

/// Aggregated pay for one employee within one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// The employee name.
    pub employee_name: String,
    /// The employee's status.
    pub status: EmploymentStatus,
    /// Number of itemized shifts aggregated.
    pub shift_count: usize,
    /// Total regular pay (base salary plus holiday premiums for full-time).
    pub regular_pay: Decimal,
    /// Total overtime pay.
    pub overtime_pay: Decimal,
    /// `regular_pay + overtime_pay`.
    pub total_pay: Decimal,
}
