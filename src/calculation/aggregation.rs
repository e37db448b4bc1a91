//! Per-employee totals aggregation.

use rust_decimal::Decimal;

use crate::models::{Employee, ItemizedPayRecord, PayBasis, PayrollTotals};

/// Rolls an employee's itemized records into a totals row.
///
/// Overtime pay is always summed. Regular pay is summed for part-time
/// employees; full-time employees get their monthly base salary plus the
/// regular pay of holiday shifts, which is the only regular pay a full-time
/// record can carry under the default schedule. Returns `None` when there are
/// no records.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::aggregate_totals;
/// use payroll_engine::models::{Employee, PayBasis};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     name: "Alex".to_string(),
///     pay_basis: PayBasis::PartTime { hourly_rate: Decimal::new(10, 0) },
///     overtime_threshold: None,
/// };
/// assert!(aggregate_totals(&employee, &[]).is_none());
/// ```
pub fn aggregate_totals(
    employee: &Employee,
    records: &[ItemizedPayRecord],
) -> Option<PayrollTotals> {
    if records.is_empty() {
        return None;
    }

    let overtime_pay: Decimal = records.iter().map(|r| r.overtime_pay).sum();
    let regular_pay: Decimal = match employee.pay_basis {
        PayBasis::PartTime { .. } => records.iter().map(|r| r.regular_pay).sum(),
        PayBasis::FullTime { base_salary } => {
            base_salary
                + records
                    .iter()
                    .filter(|r| r.is_holiday)
                    .map(|r| r.regular_pay)
                    .sum::<Decimal>()
        }
    };

    Some(PayrollTotals {
        employee_name: employee.name.clone(),
        status: employee.status(),
        shift_count: records.len(),
        regular_pay,
        overtime_pay,
        total_pay: regular_pay + overtime_pay,
    })
}
