//! Payroll run output models.
//!
//! A [`PayrollRun`] is the terminal artifact of one engine invocation: one
//! [`EmployeePayroll`] table per employee and batch, plus every warning raised
//! for skipped shifts, batches or directory records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

use super::employee::EmploymentStatus;
use super::pay_record::{ItemizedPayRecord, PayrollTotals};

/// A recoverable problem recorded during a run.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
/// use payroll_engine::models::RunWarning;
///
/// let err = EngineError::UnknownEmployee { name: "Dana".to_string() };
/// let warning = RunWarning::from_error(&err).in_batch("Dana").at_row(4);
/// assert_eq!(warning.code, "UNKNOWN_EMPLOYEE");
/// assert_eq!(warning.batch.as_deref(), Some("Dana"));
/// assert_eq!(warning.row, Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The batch the warning belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    /// The 1-based data row within the batch or source, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl RunWarning {
    /// Creates a warning with a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            batch: None,
            row: None,
        }
    }

    /// Creates a warning from a downgraded error.
    pub fn from_error(error: &EngineError) -> Self {
        Self::new(error.code(), error.to_string())
    }

    /// Attaches a batch name.
    pub fn in_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }

    /// Attaches a row number.
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// The itemized table and totals row for one employee in one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayroll {
    /// The batch the shifts came from.
    pub batch: String,
    /// The employee name.
    pub employee_name: String,
    /// The employee's status.
    pub status: EmploymentStatus,
    /// One record per valid shift, in source order.
    pub records: Vec<ItemizedPayRecord>,
    /// The aggregated totals row.
    pub totals: PayrollTotals,
}

/// The complete result of a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the run.
    pub engine_version: String,
    /// Per-employee results, in batch order.
    pub payrolls: Vec<EmployeePayroll>,
    /// Every warning raised during the run.
    pub warnings: Vec<RunWarning>,
    /// The total run duration in microseconds.
    pub duration_us: u64,
}

impl PayrollRun {
    /// Returns the payroll for an employee in a batch, if produced.
    pub fn payroll_for(&self, batch: &str, employee_name: &str) -> Option<&EmployeePayroll> {
        self.payrolls
            .iter()
            .find(|p| p.batch == batch && p.employee_name == employee_name)
    }

    /// Returns the warnings with the given code.
    pub fn warnings_with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a RunWarning> {
        self.warnings.iter().filter(move |w| w.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_omits_empty_location_fields() {
        let warning = RunWarning::new("UNKNOWN_EMPLOYEE", "Unknown employee: Dana");
        let json = serde_json::to_string(&warning).unwrap();
        assert_eq!(
            json,
            r#"{"code":"UNKNOWN_EMPLOYEE","message":"Unknown employee: Dana"}"#
        );
    }

    #[test]
    fn test_from_error_uses_error_code_and_message() {
        let err = EngineError::MalformedTimestamp {
            value: "x".to_string(),
            message: "bad".to_string(),
        };
        let warning = RunWarning::from_error(&err);
        assert_eq!(warning.code, "MALFORMED_TIMESTAMP");
        assert_eq!(warning.message, "Malformed timestamp 'x': bad");
    }

    #[test]
    fn test_warnings_with_code_filters() {
        let run = PayrollRun {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: "0.1.0".to_string(),
            payrolls: vec![],
            warnings: vec![
                RunWarning::new("A", "first"),
                RunWarning::new("B", "second"),
                RunWarning::new("A", "third"),
            ],
            duration_us: 0,
        };
        assert_eq!(run.warnings_with_code("A").count(), 2);
        assert!(run.payroll_for("batch 1", "Alex").is_none());
    }
}
