//! Request types for the payroll API.
//!
//! This module defines the JSON request structure for the `/payroll` endpoint
//! and its conversion into engine inputs.

use serde::{Deserialize, Serialize};

use crate::config::{PayrollConfig, PayrollConfigFile};
use crate::error::EngineResult;
use crate::models::{EmployeeDirectory, EmployeeRecord, HolidayCalendar, RunWarning, TimesheetBatch};

/// Request body for the `/payroll` endpoint.
///
/// Employee records use the directory's column names (`Name`, `Status`,
/// `Base Salary`, `Hourly Rate`, `OT Threshold`) or their snake_case forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRequest {
    /// The employee directory records.
    pub employees: Vec<EmployeeRecord>,
    /// Public holidays as `YYYY-MM-DD` strings.
    #[serde(default)]
    pub holidays: Vec<String>,
    /// The timesheet batches to process.
    pub batches: Vec<TimesheetBatch>,
    /// Configuration overrides layered over the server's configuration.
    #[serde(default)]
    pub config: Option<PayrollConfigFile>,
}

/// Engine inputs built from a request.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// The effective configuration.
    pub config: PayrollConfig,
    /// The validated employee directory.
    pub directory: EmployeeDirectory,
    /// Warnings for skipped or defaulted directory records.
    pub directory_warnings: Vec<RunWarning>,
    /// The holiday calendar.
    pub calendar: HolidayCalendar,
    /// The batches to process.
    pub batches: Vec<TimesheetBatch>,
}

impl PayrollRequest {
    /// Validates the request and builds engine inputs.
    ///
    /// Fails on an unknown profile or a malformed holiday entry; invalid
    /// employee records only produce warnings.
    pub fn prepare(self, base: &PayrollConfig) -> EngineResult<PreparedRequest> {
        let config = match self.config {
            Some(overrides) => overrides.apply_to(base.clone())?,
            None => base.clone(),
        };
        let calendar = HolidayCalendar::from_lines(self.holidays.iter())?;
        let (directory, directory_warnings) = EmployeeDirectory::from_records(self.employees);

        Ok(PreparedRequest {
            config,
            directory,
            directory_warnings,
            calendar,
            batches: self.batches,
        })
    }
}
