//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod directory;
mod employee;
mod holiday_calendar;
mod pay_record;
mod payroll_run;
mod shift;

pub use directory::EmployeeDirectory;
pub use employee::{Employee, EmployeeRecord, EmploymentStatus, PayBasis, ThresholdField};
pub use holiday_calendar::{HOLIDAY_DATE_FORMAT, HolidayCalendar};
pub use pay_record::{AuditStep, ItemizedPayRecord, PayrollTotals};
pub use payroll_run::{EmployeePayroll, PayrollRun, RunWarning};
pub use shift::{
    CLOCK_IN_COLUMN, CLOCK_OUT_COLUMN, NAME_COLUMN, Shift, SourceRow, TimesheetBatch,
};
