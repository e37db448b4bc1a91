//! Employee directory.
//!
//! The directory is loaded once per run and is read-only afterwards. Names are
//! matched after trimming surrounding whitespace.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

use super::employee::{Employee, EmployeeRecord, ThresholdField};
use super::payroll_run::RunWarning;

/// Lookup of employees by name.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{EmployeeDirectory, EmployeeRecord};
///
/// let records = vec![EmployeeRecord {
///     name: "Alex".to_string(),
///     status: "Part Time".to_string(),
///     hourly_rate: Some("10".to_string()),
///     ..Default::default()
/// }];
/// let (directory, warnings) = EmployeeDirectory::from_records(records);
/// assert!(warnings.is_empty());
/// assert!(directory.lookup(" Alex ").is_ok());
/// assert!(directory.lookup("Sam").is_err());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmployeeDirectory {
    employees: HashMap<String, Employee>,
}

impl EmployeeDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from raw records.
    ///
    /// Invalid records and duplicate names are skipped, each with an
    /// `INVALID_EMPLOYEE_RECORD` warning; the first record for a name wins.
    /// An unparsable overtime threshold keeps the record and yields an
    /// `OT_THRESHOLD_DEFAULTED` warning.
    pub fn from_records<I>(records: I) -> (Self, Vec<RunWarning>)
    where
        I: IntoIterator<Item = EmployeeRecord>,
    {
        let mut directory = Self::new();
        let mut warnings = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let row = index + 1;

            if let ThresholdField::Unparsable(text) = record.threshold_field() {
                let message = format!(
                    "OT Threshold '{}' for '{}' is not a number; using the default",
                    text,
                    record.name.trim()
                );
                warn!(row, "{}", message);
                warnings.push(RunWarning::new("OT_THRESHOLD_DEFAULTED", message).at_row(row));
            }

            let result = Employee::try_from(record).and_then(|employee| {
                directory.insert(employee)
            });

            if let Err(err) = result {
                warn!(row, error = %err, "Skipping employee record");
                warnings.push(RunWarning::from_error(&err).at_row(row));
            }
        }

        (directory, warnings)
    }

    /// Adds an employee. Fails if the name is already present.
    pub fn insert(&mut self, employee: Employee) -> EngineResult<()> {
        let key = employee.name.trim().to_string();
        if self.employees.contains_key(&key) {
            return Err(EngineError::InvalidEmployeeRecord {
                name: key,
                message: "duplicate name in directory".to_string(),
            });
        }
        self.employees.insert(key, employee);
        Ok(())
    }

    /// Looks up an employee by name.
    pub fn lookup(&self, name: &str) -> EngineResult<&Employee> {
        let key = name.trim();
        self.employees
            .get(key)
            .ok_or_else(|| EngineError::UnknownEmployee {
                name: key.to_string(),
            })
    }

    /// Returns true if the directory knows the name.
    pub fn contains(&self, name: &str) -> bool {
        self.employees.contains_key(name.trim())
    }

    /// Returns the number of employees.
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Returns true if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

impl FromIterator<Employee> for EmployeeDirectory {
    /// Collects employees, keeping the first of any duplicate names.
    fn from_iter<T: IntoIterator<Item = Employee>>(iter: T) -> Self {
        let mut directory = Self::new();
        for employee in iter {
            let _ = directory.insert(employee);
        }
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PayBasis;
    use rust_decimal::Decimal;

    fn part_time(name: &str, rate: &str) -> EmployeeRecord {
        EmployeeRecord {
            name: name.to_string(),
            status: "Part Time".to_string(),
            hourly_rate: Some(rate.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_unknown_employee() {
        let (directory, _) = EmployeeDirectory::from_records(vec![part_time("Alex", "10")]);
        match directory.lookup("Sam") {
            Err(EngineError::UnknownEmployee { name }) => assert_eq!(name, "Sam"),
            other => panic!("expected UnknownEmployee, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_record_is_skipped_with_warning() {
        let records = vec![
            part_time("Alex", "10"),
            EmployeeRecord {
                name: "Sam".to_string(),
                status: "Full Time".to_string(),
                ..Default::default()
            },
        ];
        let (directory, warnings) = EmployeeDirectory::from_records(records);

        assert_eq!(directory.len(), 1);
        assert!(!directory.contains("Sam"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "INVALID_EMPLOYEE_RECORD");
        assert_eq!(warnings[0].row, Some(2));
    }

    #[test]
    fn test_duplicate_name_keeps_first_record() {
        let records = vec![part_time("Alex", "10"), part_time("Alex ", "99")];
        let (directory, warnings) = EmployeeDirectory::from_records(records);

        assert_eq!(directory.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            directory.lookup("Alex").unwrap().pay_basis,
            PayBasis::PartTime {
                hourly_rate: Decimal::new(10, 0)
            }
        );
    }

    #[test]
    fn test_unparsable_threshold_is_reported_but_record_kept() {
        let mut record = part_time("Alex", "10");
        record.overtime_threshold = Some("lots".to_string());
        let (directory, warnings) = EmployeeDirectory::from_records(vec![record]);

        assert!(directory.contains("Alex"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "OT_THRESHOLD_DEFAULTED");
    }
}
