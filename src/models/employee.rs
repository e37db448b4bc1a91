//! Employee model and related types.
//!
//! This module defines the [`Employee`] struct, the [`EmploymentStatus`] enum and
//! the raw [`EmployeeRecord`] read from a directory source before validation.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents the employment status of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// Paid a monthly base salary; hourly rate is derived from it.
    FullTime,
    /// Paid a stored hourly rate.
    PartTime,
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmploymentStatus::FullTime => write!(f, "Full Time"),
            EmploymentStatus::PartTime => write!(f, "Part Time"),
        }
    }
}

impl FromStr for EmploymentStatus {
    type Err = String;

    /// Parses a status, ignoring case, surrounding whitespace and the
    /// separator between the two words.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::EmploymentStatus;
    ///
    /// assert_eq!(" FULL TIME ".parse::<EmploymentStatus>(), Ok(EmploymentStatus::FullTime));
    /// assert_eq!("part_time".parse::<EmploymentStatus>(), Ok(EmploymentStatus::PartTime));
    /// assert!("casual".parse::<EmploymentStatus>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "full time" | "fulltime" => Ok(EmploymentStatus::FullTime),
            "part time" | "parttime" => Ok(EmploymentStatus::PartTime),
            _ => Err(format!("unrecognized status '{}'", s.trim())),
        }
    }
}

/// How an employee is paid. The variant carries the one rate field that is
/// meaningful for the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayBasis {
    /// Monthly base salary, full-time only.
    FullTime {
        /// The monthly base salary.
        base_salary: Decimal,
    },
    /// Stored hourly rate, part-time only.
    PartTime {
        /// The hourly rate.
        hourly_rate: Decimal,
    },
}

/// Represents an employee in the directory.
///
/// Once built, an employee always carries the rate field its status requires.
///
/// # Examples
///
/// ```
/// use payroll_engine::models::{Employee, EmploymentStatus, PayBasis};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     name: "Alex".to_string(),
///     pay_basis: PayBasis::PartTime { hourly_rate: Decimal::new(10, 0) },
///     overtime_threshold: None,
/// };
/// assert_eq!(employee.status(), EmploymentStatus::PartTime);
/// assert_eq!(employee.overtime_threshold_or(Decimal::new(8, 0)), Decimal::new(8, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// The employee's name, unique within a directory.
    pub name: String,
    /// Status and the matching rate field.
    #[serde(flatten)]
    pub pay_basis: PayBasis,
    /// Hours beyond which a shift's hours are overtime.
    #[serde(default)]
    pub overtime_threshold: Option<Decimal>,
}

impl Employee {
    /// Returns the employment status implied by the pay basis.
    pub fn status(&self) -> EmploymentStatus {
        match self.pay_basis {
            PayBasis::FullTime { .. } => EmploymentStatus::FullTime,
            PayBasis::PartTime { .. } => EmploymentStatus::PartTime,
        }
    }

    /// Returns true if the employee is full-time.
    pub fn is_full_time(&self) -> bool {
        self.status() == EmploymentStatus::FullTime
    }

    /// Returns the configured overtime threshold, or `default` when absent.
    pub fn overtime_threshold_or(&self, default: Decimal) -> Decimal {
        self.overtime_threshold.unwrap_or(default)
    }
}

/// Outcome of reading the optional `OT Threshold` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdField {
    /// The field was absent or blank.
    Absent,
    /// The field held a usable non-negative number of hours.
    Valid(Decimal),
    /// The field held something that is not a non-negative number.
    Unparsable(String),
}

/// A raw employee record as read from a directory source.
///
/// Field names follow the directory's column headers (`Name`, `Status`,
/// `Base Salary`, `Hourly Rate`, `OT Threshold`); snake_case aliases are
/// accepted for JSON clients. Numeric fields may be given as text or numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// The employee's name.
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    /// The employment status text.
    #[serde(rename = "Status", alias = "status")]
    pub status: String,
    /// The monthly base salary text.
    #[serde(
        rename = "Base Salary",
        alias = "base_salary",
        default,
        deserialize_with = "text_or_number"
    )]
    pub base_salary: Option<String>,
    /// The hourly rate text.
    #[serde(
        rename = "Hourly Rate",
        alias = "hourly_rate",
        default,
        deserialize_with = "text_or_number"
    )]
    pub hourly_rate: Option<String>,
    /// The overtime threshold text.
    #[serde(
        rename = "OT Threshold",
        alias = "overtime_threshold",
        default,
        deserialize_with = "text_or_number"
    )]
    pub overtime_threshold: Option<String>,
}

impl EmployeeRecord {
    /// Reads the `OT Threshold` field.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{EmployeeRecord, ThresholdField};
    /// use rust_decimal::Decimal;
    ///
    /// let mut record = EmployeeRecord::default();
    /// assert_eq!(record.threshold_field(), ThresholdField::Absent);
    ///
    /// record.overtime_threshold = Some("7.5".to_string());
    /// assert_eq!(record.threshold_field(), ThresholdField::Valid(Decimal::new(75, 1)));
    ///
    /// record.overtime_threshold = Some("eight".to_string());
    /// assert!(matches!(record.threshold_field(), ThresholdField::Unparsable(_)));
    /// ```
    pub fn threshold_field(&self) -> ThresholdField {
        match present(&self.overtime_threshold) {
            None => ThresholdField::Absent,
            Some(text) => match Decimal::from_str(text) {
                Ok(hours) if hours >= Decimal::ZERO => ThresholdField::Valid(hours),
                _ => ThresholdField::Unparsable(text.to_string()),
            },
        }
    }
}

impl TryFrom<EmployeeRecord> for Employee {
    type Error = EngineError;

    /// Validates a raw record.
    ///
    /// Fails with [`EngineError::InvalidEmployeeRecord`] when the name is blank,
    /// the status is not recognized, or the rate field required by the status
    /// is missing or not a number. An unparsable overtime threshold is not an
    /// error: the employee falls back to the default threshold.
    fn try_from(record: EmployeeRecord) -> EngineResult<Self> {
        let name = record.name.trim().to_string();
        let invalid = |message: String| EngineError::InvalidEmployeeRecord {
            name: name.clone(),
            message,
        };

        if name.is_empty() {
            return Err(invalid("record has no Name".to_string()));
        }

        let status = EmploymentStatus::from_str(&record.status).map_err(&invalid)?;

        let pay_basis = match status {
            EmploymentStatus::FullTime => PayBasis::FullTime {
                base_salary: parse_required(&record.base_salary, "Base Salary", status)
                    .map_err(&invalid)?,
            },
            EmploymentStatus::PartTime => PayBasis::PartTime {
                hourly_rate: parse_required(&record.hourly_rate, "Hourly Rate", status)
                    .map_err(&invalid)?,
            },
        };

        let overtime_threshold = match record.threshold_field() {
            ThresholdField::Valid(hours) => Some(hours),
            ThresholdField::Absent | ThresholdField::Unparsable(_) => None,
        };

        Ok(Employee {
            name,
            pay_basis,
            overtime_threshold,
        })
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_required(
    field: &Option<String>,
    column: &str,
    status: EmploymentStatus,
) -> Result<Decimal, String> {
    let text = present(field).ok_or_else(|| format!("{} record has no {}", status, column))?;
    let value =
        Decimal::from_str(text).map_err(|_| format!("{} '{}' is not a number", column, text))?;
    if value < Decimal::ZERO {
        return Err(format!("{} '{}' is negative", column, text));
    }
    Ok(value)
}

/// Accepts a string, a number, or nothing, and keeps it as text.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}
