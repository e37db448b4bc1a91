//! Shift model and related types.
//!
//! This module defines the [`SourceRow`] holding a timesheet row's original
//! columns, the parsed [`Shift`], and the [`TimesheetBatch`] that groups rows.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::TimestampFormat;
use crate::error::{EngineError, EngineResult};

/// Column holding the employee name.
pub const NAME_COLUMN: &str = "Name";
/// Column holding the clock-in timestamp.
pub const CLOCK_IN_COLUMN: &str = "Clock In";
/// Column holding the clock-out timestamp.
pub const CLOCK_OUT_COLUMN: &str = "Clock Out";

/// A timesheet row: ordered `(column, value)` pairs exactly as read.
///
/// Serializes as a JSON object whose keys keep the source column order.
///
/// # Example
///
/// ```
/// use payroll_engine::models::SourceRow;
///
/// let row = SourceRow::from_pairs([("Name", "Alex"), ("Site", "North")]);
/// assert_eq!(row.get("Site"), Some("North"));
/// assert_eq!(row.get("Missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    columns: Vec<(String, String)>,
}

impl SourceRow {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Self::new();
        for (column, value) in pairs {
            row.push(column, value);
        }
        row
    }

    /// Appends a column, or replaces the value if the column exists.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Returns the value of a column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the column names in source order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(c, _)| c.as_str())
    }

    /// Iterates `(column, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns true if every value is blank.
    pub fn is_blank(&self) -> bool {
        self.columns.iter().all(|(_, v)| v.trim().is_empty())
    }
}

impl Serialize for SourceRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in &self.columns {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SourceRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = SourceRow;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to cell values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SourceRow, A::Error> {
                let mut row = SourceRow::new();
                while let Some((column, value)) =
                    access.next_entry::<String, serde_json::Value>()?
                {
                    let text = match value {
                        serde_json::Value::Null => String::new(),
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    row.push(column, text);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// A raw timesheet entry: who worked, from when to when, and the source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shift {
    /// The employee name used for directory lookup.
    pub employee_name: String,
    /// Clock-in timestamp.
    pub clock_in: NaiveDateTime,
    /// Clock-out timestamp, strictly after clock-in.
    pub clock_out: NaiveDateTime,
    /// The source row, preserved unchanged.
    pub source: SourceRow,
}

impl Shift {
    /// Creates a shift, rejecting clock-out at or before clock-in.
    pub fn new(
        employee_name: impl Into<String>,
        clock_in: NaiveDateTime,
        clock_out: NaiveDateTime,
        source: SourceRow,
    ) -> EngineResult<Self> {
        if clock_out <= clock_in {
            return Err(EngineError::MalformedTimestamp {
                value: clock_out.to_string(),
                message: format!("clock-out is not after clock-in ({})", clock_in),
            });
        }
        Ok(Self {
            employee_name: employee_name.into(),
            clock_in,
            clock_out,
            source,
        })
    }

    /// Parses a shift from a source row.
    ///
    /// The name comes from `employee_name` when given (a validated batch
    /// label), otherwise from the row's `Name` column.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::TimestampFormat;
    /// use payroll_engine::models::{Shift, SourceRow};
    /// use rust_decimal::Decimal;
    ///
    /// let row = SourceRow::from_pairs([
    ///     ("Name", "Alex"),
    ///     ("Clock In", "05/01/2026 09:00:00"),
    ///     ("Clock Out", "05/01/2026 17:30:00"),
    /// ]);
    /// let shift = Shift::from_row(row, None, &TimestampFormat::DayFirst).unwrap();
    /// assert_eq!(shift.employee_name, "Alex");
    /// assert_eq!(shift.raw_hours(), Decimal::new(85, 1));
    /// ```
    pub fn from_row(
        source: SourceRow,
        employee_name: Option<&str>,
        format: &TimestampFormat,
    ) -> EngineResult<Self> {
        let name = match employee_name {
            Some(name) => name.trim().to_string(),
            None => source.get(NAME_COLUMN).unwrap_or_default().trim().to_string(),
        };
        if name.is_empty() {
            return Err(EngineError::UnknownEmployee { name });
        }

        let clock_in = parse_column(&source, CLOCK_IN_COLUMN, format)?;
        let clock_out = parse_column(&source, CLOCK_OUT_COLUMN, format)?;

        Self::new(name, clock_in, clock_out, source)
    }

    /// Raw worked duration in hours, before any break deduction.
    pub fn raw_hours(&self) -> Decimal {
        let seconds = (self.clock_out - self.clock_in).num_seconds();
        Decimal::new(seconds, 0) / Decimal::new(3600, 0)
    }

    /// The civil date of clock-in.
    pub fn date(&self) -> NaiveDate {
        self.clock_in.date()
    }
}

fn parse_column(
    source: &SourceRow,
    column: &str,
    format: &TimestampFormat,
) -> EngineResult<NaiveDateTime> {
    let value = source
        .get(column)
        .ok_or_else(|| EngineError::MalformedTimestamp {
            value: String::new(),
            message: format!("row has no '{}' column", column),
        })?;
    format.parse(value)
}

/// A group of timesheet rows processed together.
///
/// A labeled batch (for example one worksheet) is joined to the directory by
/// its label; an unlabeled batch is split by each row's `Name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetBatch {
    /// The batch label, trusted to name one employee.
    #[serde(default)]
    pub label: Option<String>,
    /// The rows in source order.
    pub rows: Vec<SourceRow>,
}

impl TimesheetBatch {
    /// Creates an unlabeled batch.
    pub fn unlabeled(rows: Vec<SourceRow>) -> Self {
        Self { label: None, rows }
    }

    /// Creates a batch labeled with an employee name.
    pub fn labeled(label: impl Into<String>, rows: Vec<SourceRow>) -> Self {
        Self {
            label: Some(label.into()),
            rows,
        }
    }

    /// A display name for warnings and exports.
    pub fn display_name(&self, index: usize) -> String {
        match &self.label {
            Some(label) => label.trim().to_string(),
            None => format!("batch {}", index + 1),
        }
    }
}
