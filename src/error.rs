//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading payroll inputs and
//! computing pay.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// Errors scoped to one shift or one batch are downgraded to warnings by the
/// [`PayrollEngine`](crate::calculation::PayrollEngine); the remaining variants
/// abort a run.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::UnknownEmployee {
///     name: "Dana".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown employee: Dana");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A named shift-hours profile does not exist.
    #[error("Unknown profile: {name}")]
    UnknownProfile {
        /// The requested profile name.
        name: String,
    },

    /// A configuration value is outside its allowed range.
    #[error("Invalid configuration value for {field}: {message}")]
    InvalidConfig {
        /// Dotted path of the offending setting.
        field: String,
        /// A description of what was wrong.
        message: String,
    },

    /// A clock-in or clock-out value could not be parsed, or clock-out is
    /// not after clock-in.
    #[error("Malformed timestamp '{value}': {message}")]
    MalformedTimestamp {
        /// The offending raw value.
        value: String,
        /// A description of what was wrong.
        message: String,
    },

    /// A shift references a name absent from the employee directory.
    #[error("Unknown employee: {name}")]
    UnknownEmployee {
        /// The name that could not be resolved.
        name: String,
    },

    /// An employee record is missing a field required by its status, or
    /// carries an unrecognized status.
    #[error("Invalid employee record '{name}': {message}")]
    InvalidEmployeeRecord {
        /// The name on the record.
        name: String,
        /// A description of what made the record invalid.
        message: String,
    },

    /// A holiday calendar line is not a `YYYY-MM-DD` date.
    #[error("Malformed holiday entry on line {line}: '{value}'")]
    MalformedHolidayEntry {
        /// 1-based line number in the source.
        line: usize,
        /// The offending line, trimmed.
        value: String,
    },

    /// A row in a labeled batch names a different employee than the label.
    #[error("Row name '{row_name}' does not match batch label '{label}'")]
    BatchLabelMismatch {
        /// The batch label.
        label: String,
        /// The name found on the row.
        row_name: String,
    },

    /// A tabular source lacks a required column.
    #[error("Missing required column '{column}' in {source_name}")]
    MissingColumn {
        /// The column that was expected.
        column: String,
        /// The source being read (file name or sheet name).
        source_name: String,
    },

    /// A tabular source could not be read.
    #[error("Failed to read {source_name}: {message}")]
    SourceRead {
        /// The source being read.
        source_name: String,
        /// A description of the read error.
        message: String,
    },

    /// An export could not be written.
    #[error("Export failed: {message}")]
    ExportFailed {
        /// A description of the write error.
        message: String,
    },
}

impl EngineError {
    /// Returns a stable, machine-readable code for this error kind.
    ///
    /// Used as the warning code when an error is downgraded.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            EngineError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            EngineError::UnknownProfile { .. } => "UNKNOWN_PROFILE",
            EngineError::InvalidConfig { .. } => "INVALID_CONFIG",
            EngineError::MalformedTimestamp { .. } => "MALFORMED_TIMESTAMP",
            EngineError::UnknownEmployee { .. } => "UNKNOWN_EMPLOYEE",
            EngineError::InvalidEmployeeRecord { .. } => "INVALID_EMPLOYEE_RECORD",
            EngineError::MalformedHolidayEntry { .. } => "MALFORMED_HOLIDAY_ENTRY",
            EngineError::BatchLabelMismatch { .. } => "BATCH_LABEL_MISMATCH",
            EngineError::MissingColumn { .. } => "MISSING_COLUMN",
            EngineError::SourceRead { .. } => "SOURCE_READ",
            EngineError::ExportFailed { .. } => "EXPORT_FAILED",
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
