//! Readers for the employee directory, holiday calendar and timesheets.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{Data, DataType, Reader, Xlsx};
use csv::StringRecord;
use tracing::debug;

use crate::config::CELL_TIMESTAMP_PATTERN;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CLOCK_IN_COLUMN, CLOCK_OUT_COLUMN, EmployeeDirectory, EmployeeRecord, HolidayCalendar,
    NAME_COLUMN, RunWarning, SourceRow, TimesheetBatch,
};

const STATUS_COLUMN: &str = "Status";
const BASE_SALARY_COLUMN: &str = "Base Salary";
const HOURLY_RATE_COLUMN: &str = "Hourly Rate";
const OT_THRESHOLD_COLUMN: &str = "OT Threshold";

/// Opens a file for reading.
pub fn open_source<P: AsRef<Path>>(path: P) -> EngineResult<BufReader<File>> {
    let path = path.as_ref();
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| EngineError::SourceRead {
            source_name: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Reads an employee directory from CSV.
///
/// `Name` and `Status` columns are required; `Base Salary`, `Hourly Rate`
/// and `OT Threshold` are optional and empty cells count as absent. Invalid
/// records are skipped and reported in the returned warnings.
///
/// # Example
///
/// ```
/// use payroll_engine::io::read_employee_directory;
///
/// let csv = "Name,Status,Base Salary,Hourly Rate,OT Threshold\n\
///            Alex,Part Time,,10,\n\
///            Sam,Full Time,2600,,7.5\n";
/// let (directory, warnings) = read_employee_directory(csv.as_bytes(), "employees.csv").unwrap();
/// assert_eq!(directory.len(), 2);
/// assert!(warnings.is_empty());
/// ```
pub fn read_employee_directory<R: Read>(
    reader: R,
    source_name: &str,
) -> EngineResult<(EmployeeDirectory, Vec<RunWarning>)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|e| source_error(source_name, e))?
        .clone();

    let name_idx = require_column(&headers, NAME_COLUMN, source_name)?;
    let status_idx = require_column(&headers, STATUS_COLUMN, source_name)?;
    let base_idx = find_column(&headers, BASE_SALARY_COLUMN);
    let hourly_idx = find_column(&headers, HOURLY_RATE_COLUMN);
    let threshold_idx = find_column(&headers, OT_THRESHOLD_COLUMN);

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let row = result.map_err(|e| source_error(source_name, e))?;
        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let optional = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        records.push(EmployeeRecord {
            name: row.get(name_idx).unwrap_or_default().to_string(),
            status: row.get(status_idx).unwrap_or_default().to_string(),
            base_salary: optional(base_idx),
            hourly_rate: optional(hourly_idx),
            overtime_threshold: optional(threshold_idx),
        });
    }

    let (directory, warnings) = EmployeeDirectory::from_records(records);
    debug!(
        source = source_name,
        employees = directory.len(),
        warnings = warnings.len(),
        "Loaded employee directory"
    );
    Ok((directory, warnings))
}

/// Reads a holiday calendar, one `YYYY-MM-DD` date per line.
pub fn read_holiday_calendar<R: Read>(
    mut reader: R,
    source_name: &str,
) -> EngineResult<HolidayCalendar> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| source_error(source_name, e))?;
    let calendar = HolidayCalendar::parse(&text)?;
    debug!(source = source_name, holidays = calendar.len(), "Loaded holiday calendar");
    Ok(calendar)
}

/// Reads a CSV timesheet as one unlabeled batch.
///
/// `Name`, `Clock In` and `Clock Out` are required; every column is carried
/// through in source order.
///
/// # Example
///
/// ```
/// use payroll_engine::io::read_timesheet_csv;
///
/// let csv = "Name,Clock In,Clock Out,Site\n\
///            Alex,2026-01-05 09:00:00,2026-01-05 18:00:00,North\n";
/// let batch = read_timesheet_csv(csv.as_bytes(), "shifts.csv").unwrap();
/// assert!(batch.label.is_none());
/// assert_eq!(batch.rows[0].get("Site"), Some("North"));
/// ```
pub fn read_timesheet_csv<R: Read>(reader: R, source_name: &str) -> EngineResult<TimesheetBatch> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| source_error(source_name, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    for column in [NAME_COLUMN, CLOCK_IN_COLUMN, CLOCK_OUT_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(missing_column(column, source_name));
        }
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| source_error(source_name, e))?;
        rows.push(build_row(&headers, record.iter().map(str::to_string)));
    }

    debug!(source = source_name, rows = rows.len(), "Loaded timesheet");
    Ok(TimesheetBatch::unlabeled(rows))
}

/// Reads an XLSX workbook as one batch per worksheet, labeled with the sheet
/// name.
///
/// The first non-empty row of each sheet is the header. `Clock In` and
/// `Clock Out` are required; `Name` may be absent since the label supplies
/// it. Native date-time cells are rendered with [`CELL_TIMESTAMP_PATTERN`],
/// keeping their full precision under any timestamp profile. Empty sheets
/// are skipped.
pub fn read_timesheet_workbook<RS: Read + Seek>(
    reader: RS,
    source_name: &str,
) -> EngineResult<Vec<TimesheetBatch>> {
    let mut workbook: Xlsx<RS> = Xlsx::new(reader).map_err(|e| source_error(source_name, e))?;

    let mut batches = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| source_error(&format!("{} [{}]", source_name, sheet), e))?;

        let mut rows_iter = range
            .rows()
            .skip_while(|row| row.iter().all(|c| cell_text(c).trim().is_empty()));
        let Some(header_row) = rows_iter.next() else {
            debug!(source = source_name, sheet = %sheet, "Skipping empty worksheet");
            continue;
        };

        let headers: Vec<String> = header_row
            .iter()
            .map(|c| cell_text(c).trim().to_string())
            .collect();
        for column in [CLOCK_IN_COLUMN, CLOCK_OUT_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                return Err(missing_column(column, &format!("{} [{}]", source_name, sheet)));
            }
        }

        let rows: Vec<SourceRow> = rows_iter
            .map(|row| build_row(&headers, row.iter().map(|c| cell_text(c))))
            .collect();

        debug!(source = source_name, sheet = %sheet, rows = rows.len(), "Loaded worksheet");
        batches.push(TimesheetBatch::labeled(sheet, rows));
    }

    Ok(batches)
}

/// Reads an XLSX workbook from a path. See [`read_timesheet_workbook`].
pub fn read_timesheet_workbook_path<P: AsRef<Path>>(path: P) -> EngineResult<Vec<TimesheetBatch>> {
    let path = path.as_ref();
    read_timesheet_workbook(open_source(path)?, &path.display().to_string())
}

/// Pairs header names with values. Columns with a blank header are dropped
/// and short rows are padded with empty text.
fn build_row<I>(headers: &[String], values: I) -> SourceRow
where
    I: IntoIterator<Item = String>,
{
    let mut values = values.into_iter();
    let mut row = SourceRow::new();
    for header in headers {
        let value = values.next().unwrap_or_default();
        if !header.is_empty() {
            row.push(header.clone(), value);
        }
    }
    row
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format(CELL_TIMESTAMP_PATTERN).to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

fn find_column(headers: &StringRecord, column: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column))
}

fn require_column(headers: &StringRecord, column: &str, source_name: &str) -> EngineResult<usize> {
    find_column(headers, column).ok_or_else(|| missing_column(column, source_name))
}

fn missing_column(column: &str, source_name: &str) -> EngineError {
    EngineError::MissingColumn {
        column: column.to_string(),
        source_name: source_name.to_string(),
    }
}

fn source_error(source_name: &str, err: impl std::fmt::Display) -> EngineError {
    EngineError::SourceRead {
        source_name: source_name.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_missing_status_column() {
        let csv = "Name,Hourly Rate\nAlex,10\n";
        match read_employee_directory(csv.as_bytes(), "employees.csv") {
            Err(EngineError::MissingColumn {
                column,
                source_name,
            }) => {
                assert_eq!(column, "Status");
                assert_eq!(source_name, "employees.csv");
            }
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_headers_are_matched_loosely() {
        let csv = " name , STATUS ,hourly rate\nAlex,part time,12.5\n";
        let (directory, warnings) = read_employee_directory(csv.as_bytes(), "e.csv").unwrap();
        assert!(warnings.is_empty());
        assert!(directory.contains("Alex"));
    }

    #[test]
    fn test_directory_invalid_records_become_warnings() {
        let csv = "Name,Status,Base Salary,Hourly Rate,OT Threshold\n\
                   Alex,Part Time,,10,eight\n\
                   Sam,Full Time,,,\n\
                   ,,,,\n\
                   Kim,Contractor,,20,\n";
        let (directory, warnings) = read_employee_directory(csv.as_bytes(), "e.csv").unwrap();

        assert_eq!(directory.len(), 1);
        let codes: Vec<_> = warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                "OT_THRESHOLD_DEFAULTED",
                "INVALID_EMPLOYEE_RECORD",
                "INVALID_EMPLOYEE_RECORD"
            ]
        );
    }

    #[test]
    fn test_holiday_calendar_reader() {
        let text = "2026-01-01\n\n2026-01-26\n2026-01-01\n";
        let calendar = read_holiday_calendar(text.as_bytes(), "holidays.txt").unwrap();
        assert_eq!(calendar.len(), 2);
    }

    #[test]
    fn test_holiday_calendar_reader_rejects_bad_line() {
        let text = "2026-01-01\n26/01/2026\n";
        assert!(matches!(
            read_holiday_calendar(text.as_bytes(), "holidays.txt"),
            Err(EngineError::MalformedHolidayEntry { line: 2, .. })
        ));
    }

    #[test]
    fn test_timesheet_csv_requires_clock_columns() {
        let csv = "Name,Clock In\nAlex,2026-01-05 09:00:00\n";
        assert!(matches!(
            read_timesheet_csv(csv.as_bytes(), "shifts.csv"),
            Err(EngineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_timesheet_csv_preserves_column_order_and_pads_short_rows() {
        let csv = "Site,Name,Clock In,Clock Out,Note\n\
                   North,Alex,2026-01-05 09:00:00,2026-01-05 18:00:00\n";
        let batch = read_timesheet_csv(csv.as_bytes(), "shifts.csv").unwrap();
        let columns: Vec<_> = batch.rows[0].column_names().collect();
        assert_eq!(columns, vec!["Site", "Name", "Clock In", "Clock Out", "Note"]);
        assert_eq!(batch.rows[0].get("Note"), Some(""));
    }

    #[test]
    fn test_cell_text_renders_numbers_and_blanks() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(10.0)), "10");
        assert_eq!(cell_text(&Data::Int(3)), "3");
        assert_eq!(cell_text(&Data::String("Alex".to_string())), "Alex");
    }

    #[test]
    fn test_open_source_missing_file() {
        assert!(matches!(
            open_source("/nonexistent/shifts.csv"),
            Err(EngineError::SourceRead { .. })
        ));
    }
}
