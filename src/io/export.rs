//! Tabular export of payroll results.
//!
//! Each [`EmployeePayroll`] becomes an [`ExportTable`]: the source columns,
//! the derived pay columns, and a totals row. Tables are written as CSV or
//! as worksheets of one XLSX workbook.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeePayroll, NAME_COLUMN, PayrollRun};

/// Derived columns appended after the source columns, in order.
pub const DERIVED_COLUMNS: [&str; 8] = [
    "Adjusted Hours",
    "Hourly Rate",
    "Regular Hours",
    "Overtime Hours",
    "Is Public Holiday",
    "Regular Pay",
    "Overtime Pay",
    "Total Pay",
];

const MAX_SHEET_NAME_LEN: usize = 31;

/// One cell of an export table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Text.
    Text(String),
    /// A number at full precision.
    Number(Decimal),
    /// A boolean flag.
    Bool(bool),
    /// Nothing.
    Empty,
}

impl Cell {
    /// Renders the cell as delimited text.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Number(value) => value.normalize().to_string(),
            Cell::Bool(flag) => flag.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// A named table ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    /// Table name, used as the worksheet or file name.
    pub name: String,
    /// Column headers.
    pub header: Vec<String>,
    /// Data rows, each as long as the header.
    pub rows: Vec<Vec<Cell>>,
}

/// Builds the export table for one employee's payroll.
///
/// Source columns keep their first-appearance order; `Name` is prepended if
/// no source row carried it and always holds the resolved employee name.
/// Source columns sharing a name with a derived column are replaced by the
/// derived values. The last row is the totals row, with `totals_label` in
/// the `Name` column.
pub fn payroll_table(payroll: &EmployeePayroll, totals_label: &str) -> ExportTable {
    let mut source_columns: Vec<String> = Vec::new();
    for record in &payroll.records {
        for column in record.source.column_names() {
            if !DERIVED_COLUMNS.contains(&column) && !source_columns.iter().any(|c| c == column) {
                source_columns.push(column.to_string());
            }
        }
    }
    if !source_columns.iter().any(|c| c == NAME_COLUMN) {
        source_columns.insert(0, NAME_COLUMN.to_string());
    }

    let header: Vec<String> = source_columns
        .iter()
        .cloned()
        .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .collect();

    let mut rows = Vec::with_capacity(payroll.records.len() + 1);
    for record in &payroll.records {
        let mut row: Vec<Cell> = source_columns
            .iter()
            .map(|column| {
                if column == NAME_COLUMN {
                    Cell::Text(record.employee_name.clone())
                } else {
                    Cell::Text(record.source.get(column).unwrap_or_default().to_string())
                }
            })
            .collect();
        row.extend([
            Cell::Number(record.adjusted_hours),
            Cell::Number(record.hourly_rate),
            Cell::Number(record.regular_hours),
            Cell::Number(record.overtime_hours),
            Cell::Bool(record.is_holiday),
            Cell::Number(record.regular_pay),
            Cell::Number(record.overtime_pay),
            Cell::Number(record.total_pay),
        ]);
        rows.push(row);
    }

    let mut totals_row: Vec<Cell> = source_columns
        .iter()
        .map(|column| {
            if column == NAME_COLUMN {
                Cell::Text(totals_label.to_string())
            } else {
                Cell::Empty
            }
        })
        .collect();
    totals_row.extend([
        Cell::Empty,
        Cell::Empty,
        Cell::Empty,
        Cell::Empty,
        Cell::Empty,
        Cell::Number(payroll.totals.regular_pay),
        Cell::Number(payroll.totals.overtime_pay),
        Cell::Number(payroll.totals.total_pay),
    ]);
    rows.push(totals_row);

    let name = if payroll.batch == payroll.employee_name {
        payroll.employee_name.clone()
    } else {
        format!("{} - {}", payroll.batch, payroll.employee_name)
    };

    ExportTable { name, header, rows }
}

/// Builds export tables for every payroll in a run.
pub fn run_tables(run: &PayrollRun, totals_label: &str) -> Vec<ExportTable> {
    run.payrolls
        .iter()
        .map(|payroll| payroll_table(payroll, totals_label))
        .collect()
}

/// Writes a table as CSV.
pub fn write_csv<W: Write>(table: &ExportTable, writer: W) -> EngineResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&table.header).map_err(export_error)?;
    for row in &table.rows {
        csv_writer
            .write_record(row.iter().map(Cell::to_text))
            .map_err(export_error)?;
    }
    csv_writer.flush().map_err(export_error)?;
    Ok(())
}

/// Name of the JSON run report written next to the CSV tables.
pub const RUN_REPORT_FILE: &str = "run.json";

/// Writes each table to `<dir>/<stem>.csv` plus the full run as
/// [`RUN_REPORT_FILE`], creating `dir` if needed.
///
/// Stems come from [`table_file_stem`]; clashes get a `_2`, `_3`, ...
/// suffix. Returns the written paths, report last.
pub fn write_csv_directory<P: AsRef<Path>>(
    tables: &[ExportTable],
    run: &PayrollRun,
    dir: P,
) -> EngineResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(export_error)?;

    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(tables.len() + 1);
    for table in tables {
        let base = table_file_stem(&table.name);
        let mut stem = base.clone();
        let mut n = 2;
        while !used.insert(stem.clone()) {
            stem = format!("{}_{}", base, n);
            n += 1;
        }
        let path = dir.join(format!("{}.csv", stem));
        let mut writer = BufWriter::new(File::create(&path).map_err(export_error)?);
        write_csv(table, &mut writer)?;
        writer.flush().map_err(export_error)?;
        written.push(path);
    }

    let path = dir.join(RUN_REPORT_FILE);
    let mut writer = BufWriter::new(File::create(&path).map_err(export_error)?);
    serde_json::to_writer_pretty(&mut writer, run).map_err(export_error)?;
    writer.flush().map_err(export_error)?;
    written.push(path);

    Ok(written)
}

/// Writes tables as worksheets of one XLSX workbook.
///
/// Sheet names are made valid for Excel (no `[]:*?/\`, at most 31
/// characters) and unique.
pub fn write_workbook<W: Write>(tables: &[ExportTable], mut writer: W) -> EngineResult<()> {
    let mut workbook = build_workbook(tables).map_err(export_error)?;
    let buffer = workbook.save_to_buffer().map_err(export_error)?;
    writer.write_all(&buffer).map_err(export_error)?;
    Ok(())
}

/// Writes tables to an XLSX file. See [`write_workbook`].
pub fn write_workbook_path<P: AsRef<Path>>(tables: &[ExportTable], path: P) -> EngineResult<()> {
    let mut workbook = build_workbook(tables).map_err(export_error)?;
    workbook.save(path.as_ref()).map_err(export_error)?;
    Ok(())
}

fn build_workbook(tables: &[ExportTable]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let mut used = HashSet::new();

    for table in tables {
        let sheet_name = unique_sheet_name(&table.name, &mut used);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name.as_str())?;

        for (col, title) in table.header.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, title.as_str(), &header_format)?;
        }
        for (r, row) in table.rows.iter().enumerate() {
            let row_num = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let col = c as u16;
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string(row_num, col, text.as_str())?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(row_num, col, value.to_f64().unwrap_or_default())?;
                    }
                    Cell::Bool(flag) => {
                        worksheet.write_boolean(row_num, col, *flag)?;
                    }
                    Cell::Empty => {}
                }
            }
        }
    }

    Ok(workbook)
}

/// Makes a name valid as an Excel sheet name.
///
/// # Example
///
/// ```
/// use payroll_engine::io::sanitize_sheet_name;
///
/// assert_eq!(sanitize_sheet_name("batch 1 - A/B"), "batch 1 - A_B");
/// assert_eq!(sanitize_sheet_name("  "), "Sheet");
/// assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), 31);
/// ```
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let trimmed = replaced.trim().trim_matches('\'');
    let truncated: String = trimmed.chars().take(MAX_SHEET_NAME_LEN).collect();
    if truncated.trim().is_empty() {
        "Sheet".to_string()
    } else {
        truncated
    }
}

/// Makes a file-system safe stem for a table written as CSV.
pub fn table_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "table".to_string()
    } else {
        stem
    }
}

fn unique_sheet_name(name: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_sheet_name(name);
    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({})", n);
        let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}

fn export_error(err: impl std::fmt::Display) -> EngineError {
    EngineError::ExportFailed {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmploymentStatus, ItemizedPayRecord, PayrollTotals, SourceRow};
    use chrono::NaiveDateTime;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn payroll(batch: &str, source: SourceRow) -> EmployeePayroll {
        let clock_in =
            NaiveDateTime::parse_from_str("2026-01-05 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let clock_out =
            NaiveDateTime::parse_from_str("2026-01-05 18:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        EmployeePayroll {
            batch: batch.to_string(),
            employee_name: "Alex".to_string(),
            status: EmploymentStatus::PartTime,
            records: vec![ItemizedPayRecord {
                source,
                employee_name: "Alex".to_string(),
                clock_in,
                clock_out,
                adjusted_hours: dec("8"),
                hourly_rate: dec("10"),
                regular_hours: dec("8"),
                overtime_hours: dec("0"),
                is_holiday: false,
                regular_pay: dec("80"),
                overtime_pay: dec("0"),
                total_pay: dec("80"),
                audit_steps: vec![],
            }],
            totals: PayrollTotals {
                employee_name: "Alex".to_string(),
                status: EmploymentStatus::PartTime,
                shift_count: 1,
                regular_pay: dec("80"),
                overtime_pay: dec("0"),
                total_pay: dec("80"),
            },
        }
    }

    #[test]
    fn test_table_layout() {
        let source = SourceRow::from_pairs([
            ("Site", "North"),
            ("Name", "Alex"),
            ("Clock In", "2026-01-05 09:00:00"),
            ("Clock Out", "2026-01-05 18:00:00"),
        ]);
        let table = payroll_table(&payroll("batch 1", source), "TOTAL");

        assert_eq!(table.name, "batch 1 - Alex");
        assert_eq!(&table.header[..4], &["Site", "Name", "Clock In", "Clock Out"]);
        assert_eq!(&table.header[4..], &DERIVED_COLUMNS.map(String::from)[..]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][5], Cell::Number(dec("10")));
        assert_eq!(table.rows[0][8], Cell::Bool(false));

        let totals = &table.rows[1];
        assert_eq!(totals[1], Cell::Text("TOTAL".to_string()));
        assert_eq!(totals[0], Cell::Empty);
        assert_eq!(totals[11], Cell::Number(dec("80")));
    }

    #[test]
    fn test_name_is_prepended_and_filled_when_missing() {
        let source = SourceRow::from_pairs([
            ("Clock In", "2026-01-05 09:00:00"),
            ("Clock Out", "2026-01-05 18:00:00"),
        ]);
        let table = payroll_table(&payroll("Alex", source), "Sum");
        assert_eq!(table.name, "Alex");
        assert_eq!(table.header[0], "Name");
        assert_eq!(table.rows[0][0], Cell::Text("Alex".to_string()));
        assert_eq!(table.rows[1][0], Cell::Text("Sum".to_string()));
    }

    #[test]
    fn test_write_csv() {
        let source = SourceRow::from_pairs([
            ("Name", "Alex"),
            ("Clock In", "2026-01-05 09:00:00"),
            ("Clock Out", "2026-01-05 18:00:00"),
        ]);
        let table = payroll_table(&payroll("batch 1", source), "TOTAL");
        let mut buffer = Vec::new();
        write_csv(&table, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Name,Clock In,Clock Out,Adjusted Hours,Hourly Rate,Regular Hours,Overtime Hours,Is Public Holiday,Regular Pay,Overtime Pay,Total Pay"
        );
        assert_eq!(
            lines[1],
            "Alex,2026-01-05 09:00:00,2026-01-05 18:00:00,8,10,8,0,false,80,0,80"
        );
        assert_eq!(lines[2], "TOTAL,,,,,,,,80,0,80");
    }

    #[test]
    fn test_sheet_names_are_unique_case_insensitively() {
        let mut used = HashSet::new();
        assert_eq!(unique_sheet_name("Alex", &mut used), "Alex");
        assert_eq!(unique_sheet_name("alex", &mut used), "alex (2)");
        let long = "y".repeat(40);
        let first = unique_sheet_name(&long, &mut used);
        let second = unique_sheet_name(&long, &mut used);
        assert_eq!(first.chars().count(), 31);
        assert_eq!(second.chars().count(), 31);
        assert!(second.ends_with(" (2)"));
    }

    #[test]
    fn test_table_file_stem() {
        assert_eq!(table_file_stem("batch 1 - Alex"), "batch_1_-_Alex");
        assert_eq!(table_file_stem(""), "table");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(Cell::Number(dec("12.500")).to_text(), "12.5");
        assert_eq!(Cell::Bool(true).to_text(), "true");
        assert_eq!(Cell::Empty.to_text(), "");
    }
}
