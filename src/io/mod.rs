//! Tabular input and output.
//!
//! Readers turn CSV and XLSX sources into directory records, a holiday
//! calendar and timesheet batches; writers turn payroll results back into
//! CSV files or an XLSX workbook.

mod export;
mod readers;

pub use export::{
    Cell, DERIVED_COLUMNS, ExportTable, RUN_REPORT_FILE, payroll_table, run_tables,
    sanitize_sheet_name, table_file_stem, write_csv, write_csv_directory, write_workbook,
    write_workbook_path,
};
pub use readers::{
    open_source, read_employee_directory, read_holiday_calendar, read_timesheet_csv,
    read_timesheet_workbook, read_timesheet_workbook_path,
};
