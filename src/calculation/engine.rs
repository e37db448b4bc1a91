//! The payroll engine.
//!
//! [`PayrollEngine`] holds the read-only inputs of a run (configuration,
//! employee directory and holiday calendar) and turns timesheet batches into
//! itemized records and per-employee totals. Shift and batch failures are
//! downgraded to [`RunWarning`]s so one bad row never aborts a run.

use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, EmployeeDirectory, EmployeePayroll, HolidayCalendar, ItemizedPayRecord, NAME_COLUMN,
    PayrollRun, RunWarning, Shift, SourceRow, TimesheetBatch,
};

use super::aggregation::aggregate_totals;
use super::holiday_detection::detect_holiday;
use super::holiday_premium::apply_holiday_premium;
use super::pay_rate::rate_and_split;
use super::shift_hours::calculate_adjusted_hours;

/// Everything produced for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// One payroll per employee with at least one valid shift.
    pub payrolls: Vec<EmployeePayroll>,
    /// Warnings for skipped rows, employees or the whole batch.
    pub warnings: Vec<RunWarning>,
}

/// Computes payroll from timesheet batches.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::PayrollEngine;
/// use payroll_engine::config::PayrollConfig;
/// use payroll_engine::models::{
///     Employee, EmployeeDirectory, HolidayCalendar, PayBasis, SourceRow, TimesheetBatch,
/// };
/// use rust_decimal::Decimal;
///
/// let directory: EmployeeDirectory = [Employee {
///     name: "Alex".to_string(),
///     pay_basis: PayBasis::PartTime { hourly_rate: Decimal::new(10, 0) },
///     overtime_threshold: None,
/// }]
/// .into_iter()
/// .collect();
///
/// let engine = PayrollEngine::new(PayrollConfig::default(), directory, HolidayCalendar::new());
/// let batch = TimesheetBatch::unlabeled(vec![SourceRow::from_pairs([
///     ("Name", "Alex"),
///     ("Clock In", "2026-01-05 09:00:00"),
///     ("Clock Out", "2026-01-05 18:00:00"),
/// ])]);
///
/// let run = engine.run(&[batch]);
/// let payroll = run.payroll_for("batch 1", "Alex").unwrap();
/// assert_eq!(payroll.totals.total_pay, Decimal::new(80, 0));
/// ```
#[derive(Debug, Clone)]
pub struct PayrollEngine {
    config: PayrollConfig,
    directory: EmployeeDirectory,
    calendar: HolidayCalendar,
}

impl PayrollEngine {
    /// Creates an engine over read-only inputs.
    pub fn new(
        config: PayrollConfig,
        directory: EmployeeDirectory,
        calendar: HolidayCalendar,
    ) -> Self {
        Self {
            config,
            directory,
            calendar,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the employee directory.
    pub fn directory(&self) -> &EmployeeDirectory {
        &self.directory
    }

    /// Returns the holiday calendar.
    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    /// Itemizes one shift, resolving the employee by name.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownEmployee`] if the name is not in the directory,
    /// or [`EngineError::MalformedTimestamp`] if the shift has no duration.
    pub fn itemize_shift(&self, shift: &Shift) -> EngineResult<ItemizedPayRecord> {
        let employee = self.directory.lookup(&shift.employee_name)?;
        self.itemize_for(employee, shift)
    }

    /// Itemizes one shift for an already resolved employee.
    pub fn itemize_for(
        &self,
        employee: &Employee,
        shift: &Shift,
    ) -> EngineResult<ItemizedPayRecord> {
        let mut audit_steps = Vec::with_capacity(4);

        let hours = calculate_adjusted_hours(
            shift.clock_in,
            shift.clock_out,
            &self.config.shift_hours,
            1,
        )?;
        audit_steps.push(hours.audit_step);

        let split = rate_and_split(
            employee,
            hours.adjusted_hours,
            shift.clock_in,
            self.config.default_overtime_threshold,
            2,
        );
        audit_steps.push(split.audit_step);

        let holiday = detect_holiday(shift.clock_in, &self.calendar, 3);
        audit_steps.push(holiday.audit_step);

        let pay = apply_holiday_premium(
            employee,
            split.hourly_rate,
            split.regular_hours,
            split.overtime_hours,
            holiday.is_holiday,
            &self.config.premiums,
            4,
        );
        audit_steps.push(pay.audit_step);

        let total_pay = pay.regular_pay + pay.overtime_pay;

        debug!(
            employee = %employee.name,
            clock_in = %shift.clock_in,
            adjusted_hours = %hours.adjusted_hours,
            regular_hours = %split.regular_hours,
            overtime_hours = %split.overtime_hours,
            is_holiday = holiday.is_holiday,
            total_pay = %total_pay,
            "Itemized shift"
        );

        Ok(ItemizedPayRecord {
            source: shift.source.clone(),
            employee_name: employee.name.clone(),
            clock_in: shift.clock_in,
            clock_out: shift.clock_out,
            adjusted_hours: hours.adjusted_hours,
            hourly_rate: split.hourly_rate,
            regular_hours: split.regular_hours,
            overtime_hours: split.overtime_hours,
            is_holiday: holiday.is_holiday,
            regular_pay: pay.regular_pay,
            overtime_pay: pay.overtime_pay,
            total_pay,
            audit_steps,
        })
    }

    /// Processes one batch.
    ///
    /// A labeled batch is joined to the directory by its label; an unlabeled
    /// batch is grouped by each row's `Name` in order of first appearance.
    /// `index` is the batch's position in the run, used to name unlabeled
    /// batches.
    pub fn process_batch(&self, batch: &TimesheetBatch, index: usize) -> BatchOutcome {
        let batch_name = batch.display_name(index);
        let mut outcome = BatchOutcome::default();

        match &batch.label {
            Some(label) => self.process_labeled(label.trim(), &batch_name, batch, &mut outcome),
            None => self.process_unlabeled(&batch_name, batch, &mut outcome),
        }

        outcome
    }

    /// Runs every batch and collects the results.
    ///
    /// Batches are computed concurrently on a bounded pool of scoped threads;
    /// results keep batch order.
    pub fn run(&self, batches: &[TimesheetBatch]) -> PayrollRun {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!(
            run_id = %run_id,
            batches = batches.len(),
            employees = self.directory.len(),
            holidays = self.calendar.len(),
            "Starting payroll run"
        );

        let outcomes = self.process_all(batches, &run_id);

        let mut payrolls = Vec::new();
        let mut warnings = Vec::new();
        for outcome in outcomes {
            payrolls.extend(outcome.payrolls);
            warnings.extend(outcome.warnings);
        }

        let duration_us = started.elapsed().as_micros() as u64;
        info!(
            run_id = %run_id,
            payrolls = payrolls.len(),
            warnings = warnings.len(),
            duration_us,
            "Payroll run completed"
        );

        PayrollRun {
            run_id,
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            payrolls,
            warnings,
            duration_us,
        }
    }

    /// Processes batches on at most `available_parallelism` scoped workers.
    ///
    /// Workers pull the next batch index from a shared counter and the
    /// calling thread works alongside them, so the run completes even when no
    /// extra thread can be spawned. A panicking batch becomes a
    /// `BATCH_FAILED` warning.
    fn process_all(&self, batches: &[TimesheetBatch], run_id: &Uuid) -> Vec<BatchOutcome> {
        let next = AtomicUsize::new(0);
        let worker_count = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
            .min(batches.len());

        let work = || {
            let mut done = Vec::new();
            loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(batch) = batches.get(index) else {
                    break;
                };
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    self.process_batch(batch, index)
                }))
                .unwrap_or_else(|_| failed_batch(batch, index, run_id));
                done.push((index, outcome));
            }
            done
        };

        let mut slots: Vec<Option<BatchOutcome>> = vec![None; batches.len()];
        thread::scope(|scope| {
            let mut handles = Vec::new();
            for worker in 1..worker_count {
                match thread::Builder::new()
                    .name(format!("payroll-worker-{}", worker))
                    .spawn_scoped(scope, &work)
                {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        warn!(
                            run_id = %run_id,
                            workers = worker,
                            error = %err,
                            "Could not start batch worker"
                        );
                        break;
                    }
                }
            }

            for (index, outcome) in work() {
                slots[index] = Some(outcome);
            }
            for handle in handles {
                if let Ok(done) = handle.join() {
                    for (index, outcome) in done {
                        slots[index] = Some(outcome);
                    }
                }
            }
        });

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| failed_batch(&batches[index], index, run_id))
            })
            .collect()
    }

    fn process_labeled(
        &self,
        label: &str,
        batch_name: &str,
        batch: &TimesheetBatch,
        outcome: &mut BatchOutcome,
    ) {
        let employee = match self.directory.lookup(label) {
            Ok(employee) => employee,
            Err(err) => {
                warn!(batch = %batch_name, error = %err, "Skipping batch");
                outcome
                    .warnings
                    .push(RunWarning::from_error(&err).in_batch(batch_name));
                return;
            }
        };

        let mut rows = Vec::with_capacity(batch.rows.len());
        for (i, row) in batch.rows.iter().enumerate() {
            if row.is_blank() {
                continue;
            }
            let row_name = row_name(row);
            if !row_name.is_empty() && row_name != label {
                let err = EngineError::BatchLabelMismatch {
                    label: label.to_string(),
                    row_name: row_name.to_string(),
                };
                self.downgrade(&err, batch_name, i + 1, outcome);
                continue;
            }
            rows.push((i + 1, row));
        }

        self.itemize_group(employee, &rows, batch_name, outcome);
    }

    fn process_unlabeled(
        &self,
        batch_name: &str,
        batch: &TimesheetBatch,
        outcome: &mut BatchOutcome,
    ) {
        let mut groups: Vec<(&str, Vec<(usize, &SourceRow)>)> = Vec::new();
        for (i, row) in batch.rows.iter().enumerate() {
            if row.is_blank() {
                continue;
            }
            let name = row_name(row);
            if name.is_empty() {
                let err = EngineError::UnknownEmployee {
                    name: String::new(),
                };
                self.downgrade(&err, batch_name, i + 1, outcome);
                continue;
            }
            match groups.iter_mut().find(|(n, _)| *n == name) {
                Some((_, rows)) => rows.push((i + 1, row)),
                None => groups.push((name, vec![(i + 1, row)])),
            }
        }

        for (name, rows) in groups {
            match self.directory.lookup(name) {
                Ok(employee) => self.itemize_group(employee, &rows, batch_name, outcome),
                Err(err) => {
                    let first_row = rows.first().map(|(n, _)| *n).unwrap_or(1);
                    self.downgrade(&err, batch_name, first_row, outcome);
                }
            }
        }
    }

    fn itemize_group(
        &self,
        employee: &Employee,
        rows: &[(usize, &SourceRow)],
        batch_name: &str,
        outcome: &mut BatchOutcome,
    ) {
        let mut records = Vec::with_capacity(rows.len());
        for (row_number, row) in rows {
            let result = Shift::from_row(
                (*row).clone(),
                Some(&employee.name),
                &self.config.timestamp_format,
            )
            .and_then(|shift| self.itemize_for(employee, &shift));

            match result {
                Ok(record) => records.push(record),
                Err(err) => self.downgrade(&err, batch_name, *row_number, outcome),
            }
        }

        if let Some(totals) = aggregate_totals(employee, &records) {
            outcome.payrolls.push(EmployeePayroll {
                batch: batch_name.to_string(),
                employee_name: employee.name.clone(),
                status: employee.status(),
                records,
                totals,
            });
        }
    }

    fn downgrade(
        &self,
        err: &EngineError,
        batch_name: &str,
        row: usize,
        outcome: &mut BatchOutcome,
    ) {
        warn!(batch = %batch_name, row, code = err.code(), error = %err, "Skipping row");
        outcome
            .warnings
            .push(RunWarning::from_error(err).in_batch(batch_name).at_row(row));
    }
}

fn failed_batch(batch: &TimesheetBatch, index: usize, run_id: &Uuid) -> BatchOutcome {
    let batch_name = batch.display_name(index);
    warn!(run_id = %run_id, batch = %batch_name, "Batch processing panicked");
    BatchOutcome {
        payrolls: Vec::new(),
        warnings: vec![
            RunWarning::new("BATCH_FAILED", "batch processing panicked").in_batch(batch_name),
        ],
    }
}

fn row_name(row: &SourceRow) -> &str {
    row.get(NAME_COLUMN).unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PayBasis;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(name: &str, clock_in: &str, clock_out: &str) -> SourceRow {
        SourceRow::from_pairs([
            ("Name", name),
            ("Clock In", clock_in),
            ("Clock Out", clock_out),
        ])
    }

    fn engine(holidays: &str) -> PayrollEngine {
        let directory: EmployeeDirectory = [
            Employee {
                name: "Alex".to_string(),
                pay_basis: PayBasis::PartTime {
                    hourly_rate: dec("10"),
                },
                overtime_threshold: Some(dec("8")),
            },
            Employee {
                name: "Sam".to_string(),
                pay_basis: PayBasis::FullTime {
                    base_salary: dec("2600"),
                },
                overtime_threshold: None,
            },
        ]
        .into_iter()
        .collect();
        PayrollEngine::new(
            PayrollConfig::default(),
            directory,
            HolidayCalendar::parse(holidays).unwrap(),
        )
    }

    #[test]
    fn test_itemize_shift_records_four_audit_steps() {
        let engine = engine("");
        let shift = Shift::from_row(
            row("Alex", "2026-01-05 09:00:00", "2026-01-05 18:00:00"),
            None,
            &engine.config().timestamp_format,
        )
        .unwrap();
        let record = engine.itemize_shift(&shift).unwrap();

        assert_eq!(record.adjusted_hours, dec("8"));
        assert_eq!(record.regular_pay, dec("80"));
        assert_eq!(record.total_pay, record.regular_pay + record.overtime_pay);
        let rule_ids: Vec<_> = record.audit_steps.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(
            rule_ids,
            vec!["adjusted_hours", "rate_and_split", "holiday_detection", "holiday_premium"]
        );
        assert_eq!(record.source.get("Name"), Some("Alex"));
    }

    #[test]
    fn test_itemize_shift_unknown_employee() {
        let engine = engine("");
        let shift = Shift::from_row(
            row("Dana", "2026-01-05 09:00:00", "2026-01-05 18:00:00"),
            None,
            &engine.config().timestamp_format,
        )
        .unwrap();
        assert!(matches!(
            engine.itemize_shift(&shift),
            Err(EngineError::UnknownEmployee { .. })
        ));
    }

    #[test]
    fn test_unlabeled_batch_groups_by_name_in_first_appearance_order() {
        let engine = engine("");
        let batch = TimesheetBatch::unlabeled(vec![
            row("Sam", "2026-01-05 09:00:00", "2026-01-05 19:00:00"),
            row("Alex", "2026-01-05 09:00:00", "2026-01-05 18:00:00"),
            row("Sam", "2026-01-06 09:00:00", "2026-01-06 17:00:00"),
        ]);
        let outcome = engine.process_batch(&batch, 0);

        assert!(outcome.warnings.is_empty());
        let names: Vec<_> = outcome.payrolls.iter().map(|p| p.employee_name.as_str()).collect();
        assert_eq!(names, vec!["Sam", "Alex"]);
        assert_eq!(outcome.payrolls[0].records.len(), 2);
        assert_eq!(outcome.payrolls[0].batch, "batch 1");
    }

    #[test]
    fn test_unlabeled_unknown_name_warns_once_per_group() {
        let engine = engine("");
        let batch = TimesheetBatch::unlabeled(vec![
            row("Dana", "2026-01-05 09:00:00", "2026-01-05 18:00:00"),
            row("Alex", "2026-01-05 09:00:00", "2026-01-05 18:00:00"),
            row("Dana", "2026-01-06 09:00:00", "2026-01-06 18:00:00"),
        ]);
        let outcome = engine.process_batch(&batch, 2);

        assert_eq!(outcome.payrolls.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].code, "UNKNOWN_EMPLOYEE");
        assert_eq!(outcome.warnings[0].batch.as_deref(), Some("batch 3"));
        assert_eq!(outcome.warnings[0].row, Some(1));
    }

    #[test]
    fn test_blank_name_in_unlabeled_batch_is_warned() {
        let engine = engine("");
        let batch = TimesheetBatch::unlabeled(vec![row(
            " ",
            "2026-01-05 09:00:00",
            "2026-01-05 18:00:00",
        )]);
        let outcome = engine.process_batch(&batch, 0);
        assert!(outcome.payrolls.is_empty());
        assert_eq!(outcome.warnings[0].code, "UNKNOWN_EMPLOYEE");
    }

    #[test]
    fn test_labeled_batch_fills_blank_names_and_skips_mismatches() {
        let engine = engine("");
        let batch = TimesheetBatch::labeled(
            "Alex",
            vec![
                row("", "2026-01-05 09:00:00", "2026-01-05 18:00:00"),
                row("Sam", "2026-01-06 09:00:00", "2026-01-06 18:00:00"),
                row("Alex", "2026-01-07 09:00:00", "2026-01-07 18:00:00"),
            ],
        );
        let outcome = engine.process_batch(&batch, 0);

        assert_eq!(outcome.payrolls.len(), 1);
        let payroll = &outcome.payrolls[0];
        assert_eq!(payroll.batch, "Alex");
        assert_eq!(payroll.records.len(), 2);
        assert_eq!(payroll.records[0].employee_name, "Alex");
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].code, "BATCH_LABEL_MISMATCH");
        assert_eq!(outcome.warnings[0].row, Some(2));
    }

    #[test]
    fn test_labeled_batch_with_unknown_label_is_skipped() {
        let engine = engine("");
        let batch = TimesheetBatch::labeled(
            "Dana",
            vec![row("Dana", "2026-01-05 09:00:00", "2026-01-05 18:00:00")],
        );
        let outcome = engine.process_batch(&batch, 0);
        assert!(outcome.payrolls.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].code, "UNKNOWN_EMPLOYEE");
        assert_eq!(outcome.warnings[0].row, None);
    }

    #[test]
    fn test_malformed_row_is_skipped_and_rest_processed() {
        let engine = engine("");
        let batch = TimesheetBatch::unlabeled(vec![
            row("Alex", "not a time", "2026-01-05 18:00:00"),
            row("Alex", "2026-01-06 18:00:00", "2026-01-06 09:00:00"),
            row("Alex", "2026-01-07 09:00:00", "2026-01-07 18:00:00"),
        ]);
        let outcome = engine.process_batch(&batch, 0);

        assert_eq!(outcome.payrolls[0].records.len(), 1);
        let codes: Vec<_> = outcome.warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(codes, vec!["MALFORMED_TIMESTAMP", "MALFORMED_TIMESTAMP"]);
        assert_eq!(outcome.warnings[1].row, Some(2));
    }

    #[test]
    fn test_employee_with_only_invalid_shifts_has_no_totals() {
        let engine = engine("");
        let batch = TimesheetBatch::unlabeled(vec![row("Sam", "bad", "bad")]);
        let outcome = engine.process_batch(&batch, 0);
        assert!(outcome.payrolls.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_blank_rows_are_ignored() {
        let engine = engine("");
        let batch = TimesheetBatch::unlabeled(vec![
            row("", "", ""),
            row("Alex", "2026-01-05 09:00:00", "2026-01-05 18:00:00"),
        ]);
        let outcome = engine.process_batch(&batch, 0);
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.payrolls.len(), 1);
    }

    #[test]
    fn test_run_keeps_batch_order_and_collects_warnings() {
        let engine = engine("2026-01-01");
        let batches = vec![
            TimesheetBatch::labeled(
                "Sam",
                vec![row("", "2026-01-01 09:00:00", "2026-01-01 18:00:00")],
            ),
            TimesheetBatch::labeled(
                "Dana",
                vec![row("", "2026-01-05 09:00:00", "2026-01-05 18:00:00")],
            ),
            TimesheetBatch::labeled(
                "Alex",
                vec![row("", "2026-01-05 09:00:00", "2026-01-05 18:00:00")],
            ),
        ];
        let run = engine.run(&batches);

        let names: Vec<_> = run.payrolls.iter().map(|p| p.batch.as_str()).collect();
        assert_eq!(names, vec!["Sam", "Alex"]);
        assert_eq!(run.warnings_with_code("UNKNOWN_EMPLOYEE").count(), 1);
        assert_eq!(run.engine_version, env!("CARGO_PKG_VERSION"));

        // Holiday shift for a full-time employee: salary plus 8h at the holiday rate.
        let sam = run.payroll_for("Sam", "Sam").unwrap();
        let rate = dec("2600") / dec("216");
        assert_eq!(
            sam.totals.regular_pay.round_dp(10),
            (dec("2600") + dec("8") * rate).round_dp(10)
        );
    }

    #[test]
    fn test_run_with_more_batches_than_workers_keeps_order() {
        let engine = engine("2026-01-01");
        let batch_count = 64 * thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let batches: Vec<_> = (0..batch_count)
            .map(|i| {
                let (name, day) = if i % 2 == 0 { ("Alex", 5) } else { ("Sam", 6) };
                TimesheetBatch::unlabeled(vec![row(
                    name,
                    &format!("2026-01-{:02} 09:00:00", day),
                    &format!("2026-01-{:02} 18:00:00", day),
                )])
            })
            .collect();

        let run = engine.run(&batches);

        assert!(run.warnings.is_empty());
        assert_eq!(run.payrolls.len(), batch_count);
        for (i, payroll) in run.payrolls.iter().enumerate() {
            assert_eq!(payroll.batch, format!("batch {}", i + 1));
            let expected = if i % 2 == 0 { "Alex" } else { "Sam" };
            assert_eq!(payroll.employee_name, expected);
        }
    }

    #[test]
    fn test_run_with_no_batches() {
        let run = engine("").run(&[]);
        assert!(run.payrolls.is_empty());
        assert!(run.warnings.is_empty());
    }
}
