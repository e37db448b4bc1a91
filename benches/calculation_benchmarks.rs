//! Performance benchmarks for the payroll engine.
//!
//! This benchmark suite covers:
//! - Itemizing a single shift through all four rules
//! - A run over one batch of a month of shifts
//! - A run over 100 labeled batches
//! - Scaling with the number of batches processed in parallel
//! - CSV export of a month of shifts
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use payroll_engine::calculation::PayrollEngine;
use payroll_engine::config::PayrollConfig;
use payroll_engine::io::{payroll_table, write_csv};
use payroll_engine::models::{
    Employee, EmployeeDirectory, HolidayCalendar, PayBasis, Shift, SourceRow, TimesheetBatch,
};

const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Creates a directory of `count` employees, alternating part-time and full-time.
fn create_directory(count: usize) -> EmployeeDirectory {
    (0..count)
        .map(|i| Employee {
            name: format!("emp_{:04}", i),
            pay_basis: if i % 2 == 0 {
                PayBasis::PartTime {
                    hourly_rate: decimal("24.50"),
                }
            } else {
                PayBasis::FullTime {
                    base_salary: decimal("4200"),
                }
            },
            overtime_threshold: None,
        })
        .collect()
}

fn create_engine(employees: usize) -> PayrollEngine {
    let calendar = HolidayCalendar::parse("2026-01-01\n2026-01-26\n").unwrap();
    PayrollEngine::new(PayrollConfig::default(), create_directory(employees), calendar)
}

fn shift_start(day: i64) -> NaiveDateTime {
    let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + Duration::days(day % 31);
    date.and_hms_opt(8, 30, 0).unwrap()
}

/// Creates `shift_count` rows of 9.5h shifts on consecutive January days.
fn create_rows(name: &str, shift_count: usize) -> Vec<SourceRow> {
    (0..shift_count as i64)
        .map(|day| {
            let start = shift_start(day);
            let end = start + Duration::minutes(570);
            SourceRow::from_pairs([
                ("Name", name.to_string()),
                ("Clock In", start.format(TIMESTAMP).to_string()),
                ("Clock Out", end.format(TIMESTAMP).to_string()),
                ("Site", "North".to_string()),
            ])
        })
        .collect()
}

fn create_batches(batch_count: usize, shifts_per_batch: usize) -> Vec<TimesheetBatch> {
    (0..batch_count)
        .map(|i| {
            let name = format!("emp_{:04}", i);
            let rows = create_rows("", shifts_per_batch);
            TimesheetBatch::labeled(name, rows)
        })
        .collect()
}

/// Benchmark: One shift through the four calculation rules.
fn bench_single_shift(c: &mut Criterion) {
    let engine = create_engine(2);
    let start = shift_start(4);
    let shift = Shift::new("emp_0001", start, start + Duration::minutes(600), SourceRow::new())
        .unwrap();

    c.bench_function("single_shift", |b| {
        b.iter(|| black_box(engine.itemize_shift(black_box(&shift)).unwrap()))
    });
}

/// Benchmark: One unlabeled batch holding a month of shifts.
fn bench_month_batch(c: &mut Criterion) {
    let engine = create_engine(2);
    let batches = vec![TimesheetBatch::unlabeled(create_rows("emp_0000", 31))];

    let mut group = c.benchmark_group("month_batch");
    group.throughput(Throughput::Elements(31));
    group.bench_function("shifts_31", |b| b.iter(|| black_box(engine.run(&batches))));
    group.finish();
}

/// Benchmark: 100 labeled batches of 22 shifts each.
fn bench_batch_100(c: &mut Criterion) {
    let engine = create_engine(100);
    let batches = create_batches(100, 22);

    let mut group = c.benchmark_group("batch_processing");
    group.throughput(Throughput::Elements(100 * 22));
    group.sample_size(20);
    group.bench_function("batch_100", |b| b.iter(|| black_box(engine.run(&batches))));
    group.finish();
}

/// Benchmark: Various batch counts to understand parallel scaling.
fn bench_scaling(c: &mut Criterion) {
    let engine = create_engine(64);

    let mut group = c.benchmark_group("scaling");
    for batch_count in [1, 2, 4, 16, 64].iter() {
        let batches = create_batches(*batch_count, 22);
        group.throughput(Throughput::Elements((*batch_count * 22) as u64));
        group.bench_with_input(
            BenchmarkId::new("batches", batch_count),
            &batches,
            |b, batches| b.iter(|| black_box(engine.run(batches))),
        );
    }
    group.finish();
}

/// Benchmark: Building and writing the CSV table for a month of shifts.
fn bench_csv_export(c: &mut Criterion) {
    let engine = create_engine(2);
    let run = engine.run(&[TimesheetBatch::labeled("emp_0000", create_rows("", 31))]);
    let payroll = &run.payrolls[0];

    c.bench_function("csv_export_31", |b| {
        b.iter(|| {
            let table = payroll_table(payroll, "TOTAL");
            let mut buffer = Vec::with_capacity(8 * 1024);
            write_csv(&table, &mut buffer).unwrap();
            black_box(buffer)
        })
    });
}

criterion_group!(
    benches,
    bench_single_shift,
    bench_month_batch,
    bench_batch_100,
    bench_scaling,
    bench_csv_export,
);
criterion_main!(benches);
