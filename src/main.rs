use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payroll_engine::api::{AppState, create_router};
use payroll_engine::calculation::PayrollEngine;
use payroll_engine::config::{ConfigLoader, PayrollConfig, ShiftHoursPolicy};
use payroll_engine::error::EngineResult;
use payroll_engine::io::{
    open_source, read_employee_directory, read_holiday_calendar, read_timesheet_csv,
    read_timesheet_workbook, run_tables, write_csv_directory, write_workbook_path,
};
use payroll_engine::models::{HolidayCalendar, TimesheetBatch};

const DEFAULT_CONFIG_PATH: &str = "config/payroll.yaml";

#[derive(Parser)]
#[command(name = "payroll-engine", version, about = "Compute payroll from timesheets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute payroll from files and write the results.
    Run(RunArgs),
    /// Serve the JSON API.
    Serve(ServeArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Employee directory CSV.
    #[arg(long)]
    employees: PathBuf,
    /// Timesheet CSV or XLSX workbook.
    #[arg(long)]
    timesheet: PathBuf,
    /// Holiday calendar, one YYYY-MM-DD per line.
    #[arg(long)]
    holidays: Option<PathBuf>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Built-in shift-hours profile, overriding the configuration.
    #[arg(long)]
    profile: Option<String>,
    /// Output directory for CSV tables, or an .xlsx file.
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(args).map_err(|e| e.to_string()),
        Command::Serve(args) => serve(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(error = %message, "payroll-engine failed");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> EngineResult<PayrollConfig> {
    match path {
        Some(path) => ConfigLoader::load(path).map(ConfigLoader::into_config),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            ConfigLoader::load(DEFAULT_CONFIG_PATH).map(ConfigLoader::into_config)
        }
        None => Ok(PayrollConfig::default()),
    }
}

fn run(args: RunArgs) -> EngineResult<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(profile) = &args.profile {
        config.shift_hours = ShiftHoursPolicy::named(profile)?;
    }

    let (directory, directory_warnings) = read_employee_directory(
        open_source(&args.employees)?,
        &args.employees.display().to_string(),
    )?;

    let calendar = match &args.holidays {
        Some(path) => read_holiday_calendar(open_source(path)?, &path.display().to_string())?,
        None => HolidayCalendar::new(),
    };

    let batches = read_batches(&args.timesheet)?;
    let totals_label = config.totals_label.clone();

    let engine = PayrollEngine::new(config, directory, calendar);
    let mut run = engine.run(&batches);
    let mut warnings = directory_warnings;
    warnings.append(&mut run.warnings);
    run.warnings = warnings;

    let tables = run_tables(&run, &totals_label);
    if has_extension(&args.output, &["xlsx"]) {
        write_workbook_path(&tables, &args.output)?;
    } else {
        write_csv_directory(&tables, &run, &args.output)?;
    }

    for payroll in &run.payrolls {
        println!(
            "{}\t{}\t{}\t{}",
            payroll.batch,
            payroll.employee_name,
            payroll.totals.shift_count,
            payroll.totals.total_pay.round_dp(2)
        );
    }
    info!(
        run_id = %run.run_id,
        payrolls = run.payrolls.len(),
        warnings = run.warnings.len(),
        output = %args.output.display(),
        "Wrote payroll results"
    );
    Ok(())
}

fn read_batches(path: &Path) -> EngineResult<Vec<TimesheetBatch>> {
    let source_name = path.display().to_string();
    if has_extension(path, &["xlsx", "xlsm"]) {
        read_timesheet_workbook(open_source(path)?, &source_name)
    } else {
        read_timesheet_csv(open_source(path)?, &source_name).map(|batch| vec![batch])
    }
}

async fn serve(args: ServeArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref()).map_err(|e| e.to_string())?;
    let app = create_router(AppState::new(config));

    let listener = TcpListener::bind(&args.addr)
        .await
        .map_err(|e| format!("failed to bind {}: {}", args.addr, e))?;
    info!(addr = %args.addr, "Payroll API listening");

    axum::serve(listener, app).await.map_err(|e| e.to_string())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}
