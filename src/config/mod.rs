//! Configuration loading and management for the payroll engine.
//!
//! This module provides the break-deduction and rounding policy, timestamp
//! formats, holiday premium schedules, and loading of all of them from YAML.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll.yaml").unwrap();
//! println!("Totals label: {}", config.config().totals_label);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BreakTier, CELL_TIMESTAMP_PATTERN, DEFAULT_OVERTIME_THRESHOLD, DEFAULT_TOTALS_LABEL,
    PROFILE_NAMES, PayrollConfig, PayrollConfigFile, PremiumConfig, PremiumSchedule,
    RoundingMode, ShiftHoursOverrides, ShiftHoursPolicy, TimestampFormat,
};
