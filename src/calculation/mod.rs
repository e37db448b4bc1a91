//! Calculation logic for the payroll engine.
//!
//! This module contains the adjusted-hours rule, working day counting, rate
//! derivation and overtime splitting, holiday detection, holiday premiums,
//! per-employee aggregation, and the [`PayrollEngine`] that ties them
//! together.

mod aggregation;
mod engine;
mod holiday_detection;
mod holiday_premium;
mod pay_rate;
mod shift_hours;
mod working_days;

pub use aggregation::aggregate_totals;
pub use engine::{BatchOutcome, PayrollEngine};
pub use holiday_detection::{HolidayDetection, detect_holiday};
pub use holiday_premium::{PremiumPayResult, apply_holiday_premium};
pub use pay_rate::{HOURS_PER_WORKING_DAY, RateSplitResult, rate_and_split, split_hours};
pub use shift_hours::{AdjustedHoursResult, calculate_adjusted_hours};
pub use working_days::{EXCLUDED_WEEKDAY, working_days_in_month};
