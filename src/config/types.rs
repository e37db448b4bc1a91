//! Configuration types for payroll computation.
//!
//! This module contains the strongly-typed configuration structures, the
//! built-in shift-hours profiles, and the partial [`PayrollConfigFile`] that is
//! deserialized from YAML and layered over a base configuration.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::EmploymentStatus;

/// How deducted hours are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Floor to a multiple of half an hour.
    FloorHalf,
    /// Round to the nearest half hour; quarter-hour ties round up.
    NearestHalf,
    /// Floor to a whole hour.
    FloorHour,
}

/// One tier of the break-deduction rule.
///
/// A tier matches when the raw duration is below `upper_bound_hours` (or equal
/// to it if `inclusive`). A tier with no bound matches any duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakTier {
    /// Upper bound of raw hours this tier applies to.
    #[serde(default)]
    pub upper_bound_hours: Option<Decimal>,
    /// Whether the upper bound itself belongs to this tier.
    #[serde(default)]
    pub inclusive: bool,
    /// Hours deducted for a matching shift.
    pub deduction_hours: Decimal,
}

impl BreakTier {
    /// A bounded tier.
    pub fn up_to(upper_bound_hours: Decimal, inclusive: bool, deduction_hours: Decimal) -> Self {
        Self {
            upper_bound_hours: Some(upper_bound_hours),
            inclusive,
            deduction_hours,
        }
    }

    /// A tier matching every duration.
    pub fn otherwise(deduction_hours: Decimal) -> Self {
        Self {
            upper_bound_hours: None,
            inclusive: false,
            deduction_hours,
        }
    }

    /// Returns true if the tier applies to `raw_hours`.
    pub fn matches(&self, raw_hours: Decimal) -> bool {
        match self.upper_bound_hours {
            None => true,
            Some(bound) if self.inclusive => raw_hours <= bound,
            Some(bound) => raw_hours < bound,
        }
    }
}

/// Break deduction and rounding rule for converting raw duration into
/// adjusted hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftHoursPolicy {
    /// Shifts longer than this receive a break deduction.
    pub break_eligibility_threshold: Decimal,
    /// Deduction tiers, first match wins.
    pub break_deduction_tiers: Vec<BreakTier>,
    /// Rounding applied after deduction.
    pub rounding_mode: RoundingMode,
}

/// Names of the built-in shift-hours profiles.
pub const PROFILE_NAMES: [&str; 3] = ["standard", "original", "extended_break"];

impl ShiftHoursPolicy {
    /// Half an hour off up to 7h inclusive, one hour beyond; shifts of 4h or
    /// less are exempt; floored to the half hour.
    pub fn standard() -> Self {
        Self {
            break_eligibility_threshold: Decimal::new(4, 0),
            break_deduction_tiers: vec![
                BreakTier::up_to(Decimal::new(7, 0), true, Decimal::new(5, 1)),
                BreakTier::otherwise(Decimal::ONE),
            ],
            rounding_mode: RoundingMode::FloorHalf,
        }
    }

    /// Same tiers as [`standard`](Self::standard) applied to every shift and
    /// floored to the whole hour.
    pub fn original() -> Self {
        Self {
            break_eligibility_threshold: Decimal::ZERO,
            rounding_mode: RoundingMode::FloorHour,
            ..Self::standard()
        }
    }

    /// Half an hour off below 10h, one hour from 10h; shifts of 4h or less are
    /// exempt; rounded to the nearest half hour.
    pub fn extended_break() -> Self {
        Self {
            break_eligibility_threshold: Decimal::new(4, 0),
            break_deduction_tiers: vec![
                BreakTier::up_to(Decimal::new(10, 0), false, Decimal::new(5, 1)),
                BreakTier::otherwise(Decimal::ONE),
            ],
            rounding_mode: RoundingMode::NearestHalf,
        }
    }

    /// Looks up a built-in profile by name.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::{RoundingMode, ShiftHoursPolicy};
    ///
    /// let policy = ShiftHoursPolicy::named("original").unwrap();
    /// assert_eq!(policy.rounding_mode, RoundingMode::FloorHour);
    /// assert!(ShiftHoursPolicy::named("weekly").is_err());
    /// ```
    pub fn named(name: &str) -> EngineResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::standard()),
            "original" => Ok(Self::original()),
            "extended_break" => Ok(Self::extended_break()),
            _ => Err(EngineError::UnknownProfile {
                name: name.to_string(),
            }),
        }
    }
}

impl Default for ShiftHoursPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Timestamp layout of `Clock In` / `Clock Out` values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `2026-01-05 09:00:00`; a `T` separator and missing seconds are accepted.
    #[default]
    Iso,
    /// `05/01/2026 09:00:00`.
    DayFirst,
    /// `Mon 01/05/2026 09:00`. The weekday must agree with the date.
    MonthFirstWeekday,
    /// Any chrono format string.
    Custom(String),
}

const ISO_PATTERNS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Pattern used for native spreadsheet date-times; accepted under every
/// format, with optional fractional seconds.
pub const CELL_TIMESTAMP_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.f";

impl TimestampFormat {
    /// The canonical chrono pattern for this format.
    pub fn pattern(&self) -> &str {
        match self {
            TimestampFormat::Iso => ISO_PATTERNS[0],
            TimestampFormat::DayFirst => "%d/%m/%Y %H:%M:%S",
            TimestampFormat::MonthFirstWeekday => "%a %m/%d/%Y %H:%M",
            TimestampFormat::Custom(pattern) => pattern,
        }
    }

    /// Parses a timestamp.
    ///
    /// Values rendered with [`CELL_TIMESTAMP_PATTERN`] are accepted under any
    /// format.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::TimestampFormat;
    ///
    /// let a = TimestampFormat::DayFirst.parse("05/01/2026 09:00:00").unwrap();
    /// let b = TimestampFormat::MonthFirstWeekday.parse("Mon 01/05/2026 09:00").unwrap();
    /// assert_eq!(a, b);
    /// assert!(TimestampFormat::MonthFirstWeekday.parse("Tue 01/05/2026 09:00").is_err());
    /// ```
    pub fn parse(&self, value: &str) -> EngineResult<NaiveDateTime> {
        let trimmed = value.trim();
        let result = match self {
            TimestampFormat::Iso => ISO_PATTERNS
                .iter()
                .find_map(|pattern| NaiveDateTime::parse_from_str(trimmed, pattern).ok())
                .ok_or_else(|| format!("expected {}", ISO_PATTERNS[0])),
            other => NaiveDateTime::parse_from_str(trimmed, other.pattern())
                .map_err(|e| format!("{} (expected {})", e, other.pattern())),
        };
        result
            .or_else(|message| {
                NaiveDateTime::parse_from_str(trimmed, CELL_TIMESTAMP_PATTERN).map_err(|_| message)
            })
            .map_err(|message| EngineError::MalformedTimestamp {
                value: trimmed.to_string(),
                message,
            })
    }

    /// Formats a timestamp with the canonical pattern.
    pub fn format(&self, value: NaiveDateTime) -> String {
        value.format(self.pattern()).to_string()
    }
}

/// Pay multipliers for one employment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumSchedule {
    /// Regular-hours multiplier on ordinary days.
    pub regular: Decimal,
    /// Overtime multiplier on ordinary days.
    pub overtime: Decimal,
    /// Regular-hours multiplier on public holidays.
    pub holiday_regular: Decimal,
    /// Overtime multiplier on public holidays.
    pub holiday_overtime: Decimal,
}

impl PremiumSchedule {
    /// Returns `(regular, overtime)` multipliers for the day.
    pub fn multipliers(&self, is_holiday: bool) -> (Decimal, Decimal) {
        if is_holiday {
            (self.holiday_regular, self.holiday_overtime)
        } else {
            (self.regular, self.overtime)
        }
    }
}

/// Holiday premium schedules by employment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumConfig {
    /// Part-time: 1 / 1.5 on ordinary days, 2 / 3 on holidays.
    pub part_time: PremiumSchedule,
    /// Full-time: 0 / 1.5 on ordinary days (salary covers ordinary hours),
    /// 1 / 2 on holidays (premium on top of salary).
    pub full_time: PremiumSchedule,
}

impl PremiumConfig {
    /// Returns the schedule for a status.
    pub fn schedule_for(&self, status: EmploymentStatus) -> &PremiumSchedule {
        match status {
            EmploymentStatus::FullTime => &self.full_time,
            EmploymentStatus::PartTime => &self.part_time,
        }
    }
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            part_time: PremiumSchedule {
                regular: Decimal::ONE,
                overtime: Decimal::new(15, 1),
                holiday_regular: Decimal::TWO,
                holiday_overtime: Decimal::new(3, 0),
            },
            full_time: PremiumSchedule {
                regular: Decimal::ZERO,
                overtime: Decimal::new(15, 1),
                holiday_regular: Decimal::ONE,
                holiday_overtime: Decimal::TWO,
            },
        }
    }
}

/// Default overtime threshold in hours.
pub const DEFAULT_OVERTIME_THRESHOLD: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Default label of the totals row.
pub const DEFAULT_TOTALS_LABEL: &str = "TOTAL";

/// The complete, resolved payroll configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollConfig {
    /// Break deduction and rounding rule.
    pub shift_hours: ShiftHoursPolicy,
    /// Timestamp layout of timesheet rows.
    pub timestamp_format: TimestampFormat,
    /// Threshold used when an employee has none.
    pub default_overtime_threshold: Decimal,
    /// Holiday premium schedules.
    pub premiums: PremiumConfig,
    /// `Name` value of the totals row in exports.
    pub totals_label: String,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            shift_hours: ShiftHoursPolicy::standard(),
            timestamp_format: TimestampFormat::Iso,
            default_overtime_threshold: DEFAULT_OVERTIME_THRESHOLD,
            premiums: PremiumConfig::default(),
            totals_label: DEFAULT_TOTALS_LABEL.to_string(),
        }
    }
}

impl PayrollConfig {
    /// Checks that every hour count and multiplier is non-negative.
    ///
    /// Fails with [`EngineError::InvalidConfig`] naming the first offending
    /// setting.
    pub fn validate(&self) -> EngineResult<()> {
        let policy = &self.shift_hours;
        non_negative(
            "shift_hours.break_eligibility_threshold",
            policy.break_eligibility_threshold,
        )?;
        for (i, tier) in policy.break_deduction_tiers.iter().enumerate() {
            if let Some(bound) = tier.upper_bound_hours {
                non_negative(
                    &format!("shift_hours.break_deduction_tiers[{}].upper_bound_hours", i),
                    bound,
                )?;
            }
            non_negative(
                &format!("shift_hours.break_deduction_tiers[{}].deduction_hours", i),
                tier.deduction_hours,
            )?;
        }
        non_negative("default_overtime_threshold", self.default_overtime_threshold)?;
        for (status, schedule) in [
            ("part_time", &self.premiums.part_time),
            ("full_time", &self.premiums.full_time),
        ] {
            for (name, value) in [
                ("regular", schedule.regular),
                ("overtime", schedule.overtime),
                ("holiday_regular", schedule.holiday_regular),
                ("holiday_overtime", schedule.holiday_overtime),
            ] {
                non_negative(&format!("premiums.{}.{}", status, name), value)?;
            }
        }
        Ok(())
    }
}

fn non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::InvalidConfig {
            field: field.to_string(),
            message: format!("{} is negative", value),
        });
    }
    Ok(())
}

/// Partial shift-hours settings; present fields override the profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShiftHoursOverrides {
    /// Overrides the eligibility threshold.
    #[serde(default)]
    pub break_eligibility_threshold: Option<Decimal>,
    /// Overrides the deduction tiers.
    #[serde(default)]
    pub break_deduction_tiers: Option<Vec<BreakTier>>,
    /// Overrides the rounding mode.
    #[serde(default)]
    pub rounding_mode: Option<RoundingMode>,
}

/// A configuration file or request override: every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PayrollConfigFile {
    /// Built-in shift-hours profile to start from.
    #[serde(default)]
    pub profile: Option<String>,
    /// Field-level shift-hours overrides.
    #[serde(default)]
    pub shift_hours: Option<ShiftHoursOverrides>,
    /// Timestamp layout.
    #[serde(default)]
    pub timestamp_format: Option<TimestampFormat>,
    /// Threshold used when an employee has none.
    #[serde(default)]
    pub default_overtime_threshold: Option<Decimal>,
    /// Holiday premium schedules.
    #[serde(default)]
    pub premiums: Option<PremiumConfig>,
    /// `Name` value of the totals row.
    #[serde(default)]
    pub totals_label: Option<String>,
}

impl PayrollConfigFile {
    /// Layers these settings over `base`.
    ///
    /// A profile replaces the base shift-hours policy wholesale; individual
    /// shift-hours fields then override the result.
    pub fn apply_to(self, mut base: PayrollConfig) -> EngineResult<PayrollConfig> {
        if let Some(profile) = &self.profile {
            base.shift_hours = ShiftHoursPolicy::named(profile)?;
        }
        if let Some(overrides) = self.shift_hours {
            if let Some(threshold) = overrides.break_eligibility_threshold {
                base.shift_hours.break_eligibility_threshold = threshold;
            }
            if let Some(tiers) = overrides.break_deduction_tiers {
                base.shift_hours.break_deduction_tiers = tiers;
            }
            if let Some(mode) = overrides.rounding_mode {
                base.shift_hours.rounding_mode = mode;
            }
        }
        if let Some(format) = self.timestamp_format {
            base.timestamp_format = format;
        }
        if let Some(threshold) = self.default_overtime_threshold {
            base.default_overtime_threshold = threshold;
        }
        if let Some(premiums) = self.premiums {
            base.premiums = premiums;
        }
        if let Some(label) = self.totals_label {
            base.totals_label = label;
        }
        base.validate()?;
        Ok(base)
    }
}
