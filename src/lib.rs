//! Payroll computation engine.
//!
//! This crate turns raw clock-in/clock-out records into itemized pay: break
//! deductions and rounding, a regular/overtime split, public holiday
//! premiums, a full-time salary to hourly rate conversion, and per-employee
//! totals. Inputs and outputs are CSV or XLSX files, a JSON HTTP endpoint,
//! or the library API directly.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
