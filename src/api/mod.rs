//! HTTP API module for the payroll engine.
//!
//! This module provides the `POST /payroll` endpoint, which computes a full
//! payroll run from JSON inputs.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{PayrollRequest, PreparedRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
