//! Response types for the payroll API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// Error body returned by the payroll API.
///
/// `code` is stable for clients to match on; input problems reuse the
/// engine's warning codes (`UNKNOWN_PROFILE`, `MALFORMED_HOLIDAY_ENTRY`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Underlying cause, when one is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Correlation id of the failed request, matching the server logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl ApiError {
    /// Creates an error with a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            correlation_id: None,
        }
    }

    /// Attaches the underlying cause.
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Tags the error with the request's correlation id.
    pub fn correlated(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// A required request field is missing or has the wrong shape.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// The body is not valid JSON.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// The request did not declare a JSON body.
    pub fn missing_content_type() -> Self {
        Self::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
    }

    /// The payroll run did not complete.
    pub fn run_failed(cause: impl Into<String>) -> Self {
        Self::new("CALCULATION_ERROR", "Payroll run failed").details(cause)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let status = match &error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::ExportFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            EngineError::UnknownProfile { .. }
            | EngineError::InvalidConfig { .. }
            | EngineError::MalformedTimestamp { .. }
            | EngineError::UnknownEmployee { .. }
            | EngineError::InvalidEmployeeRecord { .. }
            | EngineError::MalformedHolidayEntry { .. }
            | EngineError::BatchLabelMismatch { .. }
            | EngineError::MissingColumn { .. }
            | EngineError::SourceRead { .. } => StatusCode::BAD_REQUEST,
        };
        ApiErrorResponse {
            status,
            error: ApiError::new(error.code(), error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_value(ApiError::malformed_json("bad body")).unwrap();
        assert_eq!(json["code"], "MALFORMED_JSON");
        assert_eq!(json["message"], "bad body");
        assert!(json.get("details").is_none());
        assert!(json.get("correlation_id").is_none());
    }

    #[test]
    fn test_run_failed_carries_cause_and_correlation_id() {
        let id = Uuid::new_v4();
        let error = ApiError::run_failed("worker panicked").correlated(id);
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["code"], "CALCULATION_ERROR");
        assert_eq!(json["details"], "worker panicked");
        assert_eq!(json["correlation_id"], id.to_string());
    }

    #[test]
    fn test_input_errors_map_to_bad_request() {
        let api_error: ApiErrorResponse = EngineError::MalformedHolidayEntry {
            line: 3,
            value: "Jan 1".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "MALFORMED_HOLIDAY_ENTRY");
        assert!(api_error.error.message.contains("line 3"));
    }

    #[test]
    fn test_server_errors_map_to_internal_error() {
        let api_error: ApiErrorResponse = EngineError::ConfigNotFound {
            path: "payroll.yaml".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.code, "CONFIG_NOT_FOUND");
    }
}
