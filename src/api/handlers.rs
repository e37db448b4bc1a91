//! The `/payroll` endpoint.
//!
//! A request is parsed, validated into engine inputs, and run on the
//! blocking pool; every log line carries the request's correlation id.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::PayrollEngine;

use super::request::PayrollRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Builds the router serving `POST /payroll`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll", post(payroll_handler))
        .with_state(state)
}

/// Handler for POST /payroll endpoint.
///
/// Accepts employees, holidays and timesheet batches and returns the
/// complete payroll run.
async fn payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = rejection_error(&rejection);
            warn!(
                correlation_id = %correlation_id,
                code = %error.code,
                error = %rejection.body_text(),
                "Rejected payroll request body"
            );
            return json_response(StatusCode::BAD_REQUEST, error.correlated(correlation_id));
        }
    };

    let prepared = match request.prepare(state.config()) {
        Ok(prepared) => prepared,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Invalid payroll request"
            );
            let api_error: ApiErrorResponse = err.into();
            return json_response(api_error.status, api_error.error.correlated(correlation_id));
        }
    };

    let directory_warnings = prepared.directory_warnings;
    let batches = prepared.batches;
    let engine = PayrollEngine::new(prepared.config, prepared.directory, prepared.calendar);

    // Blocks until every batch thread has finished.
    let joined = tokio::task::spawn_blocking(move || engine.run(&batches)).await;

    match joined {
        Ok(mut run) => {
            let mut warnings = directory_warnings;
            warnings.append(&mut run.warnings);
            run.warnings = warnings;
            info!(
                correlation_id = %correlation_id,
                run_id = %run.run_id,
                payrolls = run.payrolls.len(),
                warnings = run.warnings.len(),
                duration_us = run.duration_us,
                "Payroll request completed"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(run),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Payroll run failed"
            );
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::run_failed(err.to_string()).correlated(correlation_id),
            )
        }
    }
}

/// Maps a body extraction failure to an API error.
///
/// Deserialization failures naming a missing field are validation errors;
/// every other shape or syntax problem is malformed JSON.
fn rejection_error(rejection: &JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => ApiError::missing_content_type(),
        JsonRejection::JsonDataError(data) if data.body_text().contains("missing field") => {
            ApiError::validation_error(data.body_text())
        }
        JsonRejection::JsonDataError(data) => ApiError::malformed_json(data.body_text()),
        JsonRejection::JsonSyntaxError(syntax) => {
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", syntax.body_text()))
        }
        other => ApiError::malformed_json(other.body_text()),
    }
}

fn json_response(status: StatusCode, error: ApiError) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}
