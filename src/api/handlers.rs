//! HTTP request handlers for the Voucher Benefit Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::pipeline::{resolve_competence, run_pipeline};

use super::request::RunRequest;
use super::response::{ApiError, ApiErrorResponse, RunResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/runs", post(run_handler))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn bad_request(error: ApiError) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}

/// Handler for POST /runs endpoint.
///
/// Runs the whole pipeline over the posted tables. A run that stops at a
/// stage answers 422 with the same body as a successful one, so the caller
/// still sees the stage statistics and the validator findings.
async fn run_handler(
    State(state): State<AppState>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing run request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") || body_text.contains("unknown variant") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return bad_request(error);
        }
    };

    let config = state.config();
    let competence = match resolve_competence(request.competence.as_deref(), config.settings()) {
        Ok(competence) => competence,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Invalid competence");
            let api_error: ApiErrorResponse = err.into();
            return (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response();
        }
    };

    let tables = match request.into_tables() {
        Ok(tables) => tables,
        Err(error) => {
            warn!(correlation_id = %correlation_id, error = %error.message, "Invalid tables");
            return bad_request(error);
        }
    };

    let outcome = run_pipeline(&tables, config, competence);
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    info!(
        correlation_id = %correlation_id,
        run_id = %outcome.run_id,
        success = outcome.success,
        duration_ms = outcome.duration_ms,
        "Run completed"
    );

    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(RunResponse::from(outcome)),
    )
        .into_response()
}
