//! Response types for the Voucher Benefit Engine API.
//!
//! This module defines the run response body, the error response
//! structures, and the mapping from engine errors to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{BenefitTotals, Diagnostic, EmployeeRecord};
use crate::pipeline::{RunOutcome, Stage, StageStats};
use crate::report::RunSummary;

/// Response body of `POST /runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    /// Unique id of the run.
    pub run_id: Uuid,
    /// The processed month as `MM.YYYY`.
    pub competence: String,
    /// True when every stage succeeded.
    pub success: bool,
    /// The stage that stopped the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,
    /// Result or failure message.
    pub message: String,
    /// Total duration of the run.
    pub duration_ms: u64,
    /// Per-stage statistics.
    pub stages: Vec<StageStats>,
    /// Run-wide counts.
    pub summary: RunSummary,
    /// Benefit totals of the final dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<BenefitTotals>,
    /// Validator findings.
    pub diagnostics: Vec<Diagnostic>,
    /// The rendered text report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    /// The final employee records.
    pub employees: Vec<EmployeeRecord>,
}

impl From<RunOutcome> for RunResponse {
    fn from(outcome: RunOutcome) -> Self {
        let (totals, employees) = match outcome.dataset {
            Some(dataset) => (Some(dataset.totals), dataset.employees),
            None => (None, Vec::new()),
        };
        Self {
            run_id: outcome.run_id,
            competence: outcome.competence.to_string(),
            success: outcome.success,
            failed_stage: outcome.failed_stage,
            message: outcome.message,
            duration_ms: outcome.duration_ms,
            stages: outcome.stages,
            summary: outcome.summary,
            totals,
            diagnostics: outcome
                .validation
                .map(|v| v.diagnostics)
                .unwrap_or_default(),
            report: outcome.report,
            employees,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
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
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidPolicy { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            EngineError::InvalidCompetence { value } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_COMPETENCE",
                    format!("Invalid competence: {}", value),
                    "Use YYYY-MM or MM.YYYY",
                ),
            },
            EngineError::SourceReadError { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details("SOURCE_ERROR", "Source table error", message),
            },
            EngineError::CalculationError { .. }
            | EngineError::ReportError { .. }
            | EngineError::StageFailed { .. } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::with_details("PIPELINE_ERROR", "Pipeline failed", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_invalid_competence_is_a_client_error() {
        let api_error: ApiErrorResponse = EngineError::InvalidCompetence {
            value: "2025-13".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "INVALID_COMPETENCE");
        assert!(api_error.error.message.contains("2025-13"));
    }

    #[test]
    fn test_calculation_error_is_unprocessable() {
        let api_error: ApiErrorResponse = EngineError::calculation("overflow").into();
        assert_eq!(api_error.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            api_error.error.details.as_deref(),
            Some("Calculation error: overflow")
        );
    }
}
