//! Error types for the Voucher Benefit Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that aborts a pipeline stage. Data-quality problems
//! found by the validator are not errors in this sense; they are reported
//! as [`Diagnostic`](crate::models::Diagnostic) entries instead.

use thiserror::Error;

/// The main error type for the Voucher Benefit Engine.
///
/// # Example
///
/// ```
/// use voucher_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/settings.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/settings.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A union policy is internally inconsistent.
    #[error("Invalid policy for union '{union}': {message}")]
    InvalidPolicy {
        /// The canonical union name.
        union: String,
        /// What is wrong with the policy.
        message: String,
    },

    /// A source table exists but could not be read.
    #[error("Failed to read source table '{table}': {message}")]
    SourceReadError {
        /// The logical table name.
        table: String,
        /// A description of the read error.
        message: String,
    },

    /// A competence (processing month) string could not be parsed.
    #[error("Invalid competence '{value}': expected YYYY-MM or MM.YYYY")]
    InvalidCompetence {
        /// The rejected value.
        value: String,
    },

    /// A monetary or day-count computation failed.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// The final report could not be rendered.
    #[error("Failed to render report: {message}")]
    ReportError {
        /// A description of the rendering error.
        message: String,
    },

    /// A pipeline stage failed and the run was aborted.
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed {
        /// The stage that failed.
        stage: String,
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::CalculationError`].
    pub fn calculation(message: impl Into<String>) -> Self {
        Self::CalculationError {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<std::fmt::Error> for EngineError {
    fn from(err: std::fmt::Error) -> Self {
        Self::ReportError {
            message: err.to_string(),
        }
    }
}
