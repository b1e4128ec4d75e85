//! Itemized data-quality findings produced by the validator.

use serde::{Deserialize, Serialize};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Counts against the run; any error fails validation.
    Error,
    /// Reported but never flips the verdict.
    Warning,
}

/// One finding raised by a validation rule.
///
/// # Example
///
/// ```
/// use voucher_engine::models::{Diagnostic, Severity};
///
/// let finding = Diagnostic::error("required_fields", "matricula is missing")
///     .for_matricula("1001");
/// assert_eq!(finding.severity, Severity::Error);
/// assert_eq!(finding.matricula.as_deref(), Some("1001"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// Identifier of the rule that raised it.
    pub rule: String,
    /// Human-readable description.
    pub message: String,
    /// The employee concerned, when the finding is about one record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matricula: Option<String>,
}

impl Diagnostic {
    /// Creates an error finding.
    pub fn error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            rule: rule.into(),
            message: message.into(),
            matricula: None,
        }
    }

    /// Creates a warning finding.
    pub fn warning(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            rule: rule.into(),
            message: message.into(),
            matricula: None,
        }
    }

    /// Attaches the employee the finding is about.
    pub fn for_matricula(mut self, matricula: impl Into<String>) -> Self {
        self.matricula = Some(matricula.into());
        self
    }

    /// Returns true for [`Severity::Error`].
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
