//! Audit trail of calculator decisions.

use serde::{Deserialize, Serialize};

/// A single step in the calculation audit trail.
///
/// Each step records one rule applied to one employee, with its inputs,
/// outputs and a human-readable explanation.
///
/// # Example
///
/// ```
/// use voucher_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "termination_day".to_string(),
///     rule_name: "Termination Day Rule".to_string(),
///     matricula: "1001".to_string(),
///     input: serde_json::json!({"termination_day": 20}),
///     output: serde_json::json!({"eligible": true, "days_worked": 19}),
///     reasoning: "Terminated on day 20 (> 15): 19 days counted".to_string(),
/// };
/// assert_eq!(step.rule_id, "termination_day");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The employee the rule was applied to.
    pub matricula: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}
