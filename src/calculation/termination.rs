//! The day-of-month termination rule.
//!
//! An employee terminated on or before the threshold day (15 by default)
//! receives nothing for the month. One terminated after it receives the days
//! before the termination day.

use crate::models::{AuditStep, Dataset, SourceDate};

/// What the termination rule decides for one termination date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationDecision {
    /// Day of month used (15 when the date could not be parsed).
    pub day: u32,
    /// Whether the employee keeps the benefit.
    pub eligible: bool,
    /// Days counted toward the benefit.
    pub days_worked: i64,
}

/// Applies the termination rule to a termination date.
///
/// # Example
///
/// ```
/// use voucher_engine::calculation::termination_decision;
/// use voucher_engine::models::SourceDate;
/// use chrono::NaiveDate;
///
/// let date = SourceDate::Parsed(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap());
/// let decision = termination_decision(&date, 15);
/// assert!(decision.eligible);
/// assert_eq!(decision.days_worked, 19);
///
/// let unparsed = SourceDate::Unparsed("n/a".to_string());
/// assert!(!termination_decision(&unparsed, 15).eligible);
/// ```
pub fn termination_decision(date: &SourceDate, threshold: u32) -> TerminationDecision {
    let day = date.day();
    if day <= threshold {
        TerminationDecision {
            day,
            eligible: false,
            days_worked: 0,
        }
    } else {
        TerminationDecision {
            day,
            eligible: true,
            days_worked: i64::from(day) - 1,
        }
    }
}

/// Re-applies the termination rule to every inactive record with a date.
///
/// Returns the number of records the rule touched.
pub fn apply_termination_rule(dataset: &mut Dataset, threshold: u32) -> usize {
    let Dataset {
        employees, audit, ..
    } = dataset;

    let mut applied = 0;
    for record in employees.iter_mut().filter(|e| !e.active) {
        let Some(date) = &record.termination_date else {
            continue;
        };
        let decision = termination_decision(date, threshold);
        record.eligible = decision.eligible;
        record.days_worked = Some(decision.days_worked);
        applied += 1;

        let reasoning = if decision.eligible {
            format!(
                "Terminated on day {} (> {}): {} days counted",
                decision.day, threshold, decision.days_worked
            )
        } else {
            format!(
                "Terminated on day {} (<= {}): not eligible",
                decision.day, threshold
            )
        };
        audit.push(AuditStep {
            step_number: audit.len() as u32 + 1,
            rule_id: "termination_day".to_string(),
            rule_name: "Termination Day Rule".to_string(),
            matricula: record.matricula.clone(),
            input: serde_json::json!({
                "termination_day": decision.day,
                "threshold": threshold
            }),
            output: serde_json::json!({
                "eligible": decision.eligible,
                "days_worked": decision.days_worked
            }),
            reasoning,
        });
    }
    applied
}
