//! Checks on employees admitted in the competence month or the month before.

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{Competence, Dataset, Diagnostic, EmployeeRecord};

use super::RuleContext;

const THIS_MONTH: &str = "admission_this_month";
const PREVIOUS_MONTH: &str = "admission_previous_month";

/// Note for employees admitted in the month before the competence.
pub const PREVIOUS_MONTH_NOTE: &str = "ADMITTED PREVIOUS MONTH";

fn admitted_in(record: &EmployeeRecord, month: Competence) -> Option<NaiveDate> {
    record
        .admission_date
        .as_ref()
        .and_then(|d| d.date())
        .filter(|d| month.contains(*d))
}

fn no_days(rule: &str, record: &EmployeeRecord, when: &str) -> Diagnostic {
    Diagnostic::error(rule, format!("Admitted {} but has no days worked", when))
        .for_matricula(&record.matricula)
}

/// Eligible employees admitted in the competence month must have days worked.
pub fn check_this_month(
    dataset: &mut Dataset,
    ctx: &RuleContext<'_>,
) -> EngineResult<Vec<Diagnostic>> {
    Ok(dataset
        .employees
        .iter()
        .filter(|e| e.eligible && e.days_worked_or_zero() <= 0)
        .filter(|e| admitted_in(e, ctx.competence).is_some())
        .map(|e| no_days(THIS_MONTH, e, "this month"))
        .collect())
}

/// Flags employees admitted in the previous month and checks their days.
pub fn check_previous_month(
    dataset: &mut Dataset,
    ctx: &RuleContext<'_>,
) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();
    let mut admitted = 0;
    for record in dataset.employees.iter_mut() {
        if admitted_in(record, ctx.previous).is_none() {
            continue;
        }
        admitted += 1;
        record.admitted_previous_month = true;
        if record.notes.is_empty() {
            record.add_note(PREVIOUS_MONTH_NOTE);
        }
        if record.eligible && record.days_worked_or_zero() <= 0 {
            found.push(no_days(PREVIOUS_MONTH, record, "last month"));
        }
    }
    dataset.add_observation(format!("Admitted previous month: {}", admitted));
    Ok(found)
}
