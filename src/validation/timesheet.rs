//! Days worked against the expected working days of the month.

use std::collections::BTreeSet;

use crate::error::EngineResult;
use crate::models::{Dataset, Diagnostic};

use super::RuleContext;

const RULE: &str = "timesheet";

/// Note for employees with fewer than [`PARTIAL_DAYS_LIMIT`] days worked.
pub const PARTIAL_DAYS_NOTE: &str = "PARTIAL DAYS";
/// Days worked below this count are tagged [`PARTIAL_DAYS_NOTE`].
pub const PARTIAL_DAYS_LIMIT: i64 = 15;

/// Compares each record's days worked with the working days expected for it.
///
/// Expected days come from the record, then from its union, then from the
/// business-day calendar of the competence month.
pub fn check_timesheet(
    dataset: &mut Dataset,
    ctx: &RuleContext<'_>,
) -> EngineResult<Vec<Diagnostic>> {
    let Dataset {
        employees,
        union_working_days,
        observations,
        ..
    } = dataset;

    let mut found = Vec::new();
    let mut expected_set = BTreeSet::new();

    for record in employees.iter_mut() {
        let union_days = union_working_days.get(&record.union).copied();
        let expected = record
            .working_days
            .filter(|d| *d > 0)
            .or(union_days.filter(|d| *d > 0))
            .unwrap_or(ctx.business_days);
        expected_set.insert(expected);
        let days = record.days_worked_or_zero();

        let mut warnings = Vec::new();
        if days > expected {
            warnings.push(format!("Days worked {} exceed the {} expected", days, expected));
        }
        match (record.working_days, union_days) {
            (Some(own), Some(union)) if own != union => warnings.push(format!(
                "Working days {} differ from the union's {}",
                own, union
            )),
            _ => {}
        }
        if record.on_vacation && days == expected {
            warnings.push(format!("On vacation but worked all {} days", expected));
        }
        match record.termination_date.as_ref().map(|d| d.day()) {
            Some(day) if day <= ctx.threshold && days > 0 => warnings.push(format!(
                "Terminated on day {} but has {} days worked",
                day, days
            )),
            _ => {}
        }
        found.extend(
            warnings
                .into_iter()
                .map(|message| Diagnostic::warning(RULE, message).for_matricula(&record.matricula)),
        );

        let partial_policy = ctx
            .config
            .policy(&record.union)
            .and_then(|p| p.vacation.as_ref())
            .is_some_and(|v| !v.is_full());
        if record.on_vacation && days > 0 && !partial_policy {
            found.push(
                Diagnostic::error(RULE, format!("On vacation with {} days worked", days))
                    .for_matricula(&record.matricula),
            );
        }

        if days > 0 && days < PARTIAL_DAYS_LIMIT {
            record.add_note(PARTIAL_DAYS_NOTE);
        }
    }

    let listed: Vec<String> = expected_set.iter().map(|d| d.to_string()).collect();
    observations.push(format!(
        "Timesheet checked: expected working days [{}]",
        listed.join(", ")
    ));
    Ok(found)
}
