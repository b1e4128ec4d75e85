//! Independent re-checks of the termination day rule.

use crate::error::EngineResult;
use crate::models::{Dataset, Diagnostic, EmployeeRecord};

use super::RuleContext;

const EARLY: &str = "early_termination";
const LATE: &str = "late_termination";

fn terminated_on(record: &EmployeeRecord) -> Option<u32> {
    record.termination_date.as_ref().map(|date| date.day())
}

/// Terminations on or before the threshold day must be ineligible with zero days.
pub fn check_early_termination(
    dataset: &mut Dataset,
    ctx: &RuleContext<'_>,
) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();
    for record in &dataset.employees {
        let Some(day) = terminated_on(record).filter(|day| *day <= ctx.threshold) else {
            continue;
        };
        if record.eligible {
            found.push(
                Diagnostic::error(
                    EARLY,
                    format!("Terminated on day {} but still eligible", day),
                )
                .for_matricula(&record.matricula),
            );
        }
        if record.days_worked_or_zero() > 0 {
            found.push(
                Diagnostic::error(
                    EARLY,
                    format!(
                        "Terminated on day {} but has {} days worked",
                        day,
                        record.days_worked_or_zero()
                    ),
                )
                .for_matricula(&record.matricula),
            );
        }
    }
    Ok(found)
}

/// Terminations after the threshold day must be eligible with positive days.
pub fn check_late_termination(
    dataset: &mut Dataset,
    ctx: &RuleContext<'_>,
) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();
    for record in &dataset.employees {
        let Some(day) = terminated_on(record).filter(|day| *day > ctx.threshold) else {
            continue;
        };
        if !record.eligible {
            found.push(
                Diagnostic::error(LATE, format!("Terminated on day {} but not eligible", day))
                    .for_matricula(&record.matricula),
            );
        }
        if record.days_worked_or_zero() <= 0 {
            found.push(
                Diagnostic::error(
                    LATE,
                    format!("Terminated on day {} but has no days worked", day),
                )
                .for_matricula(&record.matricula),
            );
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceDate;
    use crate::validation::test_support::*;

    fn terminated(matricula: &str, day: u32, days: i64, eligible: bool) -> EmployeeRecord {
        let mut record = paid(matricula, days);
        record.active = false;
        record.eligible = eligible;
        record.termination_date = Some(date(2025, 5, day));
        record
    }

    fn ctx_for(config: &crate::config::ConfigLoader) -> RuleContext<'_> {
        RuleContext::new(config, crate::models::Competence::new(2025, 5).unwrap()).unwrap()
    }

    #[test]
    fn test_correct_terminations_pass() {
        let config = config();
        let ctx = ctx_for(&config);
        let mut data = dataset(vec![terminated("1", 10, 0, false), terminated("2", 20, 19, true)]);

        assert!(check_early_termination(&mut data, &ctx).unwrap().is_empty());
        assert!(check_late_termination(&mut data, &ctx).unwrap().is_empty());
    }

    #[test]
    fn test_early_termination_still_paid() {
        let config = config();
        let ctx = ctx_for(&config);
        let mut data = dataset(vec![terminated("1", 15, 14, true)]);

        let found = check_early_termination(&mut data, &ctx).unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|d| d.is_error()));
        assert!(check_late_termination(&mut data, &ctx).unwrap().is_empty());
    }

    #[test]
    fn test_late_termination_without_benefit() {
        let config = config();
        let ctx = ctx_for(&config);
        let mut data = dataset(vec![terminated("1", 16, 0, false)]);

        let found = check_late_termination(&mut data, &ctx).unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].message, "Terminated on day 16 but not eligible");
    }

    #[test]
    fn test_unparsed_date_counts_as_day_fifteen() {
        let config = config();
        let ctx = ctx_for(&config);
        let mut record = terminated("1", 1, 0, false);
        record.termination_date = Some(SourceDate::Unparsed("??".to_string()));
        let mut data = dataset(vec![record]);

        assert!(check_early_termination(&mut data, &ctx).unwrap().is_empty());
        assert!(check_late_termination(&mut data, &ctx).unwrap().is_empty());
    }
}
