//! Mid-month admissions and terminations ("broken" months).

use chrono::Datelike;

use crate::config::{PROPORTIONAL_ADMISSION, PROPORTIONAL_TERMINATION};
use crate::error::EngineResult;
use crate::models::{Dataset, Diagnostic};

use super::RuleContext;

const RULE: &str = "broken_dates";

/// Compares days worked with what a partial month allows and tags the records.
///
/// An admission on day `d` of the competence month allows at most
/// `days_in_month - d + 1` days. A termination after the threshold day allows
/// at most `d` days; one on or before it allows none, and the record is
/// forced out of the benefit.
pub fn check_broken_dates(
    dataset: &mut Dataset,
    ctx: &RuleContext<'_>,
) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();
    let mut broken = 0;
    let days_in_month = i64::from(ctx.competence.days_in_month());

    for record in dataset.employees.iter_mut() {
        let policy = ctx.config.policy(&record.union);
        let admission_day = record
            .admission_date
            .as_ref()
            .and_then(|d| d.date())
            .filter(|d| ctx.competence.contains(*d))
            .map(|d| d.day())
            .filter(|day| *day > 1);
        let termination_day = record.termination_date.as_ref().map(|d| d.day());
        if admission_day.is_none() && termination_day.is_none() {
            continue;
        }
        broken += 1;
        let days = record.days_worked_or_zero();
        let mut warnings = Vec::new();

        if let Some(day) = admission_day {
            let expected = days_in_month - i64::from(day) + 1;
            if days > expected {
                warnings.push(format!(
                    "Admitted on day {} allows {} days, found {}",
                    day, expected, days
                ));
            }
            record.add_note(format!("ADMISSION DAY {}", day));
            if policy.is_some_and(|p| !p.has_rule(PROPORTIONAL_ADMISSION)) {
                warnings.push(format!(
                    "Union {} has no proportional admission rule",
                    record.union
                ));
            }
        }

        match termination_day {
            Some(day) if day <= ctx.threshold => {
                if days > 0 {
                    warnings.push(format!(
                        "Terminated on day {} but has {} days worked",
                        day, days
                    ));
                }
                record.make_ineligible();
                record.clear_benefit();
                record.add_note(format!("TERMINATED BY DAY {}", ctx.threshold));
            }
            Some(day) => {
                if days > i64::from(day) {
                    warnings.push(format!(
                        "Terminated on day {} but has {} days worked",
                        day, days
                    ));
                }
                record.add_note(format!("TERMINATION DAY {}", day));
                if policy.is_some_and(|p| !p.has_rule(PROPORTIONAL_TERMINATION)) {
                    warnings.push(format!(
                        "Union {} has no proportional termination rule",
                        record.union
                    ));
                }
            }
            None => {}
        }

        let admitted = record.admission_date.as_ref().and_then(|d| d.date());
        let terminated = record.termination_date.as_ref().and_then(|d| d.date());
        let same_month = match (admitted, terminated) {
            (Some(a), Some(t)) => a.year() == t.year() && a.month() == t.month(),
            _ => false,
        };
        if same_month {
            warnings.push("Admitted and terminated in the same month".to_string());
        }

        found.extend(
            warnings
                .into_iter()
                .map(|message| Diagnostic::warning(RULE, message).for_matricula(&record.matricula)),
        );
    }

    dataset.add_observation(format!("Broken dates processed: {}", broken));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeRecord;
    use crate::validation::test_support::*;
    use rust_decimal::Decimal;

    fn run(data: &mut Dataset) -> Vec<Diagnostic> {
        let config = config();
        let ctx = RuleContext::new(&config, data.competence).unwrap();
        check_broken_dates(data, &ctx).unwrap()
    }

    fn admitted(day: u32, days: i64, union: &str) -> EmployeeRecord {
        let mut record = paid("1", days);
        record.union = union.to_string();
        record.admission_date = Some(date(2025, 5, day));
        record
    }

    #[test]
    fn test_mid_month_admission_within_allowance() {
        let mut data = dataset(vec![admitted(20, 12, "SINDICATO_QUIMICOS")]);

        let found = run(&mut data);

        assert!(found.is_empty());
        assert_eq!(data.employees[0].notes, vec!["ADMISSION DAY 20"]);
        assert_eq!(data.observations, vec!["Broken dates processed: 1"]);
    }

    #[test]
    fn test_mid_month_admission_exceeding_allowance() {
        let mut data = dataset(vec![admitted(20, 13, "SINDICATO_QUIMICOS")]);

        let found = run(&mut data);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Admitted on day 20 allows 12 days, found 13");
    }

    #[test]
    fn test_admission_without_proportional_rule_warns() {
        let mut data = dataset(vec![admitted(20, 10, "SINDICATO_BANCARIOS")]);

        let found = run(&mut data);

        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("proportional admission"));
    }

    #[test]
    fn test_first_day_admission_is_not_broken() {
        let mut data = dataset(vec![admitted(1, 22, "São Paulo")]);

        assert!(run(&mut data).is_empty());
        assert_eq!(data.observations, vec!["Broken dates processed: 0"]);
    }

    #[test]
    fn test_early_termination_is_forced_out() {
        let mut record = paid("1", 9);
        record.termination_date = Some(date(2025, 5, 10));
        let mut data = dataset(vec![record]);

        let found = run(&mut data);

        assert_eq!(found.len(), 1);
        let record = &data.employees[0];
        assert!(!record.eligible);
        assert_eq!(record.total_benefit_value, Decimal::ZERO);
        assert_eq!(record.notes, vec!["TERMINATED BY DAY 15"]);
    }

    #[test]
    fn test_late_termination_tags_day() {
        let mut record = paid("1", 19);
        record.termination_date = Some(date(2025, 5, 20));
        let mut data = dataset(vec![record]);

        let found = run(&mut data);

        // São Paulo carries no proportional termination rule.
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("proportional termination"));
        assert!(data.employees[0].eligible);
        assert_eq!(data.employees[0].notes, vec!["TERMINATION DAY 20"]);
    }

    #[test]
    fn test_admitted_and_terminated_same_month() {
        let mut record = admitted(5, 10, "SINDICATO_QUIMICOS");
        record.termination_date = Some(date(2025, 5, 25));
        let mut data = dataset(vec![record]);

        let found = run(&mut data);

        assert!(found.iter().any(|d| d.message == "Admitted and terminated in the same month"));
    }

    #[test]
    fn test_first_day_admission_terminated_same_month() {
        let mut record = admitted(1, 19, "SINDICATO_QUIMICOS");
        record.termination_date = Some(date(2025, 5, 20));
        let mut data = dataset(vec![record]);

        let found = run(&mut data);

        assert!(found.iter().any(|d| d.message == "Admitted and terminated in the same month"));
        assert_eq!(data.employees[0].notes, vec!["TERMINATION DAY 20"]);
    }

    #[test]
    fn test_admitted_previous_month_terminated_this_month() {
        let mut record = paid("1", 19);
        record.union = "SINDICATO_QUIMICOS".to_string();
        record.admission_date = Some(date(2025, 4, 20));
        record.termination_date = Some(date(2025, 5, 20));
        let mut data = dataset(vec![record]);

        let found = run(&mut data);

        assert!(found.iter().all(|d| d.message != "Admitted and terminated in the same month"));
    }
}
