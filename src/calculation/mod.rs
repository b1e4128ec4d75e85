//! Benefit calculation stage.
//!
//! This module contains the rules that turn a cleaned dataset into computed
//! benefits: the day-of-month termination rule, the vacation zeroing rule,
//! the per-employee benefit with its employer/employee split, and the
//! dataset totals. Every decision is recorded as an
//! [`AuditStep`](crate::models::AuditStep) on the dataset.

mod benefit;
mod termination;
mod totals;
mod vacation;

pub use benefit::{
    BenefitAmounts, apply_benefits, compute_benefit, resolve_days_worked, store_benefit,
};
pub use termination::{TerminationDecision, apply_termination_rule, termination_decision};
pub use totals::recompute_totals;
pub use vacation::apply_vacation_rule;

use tracing::info;

use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::models::Dataset;

/// Runs the calculation stage.
///
/// The termination and vacation rules are re-applied first so the stage
/// gives the same result whether or not the cleaner ran before it.
///
/// # Errors
///
/// Any arithmetic failure aborts the stage; partial totals are discarded
/// with the dataset.
pub fn run_calculator(mut dataset: Dataset, config: &ConfigLoader) -> EngineResult<Dataset> {
    let threshold = config.settings().termination_day_threshold;

    let terminated = apply_termination_rule(&mut dataset, threshold);
    let on_vacation = apply_vacation_rule(&mut dataset);
    let calculated = apply_benefits(&mut dataset, config)?;
    let totals = recompute_totals(&mut dataset)?;

    info!(
        terminated,
        on_vacation,
        calculated,
        valid = totals.valid_count,
        total = %totals.total_benefit,
        "benefits calculated"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineSettings;
    use crate::models::{Competence, EmployeeRecord, SourceDate};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> ConfigLoader {
        ConfigLoader::from_parts(PipelineSettings::default(), HashMap::new()).unwrap()
    }

    fn dataset() -> Dataset {
        let mut dataset = Dataset::new(Competence::new(2025, 5).unwrap());
        dataset.union_values.insert("São Paulo".to_string(), dec("25.00"));
        dataset.union_working_days.insert("São Paulo".to_string(), 22);
        dataset
    }

    #[test]
    fn test_terminated_on_twentieth_receives_nineteen_days() {
        let mut dataset = dataset();
        let mut record = EmployeeRecord::new("1001");
        record.union = "São Paulo".to_string();
        record.active = false;
        record.termination_date = Some(SourceDate::Parsed(
            NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
        ));
        dataset.employees = vec![record];

        let dataset = run_calculator(dataset, &config()).unwrap();

        let record = &dataset.employees[0];
        assert!(record.eligible);
        assert_eq!(record.days_worked, Some(19));
        assert_eq!(record.total_benefit_value, dec("475.00"));
        assert_eq!(record.employer_cost, dec("380.00"));
        assert_eq!(record.employee_deduction, dec("95.00"));
        assert_eq!(dataset.totals.total_benefit, dec("475.00"));
        assert_eq!(dataset.totals.valid_count, 1);
    }

    #[test]
    fn test_vacation_and_early_termination_receive_nothing() {
        let mut dataset = dataset();
        let mut away = EmployeeRecord::new("1");
        away.union = "São Paulo".to_string();
        away.on_vacation = true;
        let mut early = EmployeeRecord::new("2");
        early.union = "São Paulo".to_string();
        early.active = false;
        early.termination_date = Some(SourceDate::Parsed(
            NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
        ));
        dataset.employees = vec![away, early];

        let dataset = run_calculator(dataset, &config()).unwrap();

        assert!(dataset.employees.iter().all(|e| !e.eligible));
        assert_eq!(dataset.totals.total_benefit, Decimal::ZERO);
        assert_eq!(dataset.totals.valid_count, 0);
    }

    #[test]
    fn test_running_twice_gives_the_same_totals() {
        let mut dataset = dataset();
        let mut record = EmployeeRecord::new("1");
        record.union = "São Paulo".to_string();
        dataset.employees = vec![record];

        let once = run_calculator(dataset, &config()).unwrap();
        let totals = once.totals.clone();
        let twice = run_calculator(once, &config()).unwrap();

        assert_eq!(twice.totals, totals);
        assert_eq!(twice.totals.total_benefit, dec("550.00"));
    }

    #[test]
    fn test_audit_steps_are_numbered_in_order() {
        let mut dataset = dataset();
        let mut record = EmployeeRecord::new("1");
        record.union = "São Paulo".to_string();
        record.active = false;
        record.termination_date = Some(SourceDate::Unparsed("soon".to_string()));
        let mut other = EmployeeRecord::new("2");
        other.union = "São Paulo".to_string();
        dataset.employees = vec![record, other];

        let dataset = run_calculator(dataset, &config()).unwrap();

        let numbers: Vec<u32> = dataset.audit.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(dataset.audit[0].rule_id, "termination_day");
        assert_eq!(dataset.audit[1].rule_id, "benefit_calculation");
    }
}
