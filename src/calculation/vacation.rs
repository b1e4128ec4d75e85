//! Vacation zeroing rule.

use crate::models::{AuditStep, Dataset};

/// Makes every record found in the vacation table ineligible with zero days.
///
/// Union-specific vacation policies are enforced later by the validator;
/// this rule only guarantees that no benefit is computed during vacation.
pub fn apply_vacation_rule(dataset: &mut Dataset) -> usize {
    let Dataset {
        employees, audit, ..
    } = dataset;

    let mut applied = 0;
    for record in employees.iter_mut().filter(|e| e.on_vacation) {
        let days_before = record.days_worked;
        record.make_ineligible();
        applied += 1;

        audit.push(AuditStep {
            step_number: audit.len() as u32 + 1,
            rule_id: "vacation_zero".to_string(),
            rule_name: "Vacation Rule".to_string(),
            matricula: record.matricula.clone(),
            input: serde_json::json!({
                "on_vacation": true,
                "days_worked": days_before
            }),
            output: serde_json::json!({
                "eligible": false,
                "days_worked": 0
            }),
            reasoning: "On vacation: no days counted".to_string(),
        });
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Competence, EmployeeRecord};

    #[test]
    fn test_vacation_records_are_zeroed() {
        let mut dataset = Dataset::new(Competence::new(2025, 5).unwrap());
        let mut away = EmployeeRecord::new("1");
        away.on_vacation = true;
        away.days_worked = Some(5);
        dataset.employees = vec![away, EmployeeRecord::new("2")];

        assert_eq!(apply_vacation_rule(&mut dataset), 1);
        assert!(!dataset.employees[0].eligible);
        assert_eq!(dataset.employees[0].days_worked, Some(0));
        assert!(dataset.employees[1].eligible);
        assert_eq!(dataset.audit[0].input["days_worked"], 5);
    }

    #[test]
    fn test_rule_is_idempotent() {
        let mut dataset = Dataset::new(Competence::new(2025, 5).unwrap());
        let mut away = EmployeeRecord::new("1");
        away.on_vacation = true;
        dataset.employees = vec![away];

        apply_vacation_rule(&mut dataset);
        let first = dataset.employees.clone();
        apply_vacation_rule(&mut dataset);
        assert_eq!(dataset.employees, first);
    }
}
