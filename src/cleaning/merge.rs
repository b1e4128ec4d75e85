//! Merges of the vacation and termination side-tables into the records.

use crate::calculation::termination_decision;
use crate::models::Dataset;

/// Flags records found in the vacation table and copies their day count.
pub fn merge_vacations(dataset: &mut Dataset) -> usize {
    let Dataset {
        employees,
        vacations,
        ..
    } = dataset;

    let mut merged = 0;
    for record in employees.iter_mut() {
        if let Some(vacation) = vacations.get(record.matricula.trim()) {
            record.on_vacation = true;
            record.vacation_days = vacation.days;
            merged += 1;
        }
    }
    merged
}

/// Marks records found in the termination table inactive and applies the
/// termination day rule to those with a date.
pub fn merge_terminations(dataset: &mut Dataset, threshold: u32) -> usize {
    let Dataset {
        employees,
        terminations,
        ..
    } = dataset;

    let mut merged = 0;
    for record in employees.iter_mut() {
        let Some(termination) = terminations.get(record.matricula.trim()) else {
            continue;
        };
        record.active = false;
        record.termination_date = termination.termination_date.clone();
        if let Some(date) = &record.termination_date {
            let decision = termination_decision(date, threshold);
            record.eligible = decision.eligible;
            record.days_worked = Some(decision.days_worked);
        }
        merged += 1;
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Competence, EmployeeRecord, SourceDate, TerminationRecord, VacationRecord,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn dataset() -> Dataset {
        let mut dataset = Dataset::new(Competence::new(2025, 5).unwrap());
        dataset.employees = vec![EmployeeRecord::new("1"), EmployeeRecord::new("2")];
        dataset
    }

    fn terminated_on(matricula: &str, date: Option<SourceDate>) -> TerminationRecord {
        TerminationRecord {
            matricula: matricula.to_string(),
            termination_date: date,
            notice: "OK".to_string(),
        }
    }

    #[test]
    fn test_vacation_merge_copies_days() {
        let mut data = dataset();
        data.add_vacation(VacationRecord {
            matricula: "2".to_string(),
            situation: "Férias".to_string(),
            days: Some(Decimal::new(10, 0)),
        });

        assert_eq!(merge_vacations(&mut data), 1);
        assert!(!data.employees[0].on_vacation);
        assert!(data.employees[1].on_vacation);
        assert_eq!(data.employees[1].vacation_days, Some(Decimal::new(10, 0)));
    }

    #[test]
    fn test_termination_merge_applies_day_rule() {
        let mut data = dataset();
        data.add_termination(terminated_on(
            "1",
            Some(SourceDate::Parsed(NaiveDate::from_ymd_opt(2025, 5, 5).unwrap())),
        ));
        data.add_termination(terminated_on(
            "2",
            Some(SourceDate::Parsed(NaiveDate::from_ymd_opt(2025, 5, 25).unwrap())),
        ));

        assert_eq!(merge_terminations(&mut data, 15), 2);

        let early = &data.employees[0];
        assert!(!early.active && !early.eligible);
        assert_eq!(early.days_worked, Some(0));
        let late = &data.employees[1];
        assert!(!late.active && late.eligible);
        assert_eq!(late.days_worked, Some(24));
    }

    #[test]
    fn test_termination_without_date_only_deactivates() {
        let mut data = dataset();
        data.add_termination(terminated_on("1", None));

        merge_terminations(&mut data, 15);

        let record = &data.employees[0];
        assert!(!record.active);
        assert!(record.eligible);
        assert_eq!(record.days_worked, None);
    }
}
