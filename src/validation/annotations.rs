//! Tag notes for special cases, so the report explains every record.

use crate::cleaning::MANAGEMENT_REASON;
use crate::error::EngineResult;
use crate::models::{Dataset, Diagnostic, EmployeeRecord};

use super::directors::DIRECTOR_REASON;
use super::timesheet::{PARTIAL_DAYS_LIMIT, PARTIAL_DAYS_NOTE};

const RULE: &str = "annotations";

const LEAVE_MARKERS: [&str; 5] = ["licença", "licenca", "afastado", "auxílio", "auxilio"];

fn tags_for(record: &EmployeeRecord) -> Vec<&'static str> {
    let situation = record.situation.to_lowercase();
    let days = record.days_worked_or_zero();
    let is_director = matches!(
        record.exclusion_reason.as_deref(),
        Some(DIRECTOR_REASON) | Some(MANAGEMENT_REASON)
    );

    [
        (record.on_vacation, "ON VACATION"),
        (record.termination_date.is_some(), "TERMINATED"),
        (
            record.on_leave || LEAVE_MARKERS.iter().any(|m| situation.contains(m)),
            "ON LEAVE",
        ),
        (record.intern, "INTERN"),
        (record.apprentice, "APPRENTICE"),
        (is_director, "DIRECTOR"),
        (days > 0 && days < PARTIAL_DAYS_LIMIT, PARTIAL_DAYS_NOTE),
        (
            record.eligible && record.total_benefit_value.is_zero(),
            "ZERO VALUE",
        ),
        (record.union.trim().is_empty(), "NO UNION"),
    ]
    .into_iter()
    .filter_map(|(applies, tag)| applies.then_some(tag))
    .collect()
}

/// Adds tag notes and warns about inactive records nothing explains.
pub fn check_annotations(dataset: &mut Dataset) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();
    for record in dataset.employees.iter_mut() {
        if !record.active && record.notes.is_empty() && record.exclusion_reason.is_none() {
            found.push(
                Diagnostic::warning(RULE, "Inactive record without notes or exclusion reason")
                    .for_matricula(&record.matricula),
            );
        }
        for tag in tags_for(record) {
            // A more specific note already covers the tag.
            if !record.has_note(tag) {
                record.add_note(tag);
            }
        }
    }

    let annotated = dataset
        .employees
        .iter()
        .filter(|e| !e.notes.is_empty())
        .count();
    dataset.add_observation(format!(
        "Annotated records: {}/{}",
        annotated,
        dataset.employees.len()
    ));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::test_support::*;

    #[test]
    fn test_regular_record_gets_no_tags() {
        let mut data = dataset(vec![paid("1", 22)]);

        let found = check_annotations(&mut data).unwrap();

        assert!(found.is_empty());
        assert!(data.employees[0].notes.is_empty());
        assert_eq!(data.observations, vec!["Annotated records: 0/1"]);
    }

    #[test]
    fn test_special_cases_are_tagged() {
        let mut vacation = paid("1", 0);
        vacation.on_vacation = true;
        vacation.make_ineligible();
        let mut leave = paid("2", 10);
        leave.situation = "Afastado".to_string();
        let mut zero = paid("3", 0);
        zero.union = String::new();
        let mut data = dataset(vec![vacation, leave, zero]);

        check_annotations(&mut data).unwrap();

        assert_eq!(data.employees[0].notes, vec!["ON VACATION"]);
        assert_eq!(data.employees[1].notes, vec!["ON LEAVE", PARTIAL_DAYS_NOTE]);
        assert_eq!(data.employees[2].notes, vec!["ZERO VALUE", "NO UNION"]);
        assert_eq!(data.observations, vec!["Annotated records: 3/3"]);
    }

    #[test]
    fn test_management_reason_is_tagged_director() {
        let mut manager = paid("1", 0);
        manager.make_ineligible();
        manager.exclusion_reason = Some(MANAGEMENT_REASON.to_string());
        let mut data = dataset(vec![manager]);

        check_annotations(&mut data).unwrap();

        assert_eq!(data.employees[0].notes, vec!["DIRECTOR"]);
    }

    #[test]
    fn test_unexplained_inactive_record_warns() {
        let mut record = paid("1", 0);
        record.active = false;
        record.make_ineligible();
        let mut data = dataset(vec![record]);

        let found = check_annotations(&mut data).unwrap();

        assert_eq!(found.len(), 1);
        assert!(!found[0].is_error());
    }

    #[test]
    fn test_terminated_tag_defers_to_earlier_note() {
        let mut record = paid("1", 0);
        record.make_ineligible();
        record.termination_date = Some(date(2025, 5, 3));
        record.add_note("TERMINATED BY DAY 15");
        let mut data = dataset(vec![record]);

        check_annotations(&mut data).unwrap();

        assert_eq!(data.employees[0].notes, vec!["TERMINATED BY DAY 15"]);
    }
}
