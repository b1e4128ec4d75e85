//! Cleaning stage.
//!
//! Reduces the active collection to the employees a benefit can be computed
//! for, then merges the vacation and termination facts onto the survivors.
//! The passes run in a fixed order: role, situation, matricula lists,
//! vacations, terminations. Running the stage twice changes nothing.

mod exclusions;
mod merge;

pub use exclusions::{
    MANAGEMENT_REASON, RoleExclusions, exclude_by_matricula, exclude_by_role,
    exclude_by_situation,
};
pub use merge::{merge_terminations, merge_vacations};

use tracing::info;

use crate::config::ConfigLoader;
use crate::models::Dataset;

/// Runs the cleaning stage.
pub fn run_cleaner(mut dataset: Dataset, config: &ConfigLoader) -> Dataset {
    let settings = config.settings();

    let by_role = exclude_by_role(&mut dataset, &settings.keywords);
    let by_situation = exclude_by_situation(&mut dataset, &settings.keywords);
    let by_matricula = exclude_by_matricula(&mut dataset);
    let vacations = merge_vacations(&mut dataset);
    let terminations = merge_terminations(&mut dataset, settings.termination_day_threshold);

    info!(
        management = by_role.management,
        removed_by_role = by_role.removed,
        removed_by_situation = by_situation,
        removed_by_matricula = by_matricula,
        vacations,
        terminations,
        remaining = dataset.active_count(),
        "cleaning complete"
    );
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineSettings;
    use crate::models::{
        Competence, EmployeeRecord, ExclusionKind, SourceDate, TerminationRecord,
        VacationRecord,
    };
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn config() -> ConfigLoader {
        ConfigLoader::from_parts(PipelineSettings::default(), HashMap::new()).unwrap()
    }

    fn employee(matricula: &str, role: &str) -> EmployeeRecord {
        let mut record = EmployeeRecord::new(matricula);
        record.role = role.to_string();
        record.union = "São Paulo".to_string();
        record
    }

    fn messy_dataset() -> Dataset {
        let mut dataset = Dataset::new(Competence::new(2025, 5).unwrap());
        let mut on_leave = employee("4", "ANALISTA");
        on_leave.situation = "Auxílio Doença".to_string();
        dataset.employees = vec![
            employee("1", "ANALISTA"),
            employee("2", "Estagiário"),
            employee("3", "DIRETOR"),
            on_leave,
            employee("5", "ANALISTA"),
            employee("6", "ANALISTA"),
            employee("7", "ANALISTA"),
        ];
        dataset.exclusions.insert(ExclusionKind::Expatriate, "5");
        dataset.add_vacation(VacationRecord {
            matricula: "6".to_string(),
            situation: "Férias".to_string(),
            days: None,
        });
        dataset.add_termination(TerminationRecord {
            matricula: "7".to_string(),
            termination_date: Some(SourceDate::Parsed(
                NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
            )),
            notice: String::new(),
        });
        dataset
    }

    #[test]
    fn test_single_intern_removed() {
        let mut dataset = Dataset::new(Competence::new(2025, 5).unwrap());
        dataset.employees = vec![employee("1001", "Intern")];

        let dataset = run_cleaner(dataset, &config());

        assert!(dataset.employees.is_empty());
        assert!(dataset.exclusions.interns.contains("1001"));
    }

    #[test]
    fn test_full_cleaning_pass() {
        let dataset = run_cleaner(messy_dataset(), &config());

        let kept: Vec<&str> = dataset
            .employees
            .iter()
            .map(|e| e.matricula.as_str())
            .collect();
        assert_eq!(kept, vec!["1", "3", "6", "7"]);
        assert!(!dataset.employees[1].eligible);
        assert!(dataset.employees[2].on_vacation);
        assert!(!dataset.employees[3].active);
        assert_eq!(dataset.employees[3].days_worked, Some(19));
    }

    #[test]
    fn test_no_excluded_matricula_survives() {
        let dataset = run_cleaner(messy_dataset(), &config());

        let excluded = dataset.exclusions.all();
        assert!(
            dataset
                .employees
                .iter()
                .all(|e| !excluded.contains(&e.matricula))
        );
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let once = run_cleaner(messy_dataset(), &config());
        let twice = run_cleaner(once.clone(), &config());

        assert_eq!(twice, once);
    }
}
