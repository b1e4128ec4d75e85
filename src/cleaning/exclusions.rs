//! Exclusion passes: by role, by situation and by matricula list.

use tracing::debug;

use crate::config::Keywords;
use crate::models::{Dataset, ExclusionKind};

/// Reason recorded on management records kept but made ineligible.
pub const MANAGEMENT_REASON: &str = "CARGO_DIRETORIA/COORDENACAO";

/// Counts of what a role pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleExclusions {
    /// Management records made ineligible (kept in the collection).
    pub management: usize,
    /// Intern and apprentice records removed.
    pub removed: usize,
}

/// Applies the role rules.
///
/// Management titles stay in the collection as ineligible records. Intern
/// and apprentice titles are removed and their matriculas recorded in the
/// matching exclusion set.
pub fn exclude_by_role(dataset: &mut Dataset, keywords: &Keywords) -> RoleExclusions {
    let mut outcome = RoleExclusions::default();
    let Dataset {
        employees,
        exclusions,
        ..
    } = dataset;

    employees.retain_mut(|record| {
        if record.role_matches(&keywords.management) {
            record.make_ineligible();
            record.exclusion_reason = Some(MANAGEMENT_REASON.to_string());
            outcome.management += 1;
            return true;
        }

        let kind = if record.role_matches(&keywords.intern) {
            ExclusionKind::Intern
        } else if record.role_matches(&keywords.apprentice) {
            ExclusionKind::Apprentice
        } else {
            return true;
        };

        debug!(matricula = %record.matricula, role = %record.role, kind = %kind, "removed by role");
        exclusions.insert(kind, &record.matricula);
        outcome.removed += 1;
        false
    });

    outcome
}

/// Removes records whose situation is a leave keyword and records them as
/// on leave.
pub fn exclude_by_situation(dataset: &mut Dataset, keywords: &Keywords) -> usize {
    let Dataset {
        employees,
        exclusions,
        ..
    } = dataset;

    let before = employees.len();
    employees.retain(|record| {
        let situation = record.situation.to_lowercase();
        let on_leave = keywords
            .leave_situations
            .iter()
            .any(|k| situation.contains(&k.to_lowercase()));
        if on_leave {
            debug!(matricula = %record.matricula, situation = %record.situation, "removed by situation");
            exclusions.insert(ExclusionKind::Leave, &record.matricula);
        }
        !on_leave
    });
    before - employees.len()
}

/// Removes every record whose matricula is in any exclusion set.
pub fn exclude_by_matricula(dataset: &mut Dataset) -> usize {
    let excluded = dataset.exclusions.all();
    let before = dataset.employees.len();
    dataset
        .employees
        .retain(|record| !excluded.contains(record.matricula.trim()));
    before - dataset.employees.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Competence, EmployeeRecord};

    fn employee(matricula: &str, role: &str, situation: &str) -> EmployeeRecord {
        let mut record = EmployeeRecord::new(matricula);
        record.role = role.to_string();
        record.situation = situation.to_string();
        record
    }

    fn dataset(employees: Vec<EmployeeRecord>) -> Dataset {
        let mut dataset = Dataset::new(Competence::new(2025, 5).unwrap());
        dataset.employees = employees;
        dataset
    }

    #[test]
    fn test_management_is_kept_but_ineligible() {
        let mut data = dataset(vec![employee("1", "DIRETOR FINANCEIRO", "Trabalhando")]);

        let outcome = exclude_by_role(&mut data, &Keywords::default());

        assert_eq!(outcome, RoleExclusions { management: 1, removed: 0 });
        let record = &data.employees[0];
        assert!(!record.eligible);
        assert_eq!(record.days_worked, Some(0));
        assert_eq!(record.exclusion_reason.as_deref(), Some(MANAGEMENT_REASON));
    }

    #[test]
    fn test_interns_and_apprentices_are_removed() {
        let mut data = dataset(vec![
            employee("1", "Estagiario", "Trabalhando"),
            employee("2", "APRENDIZ ADMINISTRATIVO", "Trabalhando"),
            employee("3", "ANALISTA", "Trabalhando"),
        ]);

        let outcome = exclude_by_role(&mut data, &Keywords::default());

        assert_eq!(outcome.removed, 2);
        assert_eq!(data.active_count(), 1);
        assert!(data.exclusions.interns.contains("1"));
        assert!(data.exclusions.apprentices.contains("2"));
    }

    #[test]
    fn test_management_wins_over_intern_title() {
        let mut data = dataset(vec![employee("1", "Coordenador de estagiarios", "")]);

        exclude_by_role(&mut data, &Keywords::default());

        assert_eq!(data.active_count(), 1);
        assert!(data.exclusions.interns.is_empty());
    }

    #[test]
    fn test_leave_situations_are_removed() {
        let mut data = dataset(vec![
            employee("1", "ANALISTA", "Licença Maternidade"),
            employee("2", "ANALISTA", "Auxílio Doença"),
            employee("3", "ANALISTA", "Trabalhando"),
        ]);

        let removed = exclude_by_situation(&mut data, &Keywords::default());

        assert_eq!(removed, 2);
        assert_eq!(data.exclusions.leave.len(), 2);
        assert_eq!(data.employees[0].matricula, "3");
    }

    #[test]
    fn test_matricula_lists_remove_records() {
        let mut data = dataset(vec![
            employee("1", "ANALISTA", ""),
            employee("2", "ANALISTA", ""),
        ]);
        data.exclusions.insert(ExclusionKind::Expatriate, "2");

        assert_eq!(exclude_by_matricula(&mut data), 1);
        assert_eq!(data.employees[0].matricula, "1");
        assert_eq!(exclude_by_matricula(&mut data), 0);
    }
}
