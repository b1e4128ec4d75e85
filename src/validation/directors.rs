use crate::error::EngineResult;
use crate::models::{Dataset, Diagnostic, EmployeeRecord};

use super::RuleContext;

const RULE: &str = "directors";

/// Exclusion reason set on directors that carry none.
pub const DIRECTOR_REASON: &str = "DIRECTOR";

/// Keywords this short only match whole words, so `cto` does not match
/// `director`.
const WHOLE_WORD_MAX_LEN: usize = 3;

fn is_executive(record: &EmployeeRecord, titles: &[String]) -> bool {
    let role = record.role.to_lowercase();
    let words: Vec<&str> = role
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    titles.iter().any(|title| {
        let title = title.to_lowercase();
        if title.chars().count() <= WHOLE_WORD_MAX_LEN {
            words.contains(&title.as_str())
        } else {
            role.contains(&title)
        }
    })
}

/// Finds executive titles, reports those still eligible, and removes their
/// benefit.
pub fn check_directors(
    dataset: &mut Dataset,
    ctx: &RuleContext<'_>,
) -> EngineResult<Vec<Diagnostic>> {
    let titles = &ctx.config.settings().keywords.executive_titles;
    let mut found = Vec::new();
    let mut directors = 0;

    for record in dataset.employees.iter_mut() {
        if !is_executive(record, titles) {
            continue;
        }
        directors += 1;
        if record.eligible {
            found.push(
                Diagnostic::error(RULE, format!("Executive '{}' marked eligible", record.role))
                    .for_matricula(&record.matricula),
            );
        }
        record.make_ineligible();
        record.clear_benefit();
        if record.exclusion_reason.is_none() {
            record.exclusion_reason = Some(DIRECTOR_REASON.to_string());
        }
    }

    dataset.add_observation(format!("Directors found and excluded: {}", directors));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::MANAGEMENT_REASON;
    use crate::validation::test_support::*;
    use rust_decimal::Decimal;

    fn with_role(matricula: &str, role: &str) -> EmployeeRecord {
        let mut record = paid(matricula, 22);
        record.role = role.to_string();
        record
    }

    fn run(data: &mut Dataset) -> Vec<Diagnostic> {
        let config = config();
        let ctx = RuleContext::new(&config, data.competence).unwrap();
        check_directors(data, &ctx).unwrap()
    }

    #[test]
    fn test_eligible_director_is_an_error_and_excluded() {
        let mut data = dataset(vec![with_role("1", "Diretor Financeiro"), with_role("2", "Analista")]);

        let found = run(&mut data);

        assert_eq!(found.len(), 1);
        let director = &data.employees[0];
        assert!(!director.eligible);
        assert_eq!(director.days_worked, Some(0));
        assert_eq!(director.total_benefit_value, Decimal::ZERO);
        assert_eq!(director.exclusion_reason.as_deref(), Some(DIRECTOR_REASON));
        assert!(data.employees[1].eligible);
        assert_eq!(data.observations, vec!["Directors found and excluded: 1"]);
    }

    #[test]
    fn test_already_excluded_manager_keeps_reason() {
        let mut manager = with_role("1", "Coordenador de Vendas");
        manager.make_ineligible();
        manager.clear_benefit();
        manager.exclusion_reason = Some(MANAGEMENT_REASON.to_string());
        let mut data = dataset(vec![manager]);

        let found = run(&mut data);

        assert!(found.is_empty());
        assert_eq!(
            data.employees[0].exclusion_reason.as_deref(),
            Some(MANAGEMENT_REASON)
        );
    }

    #[test]
    fn test_short_titles_match_whole_words_only() {
        let mut data = dataset(vec![
            with_role("1", "CTO"),
            with_role("2", "Inspector de Qualidade"),
            with_role("3", "Vice-Presidente"),
        ]);

        run(&mut data);

        assert!(!data.employees[0].eligible);
        assert!(data.employees[1].eligible);
        assert!(!data.employees[2].eligible);
    }

    #[test]
    fn test_directors_are_not_added_to_exclusion_sets() {
        let mut data = dataset(vec![with_role("1", "Director")]);

        run(&mut data);

        assert!(data.exclusions.all().is_empty());
    }
}
