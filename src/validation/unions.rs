use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{Dataset, Diagnostic};

const RULE: &str = "union_consistency";

/// Every referenced union needs a positive daily value and a working-day
/// count between 1 and 31.
///
/// Missing entries are reported as one aggregated error per table; bad values
/// are reported per union.
pub fn check_union_consistency(dataset: &mut Dataset) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();
    let referenced = dataset.referenced_unions();

    let without_value: Vec<&str> = referenced
        .iter()
        .filter(|u| !dataset.union_values.contains_key(*u))
        .map(String::as_str)
        .collect();
    if !without_value.is_empty() {
        found.push(Diagnostic::error(
            RULE,
            format!("Unions without value: {}", without_value.join(", ")),
        ));
    }

    let without_days: Vec<&str> = referenced
        .iter()
        .filter(|u| !dataset.union_working_days.contains_key(*u))
        .map(String::as_str)
        .collect();
    if !without_days.is_empty() {
        found.push(Diagnostic::error(
            RULE,
            format!("Unions without working days: {}", without_days.join(", ")),
        ));
    }

    for union in &referenced {
        if dataset
            .union_values
            .get(union)
            .is_some_and(|value| *value <= Decimal::ZERO)
        {
            found.push(Diagnostic::error(
                RULE,
                format!("Union {} has a non-positive daily value", union),
            ));
        }
        match dataset.union_working_days.get(union) {
            Some(days) if !(1..=31).contains(days) => found.push(Diagnostic::error(
                RULE,
                format!("Union {} has an invalid working-day count: {}", union, days),
            )),
            _ => {}
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::test_support::*;

    #[test]
    fn test_single_union_without_value_reported_once() {
        let mut orphan = paid("1", 0);
        orphan.union = "SINDICATO_METALURGICOS".to_string();
        orphan.clear_benefit();
        let mut other = orphan.clone();
        other.matricula = "2".to_string();
        let mut data = dataset(vec![orphan, other, paid("3", 22)]);
        data.union_working_days
            .insert("SINDICATO_METALURGICOS".to_string(), 23);

        let found = check_union_consistency(&mut data).unwrap();

        assert_eq!(found.len(), 1);
        assert!(found[0].is_error());
        assert_eq!(found[0].message, "Unions without value: SINDICATO_METALURGICOS");
    }

    #[test]
    fn test_missing_days_are_aggregated() {
        let mut data = dataset(vec![paid("1", 22)]);
        data.union_working_days.clear();

        let found = check_union_consistency(&mut data).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Unions without working days: São Paulo");
    }

    #[test]
    fn test_bad_values_reported_per_union() {
        let mut data = dataset(vec![paid("1", 22)]);
        data.union_values.insert("São Paulo".to_string(), dec("0"));
        data.union_working_days.insert("São Paulo".to_string(), 32);

        let found = check_union_consistency(&mut data).unwrap();

        assert_eq!(found.len(), 2);
        assert!(found[0].message.contains("non-positive"));
        assert!(found[1].message.contains("32"));
    }

    #[test]
    fn test_unreferenced_unions_are_ignored() {
        let mut data = dataset(vec![paid("1", 22)]);
        data.union_values.insert("SINDICATO_QUIMICOS".to_string(), dec("-1"));

        assert!(check_union_consistency(&mut data).unwrap().is_empty());
    }
}
