//! Re-verification of the calculator's monetary output.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{Dataset, Diagnostic};

use super::tolerance;

const ARITHMETIC: &str = "benefit_arithmetic";
const SPLIT: &str = "split_percentages";

fn overflow(what: &str, matricula: &str) -> EngineError {
    EngineError::calculation(format!("{} overflowed for employee {}", what, matricula))
}

fn differs(a: Decimal, b: Decimal) -> Option<bool> {
    a.checked_sub(b).map(|diff| diff.abs() > tolerance())
}

/// Recomputes `daily value × days worked` and `employer + employee` for every
/// eligible record and compares them to the stored total.
pub fn check_benefit_arithmetic(dataset: &mut Dataset) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();
    for record in dataset.employees.iter().filter(|e| e.eligible) {
        let days = record.days_worked_or_zero();
        let total = record.total_benefit_value;

        if record.daily_voucher_value > Decimal::ZERO && days > 0 {
            let expected = record
                .daily_voucher_value
                .checked_mul(Decimal::from(days))
                .ok_or_else(|| overflow("Daily value × days", &record.matricula))?;
            if differs(expected, total).ok_or_else(|| overflow("Total", &record.matricula))? {
                found.push(
                    Diagnostic::error(
                        ARITHMETIC,
                        format!(
                            "Benefit mismatch: {} × {} = {}, stored {}",
                            record.daily_voucher_value.normalize(),
                            days,
                            expected.normalize(),
                            total.normalize()
                        ),
                    )
                    .for_matricula(&record.matricula),
                );
            }
        }

        if total > Decimal::ZERO {
            let split = record
                .employer_cost
                .checked_add(record.employee_deduction)
                .ok_or_else(|| overflow("Split sum", &record.matricula))?;
            if differs(split, total).ok_or_else(|| overflow("Split sum", &record.matricula))? {
                found.push(
                    Diagnostic::error(
                        ARITHMETIC,
                        format!(
                            "Split mismatch: {} + {} = {}, total {}",
                            record.employer_cost.normalize(),
                            record.employee_deduction.normalize(),
                            split.normalize(),
                            total.normalize()
                        ),
                    )
                    .for_matricula(&record.matricula),
                );
            }
        }
    }
    Ok(found)
}

/// Recomputes the employer and employee fractions of each eligible total and
/// checks they add up to one.
pub fn check_split_percentages(dataset: &mut Dataset) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();
    for record in dataset.employees.iter().filter(|e| e.eligible) {
        let total = record.total_benefit_value;
        if total <= Decimal::ZERO {
            continue;
        }
        let employer = record
            .employer_cost
            .checked_div(total)
            .ok_or_else(|| overflow("Employer fraction", &record.matricula))?;
        let employee = record
            .employee_deduction
            .checked_div(total)
            .ok_or_else(|| overflow("Employee fraction", &record.matricula))?;
        let sum = employer
            .checked_add(employee)
            .ok_or_else(|| overflow("Fraction sum", &record.matricula))?;

        if differs(sum, Decimal::ONE).ok_or_else(|| overflow("Fraction sum", &record.matricula))? {
            let percent = sum
                .checked_mul(Decimal::ONE_HUNDRED)
                .ok_or_else(|| overflow("Percentage", &record.matricula))?;
            found.push(
                Diagnostic::error(
                    SPLIT,
                    format!(
                        "Split percentages add up to {}%",
                        percent.round_dp(2).normalize()
                    ),
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
    use crate::validation::test_support::*;

    // ==========================================================================
    // Benefit arithmetic
    // ==========================================================================

    #[test]
    fn test_consistent_records_pass() {
        let mut data = dataset(vec![paid("1", 22), paid("2", 19)]);
        assert!(check_benefit_arithmetic(&mut data).unwrap().is_empty());
    }

    #[test]
    fn test_total_mismatch_is_an_error() {
        let mut record = paid("1", 22);
        record.total_benefit_value = dec("500.00");
        record.employer_cost = dec("400.00");
        record.employee_deduction = dec("100.00");
        let mut data = dataset(vec![record]);

        let found = check_benefit_arithmetic(&mut data).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Benefit mismatch: 25 × 22 = 550, stored 500");
    }

    #[test]
    fn test_differences_within_a_cent_are_tolerated() {
        let mut record = paid("1", 22);
        record.employer_cost = dec("440.005");
        let mut data = dataset(vec![record]);

        assert!(check_benefit_arithmetic(&mut data).unwrap().is_empty());
    }

    #[test]
    fn test_split_mismatch_is_an_error() {
        let mut record = paid("1", 22);
        record.employee_deduction = dec("0");
        let mut data = dataset(vec![record]);

        let found = check_benefit_arithmetic(&mut data).unwrap();

        assert_eq!(found.len(), 1);
        assert!(found[0].message.starts_with("Split mismatch"));
    }

    #[test]
    fn test_ineligible_records_are_skipped() {
        let mut record = paid("1", 22);
        record.eligible = false;
        record.total_benefit_value = dec("1");
        let mut data = dataset(vec![record]);

        assert!(check_benefit_arithmetic(&mut data).unwrap().is_empty());
    }

    #[test]
    fn test_overflow_is_an_error_not_a_panic() {
        let mut record = paid("1", 0);
        record.total_benefit_value = dec("1");
        record.employer_cost = Decimal::MAX;
        record.employee_deduction = dec("1");
        let mut data = dataset(vec![record]);

        assert!(check_benefit_arithmetic(&mut data).is_err());
    }

    // ==========================================================================
    // Split percentages
    // ==========================================================================

    #[test]
    fn test_split_percentages_add_to_one() {
        let mut data = dataset(vec![paid("1", 22)]);
        assert!(check_split_percentages(&mut data).unwrap().is_empty());
    }

    #[test]
    fn test_split_percentages_off_by_ten_points() {
        let mut record = paid("1", 22);
        record.employee_deduction = dec("55.00");
        let mut data = dataset(vec![record]);

        let found = check_split_percentages(&mut data).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Split percentages add up to 90%");
    }

    #[test]
    fn test_zero_total_is_skipped() {
        let mut record = paid("1", 0);
        record.employer_cost = dec("10");
        let mut data = dataset(vec![record]);

        assert!(check_split_percentages(&mut data).unwrap().is_empty());
    }
}
