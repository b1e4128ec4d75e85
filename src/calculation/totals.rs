//! Dataset-level benefit totals.

use crate::error::{EngineError, EngineResult};
use crate::models::{BenefitTotals, Dataset};

/// Sums the monetary fields of every eligible record into `dataset.totals`.
///
/// Totals are always rebuilt from scratch so they reflect the records as
/// they are now, not as an earlier stage left them.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if a sum overflows.
pub fn recompute_totals(dataset: &mut Dataset) -> EngineResult<&BenefitTotals> {
    let overflow = || EngineError::calculation("benefit totals overflow");

    let mut totals = BenefitTotals::default();
    for record in dataset.employees.iter().filter(|e| e.eligible) {
        totals.total_benefit = totals
            .total_benefit
            .checked_add(record.total_benefit_value)
            .ok_or_else(overflow)?;
        totals.employer_cost = totals
            .employer_cost
            .checked_add(record.employer_cost)
            .ok_or_else(overflow)?;
        totals.employee_deduction = totals
            .employee_deduction
            .checked_add(record.employee_deduction)
            .ok_or_else(overflow)?;
        totals.valid_count += 1;
    }

    dataset.totals = totals;
    Ok(&dataset.totals)
}
