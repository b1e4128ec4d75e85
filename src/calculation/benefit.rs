//! Per-employee benefit calculation.
//!
//! The benefit is `daily value × days worked`, split between employer and
//! employee by the union's shares. All arithmetic is exact decimal and
//! checked; an overflow aborts the calculation stage.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{ConfigLoader, SplitShares};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Dataset, EmployeeRecord};

/// The three monetary amounts of one benefit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenefitAmounts {
    /// Daily value × days worked.
    pub total: Decimal,
    /// Employer share of the total.
    pub employer_cost: Decimal,
    /// Employee share of the total.
    pub employee_deduction: Decimal,
}

/// Computes the benefit for a daily value and a day count.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if any product overflows.
///
/// # Example
///
/// ```
/// use voucher_engine::calculation::compute_benefit;
/// use voucher_engine::config::SplitShares;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let shares = SplitShares {
///     employer: Decimal::from_str("0.80").unwrap(),
///     employee: Decimal::from_str("0.20").unwrap(),
/// };
/// let amounts = compute_benefit(Decimal::from_str("25.00").unwrap(), 19, shares).unwrap();
/// assert_eq!(amounts.total, Decimal::from_str("475.00").unwrap());
/// assert_eq!(amounts.employer_cost, Decimal::from_str("380.00").unwrap());
/// assert_eq!(amounts.employee_deduction, Decimal::from_str("95.00").unwrap());
/// ```
pub fn compute_benefit(
    daily_value: Decimal,
    days_worked: i64,
    shares: SplitShares,
) -> EngineResult<BenefitAmounts> {
    let overflow = || {
        EngineError::calculation(format!(
            "benefit overflow: {} x {} days",
            daily_value, days_worked
        ))
    };

    let total = daily_value
        .checked_mul(Decimal::from(days_worked))
        .ok_or_else(overflow)?;
    let employer_cost = total.checked_mul(shares.employer).ok_or_else(overflow)?;
    let employee_deduction = total.checked_mul(shares.employee).ok_or_else(overflow)?;

    Ok(BenefitAmounts {
        total,
        employer_cost,
        employee_deduction,
    })
}

/// Writes computed amounts onto a record.
pub fn store_benefit(
    record: &mut EmployeeRecord,
    daily_value: Decimal,
    days_worked: i64,
    amounts: BenefitAmounts,
) {
    record.daily_voucher_value = daily_value;
    record.days_worked = Some(days_worked);
    record.total_benefit_value = amounts.total;
    record.employer_cost = amounts.employer_cost;
    record.employee_deduction = amounts.employee_deduction;
}

/// Days counted for a record: absent means the union's working days,
/// negative values count as zero.
pub fn resolve_days_worked(record: &EmployeeRecord, union_working_days: i64) -> i64 {
    record.days_worked.unwrap_or(union_working_days).max(0)
}

/// The configured daily value and working days of a union, or why there are none.
fn union_rates(
    union: &str,
    union_values: &BTreeMap<String, Decimal>,
    union_working_days: &BTreeMap<String, i64>,
) -> Result<(Decimal, i64), String> {
    if union.is_empty() {
        return Err("no union assigned".to_string());
    }
    let daily_value = union_values
        .get(union)
        .copied()
        .filter(|v| *v > Decimal::ZERO)
        .ok_or_else(|| format!("union {} has no daily value", union))?;
    let working_days = union_working_days
        .get(union)
        .copied()
        .filter(|d| *d > 0)
        .ok_or_else(|| format!("union {} has no working days", union))?;
    Ok((daily_value, working_days))
}

/// Computes the benefit of every eligible record that has a configured union.
///
/// Returns the number of records that received a benefit.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] on arithmetic overflow; the
/// dataset must then be discarded.
pub fn apply_benefits(dataset: &mut Dataset, config: &ConfigLoader) -> EngineResult<usize> {
    let Dataset {
        employees,
        union_values,
        union_working_days,
        audit,
        ..
    } = dataset;

    let mut calculated = 0;
    for record in employees.iter_mut().filter(|e| e.eligible) {
        let union = record.union.trim().to_string();
        let (daily_value, working_days) =
            match union_rates(&union, union_values, union_working_days) {
                Ok(rates) => rates,
                Err(reason) => {
                    debug!(matricula = %record.matricula, reason = %reason, "benefit skipped");
                    audit.push(AuditStep {
                        step_number: audit.len() as u32 + 1,
                        rule_id: "benefit_calculation".to_string(),
                        rule_name: "Benefit Calculation".to_string(),
                        matricula: record.matricula.clone(),
                        input: serde_json::json!({ "union": union }),
                        output: serde_json::json!({ "calculated": false }),
                        reasoning: format!("Skipped: {}", reason),
                    });
                    continue;
                }
            };

        let days_worked = resolve_days_worked(record, working_days);
        let shares = config.shares_for(&union);
        let amounts = compute_benefit(daily_value, days_worked, shares)?;
        record.working_days = Some(working_days);
        store_benefit(record, daily_value, days_worked, amounts);
        calculated += 1;

        audit.push(AuditStep {
            step_number: audit.len() as u32 + 1,
            rule_id: "benefit_calculation".to_string(),
            rule_name: "Benefit Calculation".to_string(),
            matricula: record.matricula.clone(),
            input: serde_json::json!({
                "union": union,
                "daily_value": daily_value.normalize().to_string(),
                "days_worked": days_worked,
                "employer_share": shares.employer.normalize().to_string(),
                "employee_share": shares.employee.normalize().to_string()
            }),
            output: serde_json::json!({
                "calculated": true,
                "total": amounts.total.normalize().to_string(),
                "employer_cost": amounts.employer_cost.normalize().to_string(),
                "employee_deduction": amounts.employee_deduction.normalize().to_string()
            }),
            reasoning: format!(
                "R$ {} x {} days = R$ {} (employer {}, employee {})",
                daily_value.normalize(),
                days_worked,
                amounts.total.normalize(),
                amounts.employer_cost.normalize(),
                amounts.employee_deduction.normalize()
            ),
        });
    }
    Ok(calculated)
}
