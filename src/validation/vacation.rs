//! Union vacation-policy dispatch.
//!
//! Employees on vacation are checked against their union's policy. A `full`
//! policy forbids any day worked during the vacation and always leaves the
//! employee without a benefit. A `partial` policy bounds the days worked and
//! recomputes the benefit for the days that remain.

use rust_decimal::Decimal;

use crate::calculation::{compute_benefit, store_benefit};
use crate::config::VacationPolicy;
use crate::error::EngineResult;
use crate::models::{Dataset, Diagnostic, EmployeeRecord};

use super::RuleContext;

const RULE: &str = "vacation_policy";

/// Note added to employees under a full-vacation policy.
pub const FULL_VACATION_NOTE: &str = "FULL VACATION";

fn without_benefit(record: &mut EmployeeRecord) {
    record.make_ineligible();
    record.clear_benefit();
}

/// Checks every employee on vacation against the union's vacation policy.
pub fn check_vacation_policy(
    dataset: &mut Dataset,
    ctx: &RuleContext<'_>,
) -> EngineResult<Vec<Diagnostic>> {
    let Dataset {
        employees,
        union_values,
        observations,
        ..
    } = dataset;

    let mut found = Vec::new();
    let (mut full, mut partial) = (0usize, 0usize);

    for record in employees.iter_mut().filter(|e| e.on_vacation) {
        let Some(policy) = ctx.config.policy(&record.union) else {
            found.push(
                Diagnostic::warning(
                    RULE,
                    format!("Union {} not found in configuration", record.union),
                )
                .for_matricula(&record.matricula),
            );
            continue;
        };
        let Some(vacation) = &policy.vacation else {
            found.push(
                Diagnostic::warning(
                    RULE,
                    format!("Union {} has no vacation rules", record.union),
                )
                .for_matricula(&record.matricula),
            );
            continue;
        };

        let days = record.days_worked_or_zero();
        match vacation {
            VacationPolicy::Full { .. } => {
                full += 1;
                if days > 0 {
                    found.push(
                        Diagnostic::error(
                            RULE,
                            format!("Full vacation forbids days worked, found {}", days),
                        )
                        .for_matricula(&record.matricula),
                    );
                }
                without_benefit(record);
                record.add_note(FULL_VACATION_NOTE);
            }
            VacationPolicy::Partial {
                min_days, max_days, ..
            } => {
                partial += 1;
                if days < *min_days {
                    found.push(
                        Diagnostic::warning(
                            RULE,
                            format!("Days worked {} below the minimum of {}", days, min_days),
                        )
                        .for_matricula(&record.matricula),
                    );
                }
                if days > *max_days {
                    found.push(
                        Diagnostic::error(
                            RULE,
                            format!("Days worked {} above the maximum of {}", days, max_days),
                        )
                        .for_matricula(&record.matricula),
                    );
                }
                record.add_note(format!("PARTIAL VACATION ({} days)", days));

                if days > 0 {
                    let daily_value = if record.daily_voucher_value > Decimal::ZERO {
                        record.daily_voucher_value
                    } else {
                        union_values
                            .get(&record.union)
                            .copied()
                            .unwrap_or(Decimal::ZERO)
                    };
                    let amounts =
                        compute_benefit(daily_value, days, ctx.config.shares_for(&record.union))?;
                    record.eligible = true;
                    store_benefit(record, daily_value, days, amounts);
                } else {
                    without_benefit(record);
                }
            }
        }

        if let Some(note) = vacation.note() {
            record.add_note(note);
        }
    }

    observations.push(format!(
        "Vacations processed: {} total ({} full, {} partial)",
        full + partial,
        full,
        partial
    ));
    Ok(found)
}
